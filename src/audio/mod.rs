//! Audio decoding for synthesized speech
//!
//! The speech synthesizer returns a compressed byte stream; the lip-sync
//! transform needs raw mono samples plus their sample rate. MP3 and WAV are
//! the two container formats the supported synthesis backends produce.

use std::io::Cursor;
use std::path::Path;

use crate::lipsync::Waveform;
use crate::{Error, Result};

/// Audio container formats produced by the speech synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    /// MIME content type for storage upload
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
        }
    }

    /// File extension without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
        }
    }

    /// Parse a format name such as "mp3" or "wav"
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }

    /// Detect the format from a file path's extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }
}

/// Decode synthesized audio bytes into a mono waveform
///
/// Stereo input is downmixed by channel average.
///
/// # Errors
///
/// Returns [`Error::Audio`] if the payload is not valid audio in the
/// claimed format.
pub fn decode(bytes: &[u8], format: AudioFormat) -> Result<Waveform> {
    match format {
        AudioFormat::Mp3 => decode_mp3(bytes),
        AudioFormat::Wav => decode_wav(bytes),
    }
}

/// Decode MP3 bytes to a mono waveform
#[allow(clippy::cast_sign_loss)]
fn decode_mp3(data: &[u8]) -> Result<Waveform> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(data));
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate = frame.sample_rate as u32;

                if frame.channels == 2 {
                    // Stereo: average channels
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        (left + right) / 2.0
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(Error::Audio("no audio frames decoded".to_string()));
    }

    Ok(Waveform {
        samples,
        sample_rate,
    })
}

/// Decode WAV bytes to a mono waveform
#[allow(clippy::cast_precision_loss)]
fn decode_wav(data: &[u8]) -> Result<Waveform> {
    let reader = hound::WavReader::new(Cursor::new(data))
        .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?;
    let spec = reader.spec();

    if spec.channels == 0 || spec.sample_rate == 0 {
        return Err(Error::Audio(
            "WAV header reports zero channels or sample rate".to_string(),
        ));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Audio(format!("WAV decode error: {e}")))?
        }
    };

    let channels = usize::from(spec.channels);
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    Ok(Waveform {
        samples,
        sample_rate: spec.sample_rate,
    })
}
