//! Short-time loudness envelope extraction

use crate::{Error, Result};

/// Decoded mono audio: amplitude samples plus their sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Amplitude samples in [-1, 1]
    pub samples: Vec<f32>,

    /// Samples per second
    pub sample_rate: u32,
}

impl Waveform {
    /// Duration of the waveform in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Analysis window geometry in samples, resolved from durations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    /// Window length in samples
    pub frame_len: usize,

    /// Step between consecutive windows in samples
    pub hop_len: usize,
}

impl FrameLayout {
    /// Resolve frame and hop durations against a sample rate
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the sample rate is zero, either duration
    /// rounds to zero samples, or the hop is longer than the frame.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn resolve(sample_rate: u32, frame_secs: f32, hop_secs: f32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::Config("sample rate must be positive".to_string()));
        }

        let frame_len = (sample_rate as f32 * frame_secs).round() as usize;
        let hop_len = (sample_rate as f32 * hop_secs).round() as usize;

        if frame_len == 0 || hop_len == 0 {
            return Err(Error::Config(format!(
                "frame ({frame_secs}s) and hop ({hop_secs}s) must each resolve to at least one sample at {sample_rate} Hz"
            )));
        }
        if frame_len < hop_len {
            return Err(Error::Config(format!(
                "frame length ({frame_len} samples) must be at least the hop length ({hop_len} samples)"
            )));
        }

        Ok(Self { frame_len, hop_len })
    }
}

/// Compute the RMS energy contour of a waveform
///
/// Frames start at offsets `0, hop, 2*hop, ...` and advance while at least
/// one full hop of samples remains. A final frame shorter than the frame
/// length is zero-padded: the squared sum is divided by the full frame
/// length, so its energy stays comparable to complete frames. An all-silence
/// waveform yields an all-zero contour.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn energy_contour(waveform: &Waveform, layout: FrameLayout) -> Vec<f32> {
    let samples = &waveform.samples;
    let num_frames = samples.len() / layout.hop_len;

    let mut contour = Vec::with_capacity(num_frames);
    for i in 0..num_frames {
        let start = i * layout.hop_len;
        let end = (start + layout.frame_len).min(samples.len());
        let sum_squares: f32 = samples[start..end].iter().map(|s| s * s).sum();
        contour.push((sum_squares / layout.frame_len as f32).sqrt());
    }

    contour
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waveform(samples: Vec<f32>, sample_rate: u32) -> Waveform {
        Waveform {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn resolves_standard_layout() {
        let layout = FrameLayout::resolve(16000, 0.05, 0.025).unwrap();
        assert_eq!(layout.frame_len, 800);
        assert_eq!(layout.hop_len, 400);
    }

    #[test]
    fn rejects_zero_sample_durations() {
        assert!(FrameLayout::resolve(16000, 0.000_01, 0.025).is_err());
        assert!(FrameLayout::resolve(16000, 0.05, 0.000_01).is_err());
        assert!(FrameLayout::resolve(0, 0.05, 0.025).is_err());
    }

    #[test]
    fn rejects_hop_longer_than_frame() {
        assert!(FrameLayout::resolve(16000, 0.01, 0.025).is_err());
    }

    #[test]
    fn silence_yields_zero_contour() {
        let layout = FrameLayout::resolve(16000, 0.05, 0.025).unwrap();
        let contour = energy_contour(&waveform(vec![0.0; 16000], 16000), layout);

        assert_eq!(contour.len(), 40);
        assert!(contour.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn frame_count_covers_partial_tail() {
        let layout = FrameLayout::resolve(16000, 0.05, 0.025).unwrap();

        // 41 hops plus a 100-sample remainder that never fills a hop
        let contour = energy_contour(&waveform(vec![0.1; 16500], 16000), layout);
        assert_eq!(contour.len(), 41);

        // fewer samples than one hop: no frames at all
        let contour = energy_contour(&waveform(vec![0.1; 399], 16000), layout);
        assert!(contour.is_empty());
    }

    #[test]
    fn constant_amplitude_has_constant_rms() {
        let layout = FrameLayout::resolve(16000, 0.05, 0.025).unwrap();
        let contour = energy_contour(&waveform(vec![0.5; 16000], 16000), layout);

        // Frames fully inside the waveform read the constant amplitude
        for &e in &contour[..contour.len() - 1] {
            assert!((e - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_padded_tail_energy_is_scaled_down() {
        let layout = FrameLayout::resolve(16000, 0.05, 0.025).unwrap();
        let contour = energy_contour(&waveform(vec![1.0; 16000], 16000), layout);

        // The final frame has only one hop of real samples, padded with
        // zeros to the frame length: RMS = sqrt(400/800)
        let tail = contour[contour.len() - 1];
        assert!((tail - (0.5f32).sqrt()).abs() < 1e-6);
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn deterministic_over_repeated_runs() {
        let layout = FrameLayout::resolve(22050, 0.05, 0.025).unwrap();
        let wave = waveform((0..22050).map(|i| (i as f32 * 0.01).sin()).collect(), 22050);

        assert_eq!(
            energy_contour(&wave, layout),
            energy_contour(&wave, layout)
        );
    }
}
