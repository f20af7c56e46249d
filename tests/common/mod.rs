//! Shared test utilities: in-memory database and recording fake collaborators

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use avatar_gateway::audio::AudioFormat;
use avatar_gateway::lipsync::LipSyncTrack;
use avatar_gateway::model::ReplyModel;
use avatar_gateway::notify::Publisher;
use avatar_gateway::storage::AudioStore;
use avatar_gateway::tts::{SpeechAudio, SpeechSynthesizer};
use avatar_gateway::{DbPool, Error, Result, db};

/// Set up an in-memory test database
#[must_use]
pub fn setup_test_db() -> DbPool {
    db::init_memory().expect("failed to init test db")
}

/// Counts calls made to each fake collaborator
#[derive(Default)]
pub struct CallLog {
    pub model: AtomicUsize,
    pub tts: AtomicUsize,
    pub store: AtomicUsize,
    pub publish: AtomicUsize,
}

impl CallLog {
    pub fn total(&self) -> usize {
        self.model.load(Ordering::SeqCst)
            + self.tts.load(Ordering::SeqCst)
            + self.store.load(Ordering::SeqCst)
            + self.publish.load(Ordering::SeqCst)
    }
}

/// Fake language model returning a canned reply
pub struct FakeModel {
    pub log: Arc<CallLog>,
    pub reply: String,
}

#[async_trait]
impl ReplyModel for FakeModel {
    async fn reply(&self, _message: &str) -> Result<String> {
        self.log.model.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Fake synthesizer returning a WAV fixture with speech-like loud stretches
pub struct FakeSynthesizer {
    pub log: Arc<CallLog>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<SpeechAudio> {
        self.log.tts.fetch_add(1, Ordering::SeqCst);
        Ok(SpeechAudio {
            bytes: wav_fixture(),
            format: AudioFormat::Wav,
        })
    }
}

/// Fake object store returning deterministic URLs
pub struct FakeStore {
    pub log: Arc<CallLog>,
}

#[async_trait]
impl AudioStore for FakeStore {
    async fn put(&self, key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        self.log.store.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://cdn.test/{key}"))
    }
}

/// Fake publisher, optionally failing every delivery
pub struct FakePublisher {
    pub log: Arc<CallLog>,
    pub fail: bool,
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn publish(&self, _reply: &str, _audio_url: &str, _track: &LipSyncTrack) -> Result<()> {
        self.log.publish.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::Publish("subscriber endpoint unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Half a second of audio at 16 kHz alternating silence and tone,
/// WAV-encoded the way a PCM synthesis backend would return it
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn wav_fixture() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("wav writer");
        for i in 0..8000_u32 {
            let loud = (i / 2000) % 2 == 1;
            let sample = if loud {
                let t = f64::from(i) / 16000.0;
                ((t * 440.0 * 2.0 * std::f64::consts::PI).sin() * 12000.0) as i16
            } else {
                0
            };
            writer.write_sample(sample).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    cursor.into_inner()
}
