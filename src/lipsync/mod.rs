//! Lip-sync timing extraction
//!
//! Converts a synthesized speech waveform into a sequence of timestamped
//! mouth-open/closed events for driving a talking-avatar animation. The
//! transform is a loudness heuristic: a short-time RMS energy contour is
//! peak-normalized and thresholded, one event per analysis hop.
//!
//! The whole module is pure and synchronous; all I/O lives in the
//! surrounding pipeline.

mod envelope;
mod track;

pub use envelope::{FrameLayout, Waveform, energy_contour};
pub use track::{LipSyncTrack, VisemeEvent, build_track, mouth_open_states};

use crate::{Error, Result};

/// Tuning for the lip-sync transform
#[derive(Debug, Clone, Copy)]
pub struct LipSyncConfig {
    /// Analysis window duration in seconds
    pub frame_secs: f32,

    /// Step between consecutive windows in seconds
    pub hop_secs: f32,

    /// Peak-normalized loudness above which the mouth renders open.
    /// Must lie in (0, 1]; lower values open the mouth more readily.
    pub threshold: f32,
}

impl Default for LipSyncConfig {
    fn default() -> Self {
        Self {
            frame_secs: 0.05,
            hop_secs: 0.025,
            threshold: 0.2,
        }
    }
}

/// Extract a lip-sync track from a decoded waveform
///
/// Runs envelope extraction, thresholding, and track assembly in one pass.
/// Identical input and configuration always produce an identical track.
///
/// # Errors
///
/// Returns [`Error::Config`] if the threshold is outside (0, 1] or the
/// frame/hop durations do not resolve to at least one sample each at the
/// waveform's sample rate.
pub fn extract(waveform: &Waveform, config: &LipSyncConfig) -> Result<LipSyncTrack> {
    if !(config.threshold > 0.0 && config.threshold <= 1.0) {
        return Err(Error::Config(format!(
            "lip-sync threshold must be in (0, 1], got {}",
            config.threshold
        )));
    }

    let layout = FrameLayout::resolve(waveform.sample_rate, config.frame_secs, config.hop_secs)?;
    let contour = energy_contour(waveform, layout);
    let states = mouth_open_states(&contour, config.threshold);
    Ok(build_track(&states, config.hop_secs))
}
