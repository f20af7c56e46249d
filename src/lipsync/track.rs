//! Mouth-state thresholding and track assembly

use serde::{Deserialize, Serialize};

/// One timestamped mouth state, immutable once created
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisemeEvent {
    /// Offset from the start of the audio, in seconds
    pub time: f64,

    /// Whether the avatar's mouth renders open at this moment
    pub mouth_open: bool,
}

/// Ordered, time-ascending mouth-state events, one per analysis hop
///
/// Serializes as a plain JSON array of `{"time", "mouth_open"}` objects,
/// which is the shape pushed to subscribed clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LipSyncTrack {
    pub events: Vec<VisemeEvent>,
}

impl LipSyncTrack {
    /// Number of events in the track
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the track holds no events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Threshold a peak-normalized energy contour into per-frame mouth states
///
/// A fully silent contour (peak of zero) yields all-closed states rather
/// than dividing by zero. Comparison is strict, so raising the threshold can
/// only close mouths, never open them.
#[must_use]
pub fn mouth_open_states(contour: &[f32], threshold: f32) -> Vec<bool> {
    let peak = contour.iter().copied().fold(0.0f32, f32::max);
    if peak == 0.0 {
        return vec![false; contour.len()];
    }

    contour.iter().map(|&e| e / peak > threshold).collect()
}

/// Assemble per-frame mouth states into a timing track
///
/// Event `i` lands at `i * hop_secs`; the output has exactly one event per
/// input state, in order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_track(states: &[bool], hop_secs: f32) -> LipSyncTrack {
    LipSyncTrack {
        events: states
            .iter()
            .enumerate()
            .map(|(i, &mouth_open)| VisemeEvent {
                time: i as f64 * f64::from(hop_secs),
                mouth_open,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_contour_stays_closed() {
        let states = mouth_open_states(&[0.0, 0.0, 0.0], 0.2);
        assert_eq!(states, vec![false, false, false]);
    }

    #[test]
    fn normalizes_against_the_peak() {
        // peak 0.8: normalized values are 0.125, 1.0, 0.5
        let states = mouth_open_states(&[0.1, 0.8, 0.4], 0.2);
        assert_eq!(states, vec![false, true, true]);
    }

    #[test]
    fn threshold_comparison_is_strict() {
        // normalized second value is exactly the threshold
        let states = mouth_open_states(&[1.0, 0.5], 0.5);
        assert_eq!(states, vec![true, false]);
    }

    #[test]
    fn raising_threshold_never_opens() {
        let contour = [0.05, 0.3, 0.9, 0.2, 0.6, 0.0];
        let low = mouth_open_states(&contour, 0.1);
        let high = mouth_open_states(&contour, 0.5);

        for (lo, hi) in low.iter().zip(&high) {
            assert!(!hi | lo, "raising the threshold opened a closed mouth");
        }
    }

    #[test]
    fn track_times_step_by_hop() {
        let track = build_track(&[false, true, false, true], 0.025);

        assert_eq!(track.len(), 4);
        for (i, event) in track.events.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = i as f64 * f64::from(0.025f32);
            assert!((event.time - expected).abs() < 1e-9);
        }
        assert!(track.events[1].mouth_open);
        assert!(!track.events[2].mouth_open);
    }

    #[test]
    fn serializes_as_plain_event_array() {
        let track = build_track(&[true], 0.025);
        let json = serde_json::to_value(&track).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["mouth_open"], true);
        assert_eq!(json[0]["time"], 0.0);
    }
}
