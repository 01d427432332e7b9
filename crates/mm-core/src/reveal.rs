//! The recipient's "unwrapping" sequence.
//!
//! Opening a shared card plays three timed steps: the envelope flap opens and
//! the letter slides out, the overlay fades and grows away, then the card
//! stage fades in. The front end drives CSS from the `RevealFrame` for the
//! current time; the card itself is loaded (pre-rendered) before opening.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RevealPhase {
    Sealed,
    EnvelopeOpening,
    OverlayFading,
    StageRevealing,
    Revealed,
}

/// Step durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealTimings {
    pub envelope_ms: f64,
    pub overlay_fade_ms: f64,
    pub stage_delay_ms: f64,
}

impl Default for RevealTimings {
    fn default() -> Self {
        Self {
            envelope_ms: 1600.0,
            overlay_fade_ms: 800.0,
            stage_delay_ms: 50.0,
        }
    }
}

/// Everything the front end needs to style one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealFrame {
    pub phase: RevealPhase,
    /// Progress through the current phase, `0..=1`.
    pub progress: f64,
    pub envelope_open: bool,
    pub overlay_visible: bool,
    pub overlay_opacity: f64,
    pub overlay_scale: f64,
    pub stage_visible: bool,
    pub stage_opacity: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RevealTimeline {
    timings: RevealTimings,
    opened_at: Option<f64>,
}

impl RevealTimeline {
    pub fn new(timings: RevealTimings) -> Self {
        Self {
            timings,
            opened_at: None,
        }
    }

    /// Start the sequence. Opening twice keeps the first start time.
    pub fn open(&mut self, now_ms: f64) {
        if self.opened_at.is_none() {
            self.opened_at = Some(now_ms);
        }
    }

    pub fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }

    pub fn phase(&self, now_ms: f64) -> RevealPhase {
        self.frame(now_ms).phase
    }

    pub fn frame(&self, now_ms: f64) -> RevealFrame {
        let t = &self.timings;
        let Some(start) = self.opened_at else {
            return RevealFrame {
                phase: RevealPhase::Sealed,
                progress: 0.0,
                envelope_open: false,
                overlay_visible: true,
                overlay_opacity: 1.0,
                overlay_scale: 1.0,
                stage_visible: false,
                stage_opacity: 0.0,
            };
        };
        let elapsed = (now_ms - start).max(0.0);
        let fade_start = t.envelope_ms;
        let stage_start = fade_start + t.overlay_fade_ms;
        let done = stage_start + t.stage_delay_ms;

        if elapsed < fade_start {
            RevealFrame {
                phase: RevealPhase::EnvelopeOpening,
                progress: ratio(elapsed, t.envelope_ms),
                envelope_open: true,
                overlay_visible: true,
                overlay_opacity: 1.0,
                overlay_scale: 1.0,
                stage_visible: false,
                stage_opacity: 0.0,
            }
        } else if elapsed < stage_start {
            let p = ratio(elapsed - fade_start, t.overlay_fade_ms);
            RevealFrame {
                phase: RevealPhase::OverlayFading,
                progress: p,
                envelope_open: true,
                overlay_visible: true,
                overlay_opacity: 1.0 - p,
                overlay_scale: 1.0 + 0.2 * p,
                stage_visible: false,
                stage_opacity: 0.0,
            }
        } else if elapsed < done {
            RevealFrame {
                phase: RevealPhase::StageRevealing,
                progress: ratio(elapsed - stage_start, t.stage_delay_ms),
                envelope_open: true,
                overlay_visible: false,
                overlay_opacity: 0.0,
                overlay_scale: 1.2,
                stage_visible: true,
                stage_opacity: 0.0,
            }
        } else {
            RevealFrame {
                phase: RevealPhase::Revealed,
                progress: 1.0,
                envelope_open: true,
                overlay_visible: false,
                overlay_opacity: 0.0,
                overlay_scale: 1.2,
                stage_visible: true,
                stage_opacity: 1.0,
            }
        }
    }
}

fn ratio(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        1.0
    } else {
        (part / whole).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealed_until_opened() {
        let tl = RevealTimeline::default();
        let frame = tl.frame(10_000.0);
        assert_eq!(frame.phase, RevealPhase::Sealed);
        assert!(frame.overlay_visible && !frame.stage_visible);
    }

    #[test]
    fn phases_follow_default_timings() {
        let mut tl = RevealTimeline::default();
        tl.open(1000.0);
        assert_eq!(tl.phase(1000.0), RevealPhase::EnvelopeOpening);
        assert_eq!(tl.phase(2599.0), RevealPhase::EnvelopeOpening);
        assert_eq!(tl.phase(2600.0), RevealPhase::OverlayFading);
        assert_eq!(tl.phase(3400.0), RevealPhase::StageRevealing);
        assert_eq!(tl.phase(3450.0), RevealPhase::Revealed);
    }

    #[test]
    fn overlay_fades_and_grows() {
        let mut tl = RevealTimeline::default();
        tl.open(0.0);
        let mid = tl.frame(2000.0);
        assert!((mid.overlay_opacity - 0.5).abs() < 1e-9);
        assert!((mid.overlay_scale - 1.1).abs() < 1e-9);
        let end = tl.frame(5000.0);
        assert_eq!(end.stage_opacity, 1.0);
        assert!(!end.overlay_visible);
    }

    #[test]
    fn reopening_keeps_start() {
        let mut tl = RevealTimeline::default();
        tl.open(0.0);
        tl.open(1500.0);
        assert_eq!(tl.phase(1700.0), RevealPhase::OverlayFading);
    }
}
