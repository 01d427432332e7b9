//! Display-only animation state for tagged objects.
//!
//! Neither animation touches the stored transform. The renderer asks for
//! `display_angle` and `pulse_factor` each frame, so snapshots and autosaves
//! of an animated card stay byte-stable.

use crate::model::{AnimationTag, Scene, SceneObject};
use std::f64::consts::TAU;

/// Whether any object carries an animation that needs per-frame redraws.
pub fn is_animated(scene: &Scene) -> bool {
    scene.objects.iter().any(|obj| match obj.animation {
        Some(AnimationTag::Spin { degrees_per_sec }) => degrees_per_sec != 0.0,
        Some(AnimationTag::Pulse {
            amplitude,
            period_ms,
        }) => amplitude != 0.0 && period_ms > 0,
        None => false,
    })
}

/// Angle to draw `obj` at, `elapsed_ms` into the animation: the stored
/// angle plus the spin so far, wrapped to `[0, 360)`.
pub fn display_angle(obj: &SceneObject, elapsed_ms: f64) -> f64 {
    let stored = f64::from(obj.transform.angle);
    match obj.animation {
        Some(AnimationTag::Spin { degrees_per_sec }) => {
            wrap_degrees(stored + f64::from(degrees_per_sec) * elapsed_ms / 1000.0)
        }
        _ => stored,
    }
}

/// Display multiplier for a pulsing object at `elapsed_ms`; `1.0` otherwise.
pub fn pulse_factor(obj: &SceneObject, elapsed_ms: f64) -> f64 {
    match obj.animation {
        Some(AnimationTag::Pulse {
            amplitude,
            period_ms,
        }) if period_ms > 0 => {
            let phase = (elapsed_ms / f64::from(period_ms)).fract();
            1.0 + f64::from(amplitude) * (TAU * phase).sin()
        }
        _ => 1.0,
    }
}

/// Wrap an angle into `[0, 360)`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
