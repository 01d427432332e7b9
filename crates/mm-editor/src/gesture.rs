//! Two-finger gesture interpretation.
//!
//! A pinch over a selected object scales and rotates that object. A pinch
//! with nothing selected zooms the viewport around the point between the
//! fingers. The mode is fixed when the second finger lands and holds until
//! fewer than two fingers remain.

use crate::input::{TouchPoint, TwoFinger};
use mm_core::animation::wrap_degrees;
use mm_core::{ObjectId, Point, Scene, Viewport};

/// Values captured when an object pinch starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectPinch {
    pub target: ObjectId,
    pub distance: f64,
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
}

/// Values captured when a viewport pinch starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPinch {
    pub distance: f64,
    pub user_scale: f64,
    pub midpoint: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureMode {
    ObjectTransform(ObjectPinch),
    ViewportZoom(ZoomPinch),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Tracking(GestureMode),
}

/// What a gesture event did, for the session to act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    /// Nothing changed.
    None,
    /// A gesture began.
    Started,
    ObjectTransformed {
        id: ObjectId,
        scale_x: f64,
        scale_y: f64,
        angle: f64,
    },
    ViewportZoomed {
        user_scale: f64,
    },
    /// The gesture finished. `transformed` is set if any object was changed,
    /// which is what earns a history entry.
    Ended {
        transformed: bool,
    },
}

#[derive(Debug, Default)]
pub struct GestureTracker {
    state: GestureState,
    transformed: bool,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, GestureState::Tracking(_))
    }

    /// Begin tracking once two contacts are down. With a selected object in
    /// `scene` the gesture transforms it; otherwise it zooms the viewport.
    pub fn start(
        &mut self,
        touches: &[TouchPoint],
        selection: Option<ObjectId>,
        scene: &Scene,
        viewport: &Viewport,
    ) -> GestureEffect {
        let Some(geom) = TwoFinger::from_touches(touches) else {
            return GestureEffect::None;
        };
        if self.is_tracking() {
            return GestureEffect::None;
        }
        let mode = match selection.and_then(|id| scene.get(id)) {
            Some(obj) => GestureMode::ObjectTransform(ObjectPinch {
                target: obj.id,
                distance: geom.distance,
                angle: geom.angle,
                scale_x: f64::from(obj.transform.scale_x),
                scale_y: f64::from(obj.transform.scale_y),
                rotation: f64::from(obj.transform.angle),
            }),
            None => GestureMode::ViewportZoom(ZoomPinch {
                distance: geom.distance,
                user_scale: viewport.user_scale(),
                midpoint: geom.midpoint,
            }),
        };
        log::trace!("gesture start: {mode:?}");
        self.state = GestureState::Tracking(mode);
        self.transformed = false;
        GestureEffect::Started
    }

    /// Apply a move with the current contacts.
    pub fn update(
        &mut self,
        touches: &[TouchPoint],
        scene: &mut Scene,
        viewport: &mut Viewport,
    ) -> GestureEffect {
        let GestureState::Tracking(mode) = self.state else {
            return GestureEffect::None;
        };
        let Some(geom) = TwoFinger::from_touches(touches) else {
            return GestureEffect::None;
        };

        match mode {
            GestureMode::ObjectTransform(start) => {
                let Some(obj) = scene.get_mut(start.target) else {
                    return GestureEffect::None;
                };
                // Both axes follow the finger ratio so the aspect ratio survives.
                if let Some(r) = ratio(geom.distance, start.distance) {
                    obj.transform.scale_x = (start.scale_x * r) as f32;
                    obj.transform.scale_y = (start.scale_y * r) as f32;
                }
                let angle = wrap_degrees(start.rotation + (geom.angle - start.angle));
                obj.transform.angle = angle as f32;
                self.transformed = true;
                let (scale_x, scale_y) = (
                    f64::from(obj.transform.scale_x),
                    f64::from(obj.transform.scale_y),
                );
                log::trace!(
                    "gesture object {}: scale {scale_x:.3}x{scale_y:.3}, angle {angle:.1}",
                    start.target
                );
                GestureEffect::ObjectTransformed {
                    id: start.target,
                    scale_x,
                    scale_y,
                    angle,
                }
            }
            GestureMode::ViewportZoom(start) => {
                let Some(r) = ratio(geom.distance, start.distance) else {
                    return GestureEffect::None;
                };
                let user_scale = viewport.zoom_at(start.user_scale * r, start.midpoint);
                log::trace!("gesture zoom: user {user_scale:.3}");
                GestureEffect::ViewportZoomed { user_scale }
            }
        }
    }

    /// Handle a lift. Tracking ends once fewer than two contacts remain.
    pub fn end(&mut self, remaining: &[TouchPoint]) -> GestureEffect {
        if !self.is_tracking() || remaining.len() >= 2 {
            return GestureEffect::None;
        }
        self.cancel()
    }

    /// Drop back to idle unconditionally, e.g. on `touchcancel`.
    pub fn cancel(&mut self) -> GestureEffect {
        if !self.is_tracking() {
            return GestureEffect::None;
        }
        self.state = GestureState::Idle;
        let transformed = std::mem::take(&mut self.transformed);
        log::trace!("gesture end: transformed={transformed}");
        GestureEffect::Ended { transformed }
    }
}

/// `current / initial`, or `None` when the initial distance is degenerate.
fn ratio(current: f64, initial: f64) -> Option<f64> {
    if initial > f64::EPSILON && current.is_finite() {
        Some(current / initial)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mm_core::{Chrome, ImageProps, ObjectKind, SceneObject, Size};

    fn tp(id: u32, x: f64, y: f64) -> TouchPoint {
        TouchPoint::new(id, x, y)
    }

    fn scene_with_star() -> (Scene, ObjectId) {
        let id = ObjectId::intern("gesture_star");
        let mut scene = Scene::new();
        scene.add(SceneObject::new(
            id,
            ObjectKind::Image(ImageProps {
                src: "assets/star.png".into(),
                width: 100.0,
                height: 100.0,
            }),
        ));
        (scene, id)
    }

    fn fitted_viewport() -> Viewport {
        let mut vp = Viewport::default();
        vp.fit(Some(Size::new(320.0, 480.0)), &Chrome::default());
        vp
    }

    #[test]
    fn pinch_on_selection_scales_and_rotates() {
        let (mut scene, id) = scene_with_star();
        let mut vp = fitted_viewport();
        let mut g = GestureTracker::new();

        let start = [tp(0, 100.0, 100.0), tp(1, 200.0, 100.0)];
        assert_eq!(g.start(&start, Some(id), &scene, &vp), GestureEffect::Started);

        // Twice as far apart, rotated a quarter turn.
        let moved = [tp(0, 100.0, 100.0), tp(1, 100.0, 300.0)];
        let effect = g.update(&moved, &mut scene, &mut vp);
        let GestureEffect::ObjectTransformed {
            scale_x, scale_y, angle, ..
        } = effect
        else {
            panic!("unexpected effect {effect:?}");
        };
        assert!((scale_x - 2.0).abs() < 1e-6);
        assert!((scale_y - 2.0).abs() < 1e-6);
        assert!((angle - 90.0).abs() < 1e-9);
        let obj = scene.get(id).unwrap();
        assert_eq!(obj.transform.scale_x, 2.0);
        assert_eq!(obj.transform.scale_y, 2.0);
        assert_eq!(vp.user_scale(), 1.0, "viewport untouched");

        assert_eq!(g.end(&[tp(0, 100.0, 100.0)]), GestureEffect::Ended { transformed: true });
        assert_eq!(g.state(), GestureState::Idle);
    }

    #[test]
    fn pinch_keeps_aspect_ratio() {
        let (mut scene, id) = scene_with_star();
        scene.get_mut(id).unwrap().transform.scale_x = 2.0;
        let mut vp = fitted_viewport();
        let mut g = GestureTracker::new();

        let fingers = [tp(0, 100.0, 100.0), tp(1, 200.0, 100.0)];
        g.start(&fingers, Some(id), &scene, &vp);
        g.update(&fingers, &mut scene, &mut vp);
        let t = scene.get(id).unwrap().transform;
        assert_eq!((t.scale_x, t.scale_y), (2.0, 1.0));

        // Fingers spread to 1.5x.
        g.update(&[tp(0, 100.0, 100.0), tp(1, 250.0, 100.0)], &mut scene, &mut vp);
        let t = scene.get(id).unwrap().transform;
        assert_eq!((t.scale_x, t.scale_y), (3.0, 1.5));
    }

    #[test]
    fn pinch_without_selection_zooms_viewport() {
        let (mut scene, _) = scene_with_star();
        let mut vp = fitted_viewport();
        let mut g = GestureTracker::new();

        g.start(&[tp(0, 100.0, 200.0), tp(1, 140.0, 200.0)], None, &scene, &vp);
        let anchor = vp.screen_to_logical(Point::new(120.0, 200.0));
        let effect = g.update(&[tp(0, 90.0, 200.0), tp(1, 150.0, 200.0)], &mut scene, &mut vp);
        assert_eq!(effect, GestureEffect::ViewportZoomed { user_scale: 1.5 });
        // The logical point under the start midpoint stays put.
        let after = vp.logical_to_screen(anchor);
        assert!((after.x - 120.0).abs() < 1e-9);
        assert!((after.y - 200.0).abs() < 1e-9);

        assert_eq!(g.end(&[]), GestureEffect::Ended { transformed: false });
    }

    #[test]
    fn zoom_respects_cap() {
        let (mut scene, _) = scene_with_star();
        let mut vp = fitted_viewport();
        let mut g = GestureTracker::new();
        g.start(&[tp(0, 0.0, 0.0), tp(1, 10.0, 0.0)], None, &scene, &vp);
        g.update(&[tp(0, 0.0, 0.0), tp(1, 1000.0, 0.0)], &mut scene, &mut vp);
        assert_eq!(vp.user_scale(), 2.5);
        assert_eq!(vp.total_zoom(), 2.5);
    }

    #[test]
    fn zero_initial_distance_skips_scale() {
        let (mut scene, id) = scene_with_star();
        let mut vp = fitted_viewport();
        let mut g = GestureTracker::new();
        g.start(&[tp(0, 50.0, 50.0), tp(1, 50.0, 50.0)], Some(id), &scene, &vp);
        g.update(&[tp(0, 0.0, 50.0), tp(1, 100.0, 50.0)], &mut scene, &mut vp);
        assert_eq!(scene.get(id).unwrap().transform.scale_x, 1.0);

        let mut g = GestureTracker::new();
        g.start(&[tp(0, 50.0, 50.0), tp(1, 50.0, 50.0)], None, &scene, &vp);
        assert_eq!(
            g.update(&[tp(0, 0.0, 50.0), tp(1, 100.0, 50.0)], &mut scene, &mut vp),
            GestureEffect::None
        );
        assert_eq!(vp.user_scale(), 1.0);
    }

    #[test]
    fn single_touch_does_not_start() {
        let (scene, id) = scene_with_star();
        let vp = fitted_viewport();
        let mut g = GestureTracker::new();
        assert_eq!(g.start(&[tp(0, 1.0, 1.0)], Some(id), &scene, &vp), GestureEffect::None);
        assert!(!g.is_tracking());
        assert_eq!(g.end(&[]), GestureEffect::None);
    }

    #[test]
    fn third_finger_keeps_tracking() {
        let (scene, _) = scene_with_star();
        let vp = fitted_viewport();
        let mut g = GestureTracker::new();
        g.start(&[tp(0, 0.0, 0.0), tp(1, 10.0, 0.0)], None, &scene, &vp);
        assert_eq!(
            g.end(&[tp(0, 0.0, 0.0), tp(1, 10.0, 0.0)]),
            GestureEffect::None
        );
        assert!(g.is_tracking());
    }

    #[test]
    fn stale_selection_falls_back_to_zoom() {
        let (scene, _) = scene_with_star();
        let vp = fitted_viewport();
        let mut g = GestureTracker::new();
        g.start(
            &[tp(0, 0.0, 0.0), tp(1, 10.0, 0.0)],
            Some(ObjectId::intern("gesture_missing")),
            &scene,
            &vp,
        );
        assert!(matches!(
            g.state(),
            GestureState::Tracking(GestureMode::ViewportZoom(_))
        ));
    }
}
