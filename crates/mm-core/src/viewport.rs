//! Viewport fitting.
//!
//! The card has a fixed logical size. `fit` scales it into whatever screen
//! area is left after the editor chrome (top bar, bottom bar, side drawer),
//! and the pinch gesture layers a user zoom on top:
//!
//! ```text
//! base  = clamp(min(avail_w / logical_w, avail_h / logical_h), min_base, max_total)
//! total = clamp(base * user, min_base, max_total)
//! surface = round(logical * base)
//! ```
//!
//! Screen coordinates map to logical ones as `screen = logical * total + pan`.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Scale limits and the logical card size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewportConfig {
    pub logical_width: f64,
    pub logical_height: f64,
    pub min_base_scale: f64,
    pub max_total_scale: f64,
    pub min_user_scale: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            logical_width: 320.0,
            logical_height: 480.0,
            min_base_scale: 0.1,
            max_total_scale: 2.5,
            min_user_scale: 1.0,
        }
    }
}

impl ViewportConfig {
    pub fn logical_size(&self) -> Size {
        Size::new(self.logical_width, self.logical_height)
    }
}

/// A piece of editor chrome that takes screen space while visible.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChromeBar {
    pub size: f64,
    pub visible: bool,
}

impl ChromeBar {
    pub fn shown(size: f64) -> Self {
        Self {
            size,
            visible: true,
        }
    }

    fn extent(&self) -> f64 {
        if self.visible { self.size.max(0.0) } else { 0.0 }
    }
}

/// Reserved UI around the canvas. Bars take height, the drawer takes width.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Chrome {
    pub top_bar: ChromeBar,
    pub bottom_bar: ChromeBar,
    pub side_drawer: ChromeBar,
}

impl Chrome {
    pub fn available(&self, container: Size) -> Size {
        Size::new(
            (container.width - self.side_drawer.extent()).max(0.0),
            (container.height - self.top_bar.extent() - self.bottom_bar.extent()).max(0.0),
        )
    }
}

/// Result of a fit pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub base_scale: f64,
    pub total_zoom: f64,
    /// Backing render surface size in pixels.
    pub surface_width: u32,
    pub surface_height: u32,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    pub config: ViewportConfig,
    base_scale: f64,
    user_scale: f64,
    pan: Vec2,
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            base_scale: 1.0,
            user_scale: 1.0,
            pan: Vec2::ZERO,
        }
    }

    /// Recompute the base scale for a container. A missing container is a
    /// no-op that keeps the previous state.
    pub fn fit(&mut self, container: Option<Size>, chrome: &Chrome) -> Option<Fit> {
        let container = container?;
        let avail = chrome.available(container);
        let logical = self.config.logical_size();
        let raw = (avail.width / logical.width).min(avail.height / logical.height);
        self.base_scale = if raw.is_finite() {
            raw.clamp(self.config.min_base_scale, self.config.max_total_scale)
        } else {
            self.config.min_base_scale
        };
        // A new base can make the old user zoom exceed the cap.
        self.user_scale = self.clamp_user_scale(self.user_scale);
        if self.user_scale <= 1.0 {
            self.pan = Vec2::ZERO;
        }
        log::debug!(
            "viewport fit: container {}x{}, base {:.3}, total {:.3}",
            container.width,
            container.height,
            self.base_scale,
            self.total_zoom()
        );
        Some(self.current_fit())
    }

    pub fn current_fit(&self) -> Fit {
        let logical = self.config.logical_size();
        Fit {
            base_scale: self.base_scale,
            total_zoom: self.total_zoom(),
            surface_width: (logical.width * self.base_scale).round() as u32,
            surface_height: (logical.height * self.base_scale).round() as u32,
        }
    }

    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    pub fn user_scale(&self) -> f64 {
        self.user_scale
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Render zoom: `base * user`, never above `max_total_scale`.
    pub fn total_zoom(&self) -> f64 {
        (self.base_scale * self.user_scale)
            .clamp(self.config.min_base_scale, self.config.max_total_scale)
    }

    /// Largest user scale that keeps the total zoom within the cap.
    pub fn max_user_scale(&self) -> f64 {
        (self.config.max_total_scale / self.base_scale).max(self.config.min_user_scale)
    }

    pub fn clamp_user_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.config.min_user_scale;
        }
        scale.clamp(self.config.min_user_scale, self.max_user_scale())
    }

    /// Set the user zoom so the logical point under `anchor` (screen space)
    /// stays under it. Returns the clamped scale actually applied.
    pub fn zoom_at(&mut self, user_scale: f64, anchor: Point) -> f64 {
        let logical = self.screen_to_logical(anchor);
        self.user_scale = self.clamp_user_scale(user_scale);
        let zoom = self.total_zoom();
        self.pan = anchor.to_vec2() - logical.to_vec2() * zoom;
        self.user_scale
    }

    pub fn reset_zoom(&mut self) {
        self.user_scale = 1.0_f64.max(self.config.min_user_scale);
        self.pan = Vec2::ZERO;
    }

    pub fn screen_to_logical(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.pan) / self.total_zoom()).to_point()
    }

    pub fn logical_to_screen(&self, logical: Point) -> Point {
        (logical.to_vec2() * self.total_zoom() + self.pan).to_point()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fits_800_by_600_container() {
        let mut vp = Viewport::default();
        let fit = vp
            .fit(Some(Size::new(800.0, 600.0)), &Chrome::default())
            .unwrap();
        assert!(close(fit.base_scale, 1.25));
        assert_eq!((fit.surface_width, fit.surface_height), (400, 600));
    }

    #[test]
    fn fit_is_idempotent() {
        let mut vp = Viewport::default();
        let chrome = Chrome {
            top_bar: ChromeBar::shown(56.0),
            bottom_bar: ChromeBar::shown(72.0),
            side_drawer: ChromeBar::default(),
        };
        let a = vp.fit(Some(Size::new(390.0, 844.0)), &chrome).unwrap();
        let b = vp.fit(Some(Size::new(390.0, 844.0)), &chrome).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn chrome_reduces_available_area() {
        let mut vp = Viewport::default();
        let chrome = Chrome {
            top_bar: ChromeBar::shown(60.0),
            bottom_bar: ChromeBar::shown(60.0),
            side_drawer: ChromeBar {
                size: 300.0,
                visible: false,
            },
        };
        let fit = vp.fit(Some(Size::new(800.0, 600.0)), &chrome).unwrap();
        // (600 - 120) / 480 = 1.0
        assert!(close(fit.base_scale, 1.0));

        let with_drawer = Chrome {
            side_drawer: ChromeBar::shown(600.0),
            ..chrome
        };
        let fit = vp.fit(Some(Size::new(800.0, 600.0)), &with_drawer).unwrap();
        // (800 - 600) / 320 = 0.625
        assert!(close(fit.base_scale, 0.625));
    }

    #[test]
    fn base_scale_is_clamped() {
        let mut vp = Viewport::default();
        let big = vp.fit(Some(Size::new(4000.0, 4000.0)), &Chrome::default()).unwrap();
        assert!(close(big.base_scale, 2.5));
        let tiny = vp.fit(Some(Size::new(1.0, 1.0)), &Chrome::default()).unwrap();
        assert!(close(tiny.base_scale, 0.1));
        let collapsed = vp.fit(Some(Size::ZERO), &Chrome::default()).unwrap();
        assert!(close(collapsed.base_scale, 0.1));
    }

    #[test]
    fn missing_container_is_noop() {
        let mut vp = Viewport::default();
        vp.fit(Some(Size::new(800.0, 600.0)), &Chrome::default());
        assert!(vp.fit(None, &Chrome::default()).is_none());
        assert!(close(vp.base_scale(), 1.25));
    }

    #[test]
    fn total_zoom_never_exceeds_cap() {
        let mut vp = Viewport::default();
        vp.fit(Some(Size::new(800.0, 600.0)), &Chrome::default());
        for factor in [1.0, 1.5, 2.0, 10.0, 1e6, f64::INFINITY] {
            vp.zoom_at(factor, Point::new(200.0, 300.0));
            assert!(vp.total_zoom() <= 2.5 + 1e-12, "factor {factor}");
        }
        assert!(close(vp.user_scale(), 2.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut vp = Viewport::default();
        vp.fit(Some(Size::new(800.0, 600.0)), &Chrome::default());
        let anchor = Point::new(120.0, 340.0);
        let before = vp.screen_to_logical(anchor);
        vp.zoom_at(1.6, anchor);
        let after = vp.screen_to_logical(anchor);
        assert!(close(before.x, after.x) && close(before.y, after.y));
        let back = vp.logical_to_screen(after);
        assert!(close(back.x, anchor.x) && close(back.y, anchor.y));
    }

    #[test]
    fn refit_reclamps_user_scale() {
        let mut vp = Viewport::default();
        vp.fit(Some(Size::new(400.0, 480.0)), &Chrome::default());
        vp.zoom_at(2.5, Point::ZERO);
        assert!(close(vp.user_scale(), 2.5));
        vp.fit(Some(Size::new(800.0, 960.0)), &Chrome::default());
        // base is now 2.0, so user may go up to 1.25
        assert!(close(vp.user_scale(), 1.25));
        assert!(close(vp.total_zoom(), 2.5));
    }
}
