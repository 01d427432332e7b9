//! Recipient view: loads a shared card, plays the unwrapping sequence and
//! runs object animations.

use crate::{error_json, fit_json, ok_json};
use mm_core::reveal::{RevealTimeline, RevealTimings};
use mm_core::share::{self, SharedDesign};
use mm_core::{Chrome, ObjectId, Scene, Size, Viewport, animation};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct CardViewer {
    scene: Option<Scene>,
    viewport: Viewport,
    reveal: RevealTimeline,
}

#[wasm_bindgen]
impl CardViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        crate::platform::init(log::LevelFilter::Warn);
        Self {
            scene: None,
            viewport: Viewport::default(),
            reveal: RevealTimeline::new(RevealTimings::default()),
        }
    }

    /// Load a fetched share document. Call before `open` to have the card
    /// ready when the envelope opens.
    pub fn load_shared(&mut self, json: &str) -> String {
        match SharedDesign::from_json(json) {
            Ok(doc) => {
                self.scene = Some(doc.data);
                ok_json()
            }
            Err(e) => error_json(e),
        }
    }

    /// Load an inline link payload (the `d` parameter).
    pub fn load_link(&mut self, payload: &str) -> String {
        match share::decode_scene(payload) {
            Ok(scene) => {
                self.scene = Some(scene);
                ok_json()
            }
            Err(e) => error_json(e),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.scene.is_some()
    }

    pub fn get_scene_json(&self) -> String {
        match &self.scene {
            Some(scene) => serde_json::to_string(scene).unwrap_or_else(error_json),
            None => "null".to_string(),
        }
    }

    pub fn set_container(&mut self, width: f64, height: f64) -> String {
        match self.viewport.fit(Some(Size::new(width, height)), &Chrome::default()) {
            Some(fit) => fit_json(&fit),
            None => "null".to_string(),
        }
    }

    /// Start the unwrapping sequence. Later calls are ignored.
    pub fn open(&mut self, now_ms: f64) {
        self.reveal.open(now_ms);
    }

    /// Current reveal frame as JSON.
    pub fn frame(&self, now_ms: f64) -> String {
        serde_json::to_string(&self.reveal.frame(now_ms)).unwrap_or_else(error_json)
    }

    /// Whether the loaded card animates and needs redraws every frame.
    pub fn is_animated(&self) -> bool {
        self.scene.as_ref().is_some_and(animation::is_animated)
    }

    /// Angle to draw `id` at, `elapsed_ms` since the card was revealed.
    pub fn display_angle(&self, id: &str, elapsed_ms: f64) -> f64 {
        let id = ObjectId::intern(id);
        self.scene
            .as_ref()
            .and_then(|scene| scene.get(id))
            .map_or(0.0, |obj| animation::display_angle(obj, elapsed_ms))
    }

    /// Pulse multiplier for `id` at `elapsed_ms` since the card was revealed.
    pub fn display_scale(&self, id: &str, elapsed_ms: f64) -> f64 {
        let id = ObjectId::intern(id);
        self.scene
            .as_ref()
            .and_then(|scene| scene.get(id))
            .map_or(1.0, |obj| animation::pulse_factor(obj, elapsed_ms))
    }
}

impl Default for CardViewer {
    fn default() -> Self {
        Self::new()
    }
}
