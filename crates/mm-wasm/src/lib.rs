//! WASM bridge for MerryMaker: exposes the card editor and the card viewer
//! to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Methods that can fail return
//! JSON strings: `{"ok":true,...}` or `{"ok":false,"error":"..."}`.

mod platform;
mod viewer;

pub use viewer::CardViewer;

use mm_core::share::{self, ShareTarget};
use mm_core::snapshot::EXPORT_FILE_NAME;
use mm_core::{AnimationTag, Chrome, ChromeBar, Fit, ObjectId, Size, TextAlign, Transform, assets};
use mm_editor::{
    EditorConfig, EditorSession, GestureEffect, ShortcutAction, ToolbarEdit, TouchPoint, Touches,
};
use platform::{JsClock, LocalStorageStore};
use serde_json::json;
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// The editor controller. All interaction from the page goes through here.
#[wasm_bindgen]
pub struct CardEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl CardEditor {
    /// Create the editor, restoring the last autosaved card if there is one.
    ///
    /// `config_json` is an optional partial `EditorConfig`; an invalid one is
    /// logged and replaced by the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, log_level: Option<String>) -> Self {
        platform::init(
            log_level
                .as_deref()
                .map_or(log::LevelFilter::Warn, platform::level_from_name),
        );
        let config = match config_json.as_deref() {
            Some(json) => EditorConfig::from_json(json).unwrap_or_else(|e| {
                log::warn!("invalid editor config, using defaults: {e}");
                EditorConfig::default()
            }),
            None => EditorConfig::default(),
        };
        let session = EditorSession::new(
            config,
            Box::new(LocalStorageStore::new()),
            Box::new(JsClock),
        );
        Self { session }
    }

    /// `true` if the session started from a recovered card.
    pub fn recovered(&self) -> bool {
        self.session.recovery() == mm_editor::Recovery::Restored
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// Fit the card into the canvas container. Returns the fit as JSON.
    pub fn set_container(&mut self, width: f64, height: f64) -> String {
        let fit = self.session.set_container(Some(Size::new(width, height)));
        fit.as_ref().map_or_else(|| "null".to_string(), fit_json)
    }

    /// The container element went away; keep the previous fit.
    pub fn clear_container(&mut self) {
        self.session.set_container(None);
    }

    /// Report the size and visibility of the editor chrome and refit.
    #[allow(clippy::too_many_arguments)]
    pub fn set_chrome(
        &mut self,
        top: f64,
        top_visible: bool,
        bottom: f64,
        bottom_visible: bool,
        drawer: f64,
        drawer_visible: bool,
    ) -> String {
        let bar = |size, visible| ChromeBar { size, visible };
        let fit = self.session.set_chrome(Chrome {
            top_bar: bar(top, top_visible),
            bottom_bar: bar(bottom, bottom_visible),
            side_drawer: bar(drawer, drawer_visible),
        });
        fit.as_ref().map_or_else(|| "null".to_string(), fit_json)
    }

    /// Zoom and pan as JSON: `{"baseScale","userScale","totalZoom","panX","panY"}`.
    pub fn get_zoom_json(&self) -> String {
        let vp = self.session.viewport();
        json!({
            "baseScale": vp.base_scale(),
            "userScale": vp.user_scale(),
            "totalZoom": vp.total_zoom(),
            "panX": vp.pan().x,
            "panY": vp.pan().y,
        })
        .to_string()
    }

    pub fn reset_zoom(&mut self) {
        self.session.reset_zoom();
    }

    // ─── Scene ───────────────────────────────────────────────────────────

    pub fn get_scene_json(&self) -> String {
        serde_json::to_string(self.session.scene()).unwrap_or_else(error_json)
    }

    /// Whether the scene changed visibly since the last call.
    pub fn take_render_request(&mut self) -> bool {
        self.session.take_render_request()
    }

    /// Angle to draw `id` at, spin included.
    pub fn display_angle(&self, id: &str) -> f64 {
        self.session.display_angle(ObjectId::intern(id))
    }

    /// Pulse multiplier to apply to `id` when drawing.
    pub fn display_scale(&self, id: &str) -> f64 {
        self.session.display_scale(ObjectId::intern(id))
    }

    pub fn add_text(&mut self) -> String {
        self.session.add_text().as_str().to_string()
    }

    /// Add a sticker by asset path. Report its size with `set_natural_size`
    /// once the image loads.
    pub fn add_sticker(&mut self, path: &str) -> String {
        self.session.add_sticker(path, None).as_str().to_string()
    }

    pub fn set_natural_size(&mut self, id: &str, width: f64, height: f64) -> bool {
        self.session
            .set_natural_size(ObjectId::intern(id), Size::new(width, height))
    }

    pub fn delete_selected(&mut self) -> bool {
        self.session.delete_selected()
    }

    /// Commit a drag/resize/rotate the renderer performed on an object.
    pub fn set_object_transform(
        &mut self,
        id: &str,
        left: f32,
        top: f32,
        scale_x: f32,
        scale_y: f32,
        angle: f32,
    ) -> bool {
        self.session
            .apply_mutation(mm_editor::SceneMutation::SetTransform {
                id: ObjectId::intern(id),
                transform: Transform {
                    left,
                    top,
                    scale_x,
                    scale_y,
                    angle,
                },
            })
    }

    pub fn bring_forward(&mut self) -> bool {
        self.session.bring_forward()
    }

    pub fn send_backward(&mut self) -> bool {
        self.session.send_backward()
    }

    /// Set the active object's animation from JSON (`null` clears it).
    pub fn set_animation_json(&mut self, json: &str) -> String {
        match serde_json::from_str::<Option<AnimationTag>>(json) {
            Ok(tag) => json!({ "ok": true, "changed": self.session.set_animation(tag) }).to_string(),
            Err(e) => error_json(e),
        }
    }

    // ─── Selection & toolbar ─────────────────────────────────────────────

    pub fn select(&mut self, id: &str) -> bool {
        self.session.select(ObjectId::intern(id))
    }

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    /// Selected object id, or an empty string.
    pub fn get_selected_id(&self) -> String {
        self.session
            .selection()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Toolbar binding as JSON: `{"panel":"textEditor","text":{...}}`.
    pub fn get_toolbar_json(&self) -> String {
        serde_json::to_string(self.session.toolbar()).unwrap_or_else(error_json)
    }

    /// Apply a text panel control. Returns `true` if the object changed.
    ///
    /// Keys: `content`, `fontFamily`, `color`, `fontSize`, `textAlign`,
    /// and the toggles `bold`, `italic`, `underline` (value ignored).
    pub fn set_text_prop(&mut self, key: &str, value: &str) -> bool {
        match parse_edit(key, value) {
            Some(edit) => self.session.edit(&edit),
            None => {
                log::debug!("unknown text prop {key}={value:?}");
                false
            }
        }
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.session.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.history().can_redo()
    }

    pub fn clear_recovery(&mut self) {
        self.session.clear_recovery();
    }

    /// Run due timers and animations. Call from `requestAnimationFrame`.
    /// Returns `{"snapshotPushed","autosaved","animated"}`.
    pub fn tick(&mut self) -> String {
        let out = self.session.tick();
        json!({
            "snapshotPushed": out.snapshot_pushed,
            "autosaved": out.autosaved,
            "animated": out.animated,
        })
        .to_string()
    }

    // ─── Touch & keyboard ────────────────────────────────────────────────

    /// Touches are passed flat as `[id, x, y, id, x, y, ...]`.
    pub fn touch_start(&mut self, touches: &[f64]) -> String {
        effect_json(self.session.touch_start(&parse_touches(touches)))
    }

    pub fn touch_move(&mut self, touches: &[f64]) -> String {
        effect_json(self.session.touch_move(&parse_touches(touches)))
    }

    /// `remaining` holds the contacts still down, flat like `touch_start`.
    pub fn touch_end(&mut self, remaining: &[f64]) -> String {
        effect_json(self.session.touch_end(&parse_touches(remaining)))
    }

    /// Handle a keyboard event. Returns `{"changed":bool,"action":"<name>"}`.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let Some(action) = mm_editor::ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return r#"{"changed":false,"action":"none"}"#.to_string();
        };
        let changed = self.session.perform(action);
        json!({ "changed": changed, "action": action_to_name(action) }).to_string()
    }

    // ─── Load / export / share ───────────────────────────────────────────

    /// Load an exported card file.
    pub fn load_json(&mut self, json: &str) -> String {
        result_json(self.session.load_json(json))
    }

    /// Load a fetched share document.
    pub fn load_shared(&mut self, json: &str) -> String {
        result_json(self.session.load_shared(json))
    }

    /// Load an inline link payload (the `d` parameter).
    pub fn load_link(&mut self, payload: &str) -> String {
        result_json(self.session.load_link(payload))
    }

    /// `{"ok":true,"fileName":"...","json":"..."}` for the download.
    pub fn export_json(&self) -> String {
        match self.session.export() {
            Ok(body) => json!({ "ok": true, "fileName": EXPORT_FILE_NAME, "json": body }).to_string(),
            Err(e) => error_json(e),
        }
    }

    /// Body to store as a share document, stamped with the current time.
    pub fn share_document(&self) -> String {
        match self.session.share_document(js_sys::Date::now()) {
            Ok(body) => json!({ "ok": true, "document": body }).to_string(),
            Err(e) => error_json(e),
        }
    }

    /// Viewer URL for a stored document id: `{"ok":true,"url":"..."}`.
    pub fn document_url(&self, origin: &str, path: &str, id: &str) -> String {
        match share::document_url(origin, path, id) {
            Ok(url) => json!({ "ok": true, "url": url }).to_string(),
            Err(e) => error_json(e),
        }
    }

    /// Self-contained viewer URL carrying the card in the query string.
    pub fn share_link(&self, origin: &str, path: &str) -> String {
        match self.session.share_link(origin, path) {
            Ok(url) => json!({ "ok": true, "url": url }).to_string(),
            Err(e) => error_json(e),
        }
    }
}

// ─── Standalone helpers (no editor needed) ───────────────────────────────

/// Parse a repository directory listing into sticker names.
/// Returns `{"ok":true,"assets":[...]}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn parse_asset_listing(json: &str) -> String {
    match assets::parse_listing(json) {
        Ok(names) => json!({ "ok": true, "assets": names }).to_string(),
        Err(e) => error_json(e),
    }
}

/// Filter sticker names (JSON array) by a search query. Returns a JSON array.
#[wasm_bindgen]
pub fn filter_assets(names_json: &str, query: &str) -> String {
    let names: Vec<String> = serde_json::from_str(names_json).unwrap_or_default();
    json!(assets::filter_assets(&names, query)).to_string()
}

#[wasm_bindgen]
pub fn asset_path(name: &str) -> String {
    assets::asset_path(name)
}

/// What a viewer URL query points at:
/// `{"kind":"document","id":"..."}`, `{"kind":"inline","payload":"..."}` or `null`.
#[wasm_bindgen]
pub fn parse_share_query(query: &str) -> String {
    match share::parse_query(query) {
        Some(ShareTarget::Document(id)) => json!({ "kind": "document", "id": id }).to_string(),
        Some(ShareTarget::Inline(payload)) => {
            json!({ "kind": "inline", "payload": payload }).to_string()
        }
        None => "null".to_string(),
    }
}

// ─── JSON plumbing ───────────────────────────────────────────────────────

pub(crate) fn ok_json() -> String {
    r#"{"ok":true}"#.to_string()
}

pub(crate) fn error_json(e: impl Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

fn result_json(result: mm_core::Result<()>) -> String {
    match result {
        Ok(()) => ok_json(),
        Err(e) => error_json(e),
    }
}

pub(crate) fn fit_json(fit: &Fit) -> String {
    json!({
        "baseScale": fit.base_scale,
        "totalZoom": fit.total_zoom,
        "surfaceWidth": fit.surface_width,
        "surfaceHeight": fit.surface_height,
    })
    .to_string()
}

fn effect_json(effect: GestureEffect) -> String {
    match effect {
        GestureEffect::None => json!({ "effect": "none" }),
        GestureEffect::Started => json!({ "effect": "started" }),
        GestureEffect::ObjectTransformed {
            id,
            scale_x,
            scale_y,
            angle,
        } => json!({
            "effect": "objectTransformed",
            "id": id.as_str(),
            "scaleX": scale_x,
            "scaleY": scale_y,
            "angle": angle,
        }),
        GestureEffect::ViewportZoomed { user_scale } => {
            json!({ "effect": "viewportZoomed", "userScale": user_scale })
        }
        GestureEffect::Ended { transformed } => {
            json!({ "effect": "ended", "transformed": transformed })
        }
    }
    .to_string()
}

fn parse_touches(flat: &[f64]) -> Touches {
    flat.chunks_exact(3)
        .map(|t| TouchPoint::new(t[0] as u32, t[1], t[2]))
        .collect()
}

fn parse_edit(key: &str, value: &str) -> Option<ToolbarEdit> {
    Some(match key {
        "content" | "text" => ToolbarEdit::Content(value.to_string()),
        "fontFamily" => ToolbarEdit::FontFamily(value.to_string()),
        "color" | "fill" => ToolbarEdit::Color(value.to_string()),
        "fontSize" => ToolbarEdit::FontSize(value.trim().parse().ok()?),
        "textAlign" => ToolbarEdit::Align(TextAlign::from_name(value)?),
        "bold" => ToolbarEdit::ToggleBold,
        "italic" => ToolbarEdit::ToggleItalic,
        "underline" => ToolbarEdit::ToggleUnderline,
        _ => return None,
    })
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::AddText => "addText",
        ShortcutAction::ToggleBold => "toggleBold",
        ShortcutAction::ToggleItalic => "toggleItalic",
        ShortcutAction::ToggleUnderline => "toggleUnderline",
        ShortcutAction::SendBackward => "sendBackward",
        ShortcutAction::BringForward => "bringForward",
        ShortcutAction::ResetZoom => "resetZoom",
        ShortcutAction::Deselect => "deselect",
    }
}
