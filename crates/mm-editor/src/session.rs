//! The editor session: single owner of everything a card editor tracks.
//!
//! `EditorSession` holds the scene, the selection, the viewport, history,
//! the gesture tracker and the toolbar binding, and is the only thing that
//! mutates them. The front end feeds it events and polls `tick()`; it reads
//! back the scene, the fit and the toolbar state to render.
//!
//! Every user-visible change goes through `changed()`, which requests a
//! render and schedules a debounced history snapshot. While a history
//! restore installs a scene, the same path runs but the history manager
//! ignores the request.

use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::gesture::{GestureEffect, GestureTracker};
use crate::history::{HistoryManager, Recovery};
use crate::input::{InputEvent, TouchPoint};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::storage::RecoveryStore;
use crate::toolbar::{ToolbarEdit, ToolbarState, apply_edit};
use mm_core::share::{self, SharedDesign};
use mm_core::snapshot::{export_json, scene_from_json};
use mm_core::{
    AnimationTag, Chrome, Color, Fit, ImageProps, ObjectId, ObjectKind, Scene, SceneObject, Size,
    StickerProps, TextProps, Transform, Viewport, animation, assets,
};

/// Default content of a new text object.
pub const DEFAULT_TEXT: &str = "Merry Xmas";
/// Default font of a new text object.
pub const DEFAULT_FONT: &str = "Mountains of Christmas";
const DEFAULT_FONT_SIZE: f32 = 40.0;
/// Half the nominal width of a new object; placement offsets it from center.
const PLACEMENT_OFFSET: f32 = 50.0;

/// A direct scene edit, typically reported by the renderer after the user
/// drags or resizes an object with one finger or the mouse.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    SetTransform { id: ObjectId, transform: Transform },
    SetAnimation { id: ObjectId, animation: Option<AnimationTag> },
    SetBackground(Color),
    AddObject(Box<SceneObject>),
    RemoveObject { id: ObjectId },
    BringForward { id: ObjectId },
    SendBackward { id: ObjectId },
}

/// What a `tick` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub snapshot_pushed: bool,
    pub autosaved: bool,
    pub animated: bool,
}

pub struct EditorSession {
    config: EditorConfig,
    scene: Scene,
    selection: Option<ObjectId>,
    viewport: Viewport,
    chrome: Chrome,
    container: Option<Size>,
    history: HistoryManager,
    gesture: GestureTracker,
    toolbar: ToolbarState,
    store: Box<dyn RecoveryStore>,
    clock: Box<dyn Clock>,
    recovery: Recovery,
    started_at: f64,
    render_requested: bool,
}

impl EditorSession {
    /// Start a session, restoring the recovery snapshot if one exists.
    pub fn new(
        config: EditorConfig,
        mut store: Box<dyn RecoveryStore>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let now = clock.now_ms();
        let mut history = HistoryManager::new(
            config.history_limit,
            config.debounce_ms,
            config.autosave_interval_ms,
            config.recovery_key.clone(),
        );
        let mut scene = Scene::new();
        let recovery = history.recover(&mut scene, store.as_mut(), now);
        log::debug!("session start: {recovery:?}, {} objects", scene.len());

        Self {
            viewport: Viewport::new(config.viewport),
            config,
            scene,
            selection: None,
            chrome: Chrome::default(),
            container: None,
            history,
            gesture: GestureTracker::new(),
            toolbar: ToolbarState::default(),
            store,
            clock,
            recovery,
            started_at: now,
            render_requested: true,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn selection(&self) -> Option<ObjectId> {
        self.selection
    }

    pub fn selected_object(&self) -> Option<&SceneObject> {
        self.selection.and_then(|id| self.scene.get(id))
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn toolbar(&self) -> &ToolbarState {
        &self.toolbar
    }

    pub fn gesture(&self) -> &GestureTracker {
        &self.gesture
    }

    pub fn recovery(&self) -> Recovery {
        self.recovery
    }

    /// Returns and clears the pending render request.
    pub fn take_render_request(&mut self) -> bool {
        std::mem::take(&mut self.render_requested)
    }

    /// Milliseconds since the session started, on the session clock.
    pub fn elapsed_ms(&self) -> f64 {
        self.clock.now_ms() - self.started_at
    }

    /// Angle to draw `id` at, including any spin so far.
    pub fn display_angle(&self, id: ObjectId) -> f64 {
        self.scene
            .get(id)
            .map_or(0.0, |obj| animation::display_angle(obj, self.elapsed_ms()))
    }

    /// Display scale multiplier for `id` (pulse animation), `1.0` if none.
    pub fn display_scale(&self, id: ObjectId) -> f64 {
        self.scene
            .get(id)
            .map_or(1.0, |obj| animation::pulse_factor(obj, self.elapsed_ms()))
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// Record a new container size (`None` while the element is missing)
    /// and refit.
    pub fn set_container(&mut self, container: Option<Size>) -> Option<Fit> {
        self.container = container;
        self.fit()
    }

    /// Record a chrome change (a bar or the drawer shown or hidden) and refit.
    pub fn set_chrome(&mut self, chrome: Chrome) -> Option<Fit> {
        self.chrome = chrome;
        self.fit()
    }

    pub fn fit(&mut self) -> Option<Fit> {
        let fit = self.viewport.fit(self.container, &self.chrome)?;
        self.render_requested = true;
        Some(fit)
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
        self.render_requested = true;
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Make `id` the active object. Unknown ids clear the selection.
    pub fn select(&mut self, id: ObjectId) -> bool {
        let found = self.scene.get(id).is_some();
        self.selection = found.then_some(id);
        self.bind_toolbar();
        self.render_requested = true;
        found
    }

    pub fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.render_requested = true;
        }
        self.bind_toolbar();
    }

    fn bind_toolbar(&mut self) {
        let active = self.selection.and_then(|id| self.scene.get(id));
        self.toolbar.bind(active);
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Add the default greeting text near the middle of the card and select it.
    pub fn add_text(&mut self) -> ObjectId {
        let logical = self.config.viewport.logical_size();
        let id = ObjectId::with_prefix("text");
        let mut obj = SceneObject::new(
            id,
            ObjectKind::Text(TextProps {
                text: DEFAULT_TEXT.into(),
                font_family: DEFAULT_FONT.into(),
                font_size: DEFAULT_FONT_SIZE,
                ..TextProps::default()
            }),
        );
        obj.transform = Transform::at(
            logical.width as f32 / 2.0 - PLACEMENT_OFFSET,
            logical.height as f32 / 2.0,
        );
        obj.fill = Color::BLACK;
        self.insert_and_select(obj);
        id
    }

    /// Add a sticker from `path` near the middle of the card and select it.
    ///
    /// SVG paths become vector stickers, everything else an image. Pass the
    /// natural size if it is known now; otherwise call `set_natural_size`
    /// once the asset has loaded.
    pub fn add_sticker(&mut self, path: &str, natural: Option<Size>) -> ObjectId {
        let logical = self.config.viewport.logical_size();
        let id = ObjectId::with_prefix("sticker");
        let kind = if assets::is_vector(path) {
            ObjectKind::VectorSticker(StickerProps { src: path.into() })
        } else {
            ObjectKind::Image(ImageProps {
                src: path.into(),
                width: 0.0,
                height: 0.0,
            })
        };
        let mut obj = SceneObject::new(id, kind);
        obj.transform = Transform::at(
            logical.width as f32 / 2.0 - PLACEMENT_OFFSET,
            logical.height as f32 / 2.0 - PLACEMENT_OFFSET,
        );
        if let Some(size) = natural {
            fit_sticker(&mut obj, size, self.config.sticker_width);
        }
        self.insert_and_select(obj);
        id
    }

    /// Record the loaded size of a sticker and scale it to the configured
    /// sticker width.
    pub fn set_natural_size(&mut self, id: ObjectId, natural: Size) -> bool {
        let width = self.config.sticker_width;
        let Some(obj) = self.scene.get_mut(id) else {
            return false;
        };
        if obj.is_text() || !fit_sticker(obj, natural, width) {
            return false;
        }
        self.changed();
        true
    }

    fn insert_and_select(&mut self, obj: SceneObject) {
        let id = obj.id;
        log::debug!("add {} {id}", obj.kind.name());
        self.scene.add(obj);
        self.selection = Some(id);
        self.bind_toolbar();
        self.changed();
    }

    /// Remove the active object. Returns `false` if nothing was selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.take() else {
            return false;
        };
        let removed = self.scene.remove(id).is_some();
        self.bind_toolbar();
        if removed {
            self.changed();
        }
        removed
    }

    pub fn bring_forward(&mut self) -> bool {
        match self.selection {
            Some(id) => self.apply_mutation(SceneMutation::BringForward { id }),
            None => false,
        }
    }

    pub fn send_backward(&mut self) -> bool {
        match self.selection {
            Some(id) => self.apply_mutation(SceneMutation::SendBackward { id }),
            None => false,
        }
    }

    /// Tag the active object with an animation, or clear its tag.
    pub fn set_animation(&mut self, animation: Option<AnimationTag>) -> bool {
        match self.selection {
            Some(id) => self.apply_mutation(SceneMutation::SetAnimation { id, animation }),
            None => false,
        }
    }

    /// Apply a text panel edit to the active object.
    pub fn edit(&mut self, edit: &ToolbarEdit) -> bool {
        let Some(obj) = self.selection.and_then(|id| self.scene.get_mut(id)) else {
            return false;
        };
        if !apply_edit(obj, edit) {
            return false;
        }
        self.bind_toolbar();
        self.changed();
        true
    }

    /// Apply a direct scene edit. Returns `true` if the scene changed.
    pub fn apply_mutation(&mut self, mutation: SceneMutation) -> bool {
        let changed = match mutation {
            SceneMutation::SetTransform { id, transform } => match self.scene.get_mut(id) {
                Some(obj) if obj.transform != transform => {
                    obj.transform = transform;
                    true
                }
                _ => false,
            },
            SceneMutation::SetAnimation { id, animation } => match self.scene.get_mut(id) {
                Some(obj) if obj.animation != animation => {
                    obj.animation = animation;
                    true
                }
                _ => false,
            },
            SceneMutation::SetBackground(color) => {
                let changed = self.scene.background != color;
                self.scene.background = color;
                changed
            }
            SceneMutation::AddObject(obj) => {
                if self.scene.get(obj.id).is_some() {
                    log::warn!("add: duplicate object id {}", obj.id);
                    false
                } else {
                    self.scene.add(*obj);
                    true
                }
            }
            SceneMutation::RemoveObject { id } => {
                if self.selection == Some(id) {
                    self.selection = None;
                }
                self.scene.remove(id).is_some()
            }
            SceneMutation::BringForward { id } => self.scene.bring_forward(id),
            SceneMutation::SendBackward { id } => self.scene.send_backward(id),
        };
        if changed {
            self.bind_toolbar();
            self.changed();
        }
        changed
    }

    /// Common tail of every user-visible change.
    fn changed(&mut self) {
        self.render_requested = true;
        let now = self.clock.now_ms();
        self.history.schedule_snapshot(now);
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        match self.history.undo_target() {
            Some(idx) => self.restore(idx),
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo_target() {
            Some(idx) => self.restore(idx),
            None => false,
        }
    }

    /// Install history entry `idx` as the live scene.
    pub fn restore(&mut self, idx: usize) -> bool {
        let Some(scene) = self.history.begin_restore(idx) else {
            return false;
        };
        self.install(scene);
        self.history.end_restore();
        log::debug!("restored history entry {idx}");
        true
    }

    /// Replace the scene, dropping a selection that no longer exists.
    fn install(&mut self, scene: Scene) {
        self.scene = scene;
        if self.selection.is_some_and(|id| self.scene.get(id).is_none()) {
            self.selection = None;
        }
        self.bind_toolbar();
        self.changed();
    }

    /// Push a snapshot now, skipping the debounce.
    pub fn commit(&mut self) -> bool {
        self.history.push_snapshot(&self.scene, self.store.as_mut())
    }

    pub fn clear_recovery(&mut self) {
        self.history.clear_recovery(self.store.as_mut());
    }

    // ─── Timers ──────────────────────────────────────────────────────────

    /// Run due timers and advance animations. Call once per frame.
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.clock.now_ms();
        let polled = self.history.poll(&self.scene, self.store.as_mut(), now);
        let animated = animation::is_animated(&self.scene);
        if animated {
            self.render_requested = true;
        }
        TickOutcome {
            snapshot_pushed: polled.pushed,
            autosaved: polled.autosaved,
            animated,
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    pub fn handle_input(&mut self, event: &InputEvent) -> GestureEffect {
        match event {
            InputEvent::TouchStart(touches) => self.touch_start(touches),
            InputEvent::TouchMove(touches) => self.touch_move(touches),
            InputEvent::TouchEnd { remaining } => self.touch_end(remaining),
            InputEvent::Key {
                key,
                ctrl,
                shift,
                alt,
                meta,
            } => {
                self.key(key, *ctrl, *shift, *alt, *meta);
                GestureEffect::None
            }
        }
    }

    pub fn touch_start(&mut self, touches: &[TouchPoint]) -> GestureEffect {
        self.gesture
            .start(touches, self.selection, &self.scene, &self.viewport)
    }

    pub fn touch_move(&mut self, touches: &[TouchPoint]) -> GestureEffect {
        let effect = self
            .gesture
            .update(touches, &mut self.scene, &mut self.viewport);
        if !matches!(effect, GestureEffect::None) {
            self.render_requested = true;
        }
        effect
    }

    pub fn touch_end(&mut self, remaining: &[TouchPoint]) -> GestureEffect {
        let effect = self.gesture.end(remaining);
        if let GestureEffect::Ended { transformed: true } = effect {
            self.changed();
        }
        effect
    }

    /// Resolve and run a keyboard shortcut. Returns the action taken.
    pub fn key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta)?;
        self.perform(action);
        Some(action)
    }

    pub fn perform(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::AddText => {
                self.add_text();
                true
            }
            ShortcutAction::ToggleBold => self.edit(&ToolbarEdit::ToggleBold),
            ShortcutAction::ToggleItalic => self.edit(&ToolbarEdit::ToggleItalic),
            ShortcutAction::ToggleUnderline => self.edit(&ToolbarEdit::ToggleUnderline),
            ShortcutAction::BringForward => self.bring_forward(),
            ShortcutAction::SendBackward => self.send_backward(),
            ShortcutAction::ResetZoom => {
                self.reset_zoom();
                true
            }
            ShortcutAction::Deselect => {
                let had = self.selection.is_some();
                self.clear_selection();
                had
            }
        }
    }

    // ─── Load / export / share ───────────────────────────────────────────

    /// Replace the card with `scene` and reseed history with it.
    pub fn load_scene(&mut self, scene: Scene) {
        self.scene = scene;
        self.selection = None;
        self.bind_toolbar();
        self.gesture.cancel();
        self.history.reseed(&self.scene, self.store.as_mut());
        self.render_requested = true;
        log::debug!("loaded scene with {} objects", self.scene.len());
    }

    /// Load an exported card file.
    pub fn load_json(&mut self, json: &str) -> mm_core::Result<()> {
        let scene = scene_from_json(json)?;
        self.load_scene(scene);
        Ok(())
    }

    /// Load a shared design document (`{data, createdAt}`).
    pub fn load_shared(&mut self, json: &str) -> mm_core::Result<()> {
        let doc = SharedDesign::from_json(json)?;
        self.load_scene(doc.data);
        Ok(())
    }

    /// Load a scene from an inline share payload (the `d` parameter).
    pub fn load_link(&mut self, payload: &str) -> mm_core::Result<()> {
        let scene = share::decode_scene(payload)?;
        self.load_scene(scene);
        Ok(())
    }

    /// Pretty JSON for the download file.
    pub fn export(&self) -> mm_core::Result<String> {
        export_json(&self.scene)
    }

    /// Body for a shared design document, stamped with `created_at_ms`.
    pub fn share_document(&self, created_at_ms: f64) -> mm_core::Result<String> {
        SharedDesign::new(self.scene.clone(), created_at_ms).to_json()
    }

    /// A self-contained viewer link.
    pub fn share_link(&self, origin: &str, path: &str) -> mm_core::Result<String> {
        share::inline_url(origin, path, &self.scene)
    }
}

/// Scale a sticker to `target_width` from its natural size. Returns `false`
/// for unusable sizes.
fn fit_sticker(obj: &mut SceneObject, natural: Size, target_width: f32) -> bool {
    if !(natural.width > 0.0 && natural.width.is_finite() && natural.height.is_finite()) {
        return false;
    }
    if let ObjectKind::Image(img) = &mut obj.kind {
        img.width = natural.width as f32;
        img.height = natural.height as f32;
    }
    obj.transform
        .set_uniform_scale(target_width / natural.width as f32);
    true
}
