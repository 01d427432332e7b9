//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the browser bridge and native tests share one table.
//!
//! Keys typed into the text panel never reach here; the front end only
//! forwards keys pressed while the canvas has focus.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Delete,
    AddText,

    // ── Text styling ──
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,

    // ── Z-order ──
    SendBackward,
    BringForward,

    // ── View ──
    ResetZoom,

    // ── UI ──
    Deselect,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` plays the same role, so either
/// counts as the command modifier.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "b" | "B" => Some(ShortcutAction::ToggleBold),
                "i" | "I" => Some(ShortcutAction::ToggleItalic),
                "u" | "U" => Some(ShortcutAction::ToggleUnderline),
                "0" => Some(ShortcutAction::ResetZoom),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            "]" => Some(ShortcutAction::BringForward),
            "[" => Some(ShortcutAction::SendBackward),
            "t" | "T" if !shift => Some(ShortcutAction::AddText),
            _ => None,
        }
    }
}
