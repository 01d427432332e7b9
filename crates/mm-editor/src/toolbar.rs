//! Selection-bound toolbar.
//!
//! The text panel mirrors the active text object. Selecting text fills the
//! controls from its properties; selecting anything else (or nothing) shows
//! the main toolbar. A control edit goes the other way: `apply_edit` writes
//! the new value onto the active object.

use mm_core::css;
use mm_core::{ObjectKind, SceneObject, TextAlign};
use serde::Serialize;

/// Which panel the front end should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Panel {
    #[default]
    MainToolbar,
    TextEditor,
}

/// Control values for the text panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextControls {
    pub content: String,
    pub font_family: String,
    /// Always `#RRGGBB`; translucency lives in `alpha`.
    pub color: String,
    /// Fill alpha, `0.0..=1.0`.
    pub alpha: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub align: TextAlign,
    pub font_size: f32,
}

impl TextControls {
    fn from_object(obj: &SceneObject) -> Option<Self> {
        let text = obj.as_text()?;
        Some(Self {
            content: text.text.clone(),
            font_family: text.font_family.clone(),
            color: obj.fill.to_rgb_hex(),
            alpha: obj.fill.alpha(),
            bold: text.font_weight.is_bold(),
            italic: text.font_style.is_italic(),
            underline: text.underline,
            align: text.text_align,
            font_size: text.font_size,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    pub panel: Panel,
    pub text: Option<TextControls>,
}

impl ToolbarState {
    /// Rebind to a new selection.
    pub fn bind(&mut self, active: Option<&SceneObject>) {
        self.text = active.and_then(TextControls::from_object);
        self.panel = if self.text.is_some() {
            Panel::TextEditor
        } else {
            Panel::MainToolbar
        };
    }

    pub fn is_text_panel(&self) -> bool {
        self.panel == Panel::TextEditor
    }
}

/// One control edit from the text panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarEdit {
    Content(String),
    FontFamily(String),
    /// Any CSS color the parser accepts.
    Color(String),
    FontSize(f32),
    Align(TextAlign),
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
}

impl ToolbarEdit {
    /// Edits that make sense on non-text objects too.
    fn applies_to_any(&self) -> bool {
        matches!(self, ToolbarEdit::Color(_))
    }
}

/// Write `edit` onto `obj`. Returns `true` if a property actually changed.
pub fn apply_edit(obj: &mut SceneObject, edit: &ToolbarEdit) -> bool {
    if !obj.is_text() && !edit.applies_to_any() {
        return false;
    }
    match edit {
        ToolbarEdit::Color(value) => {
            let Some(color) = css::parse_color(value) else {
                log::debug!("toolbar: ignoring unparseable color {value:?}");
                return false;
            };
            replace(&mut obj.fill, color)
        }
        _ => {
            let ObjectKind::Text(text) = &mut obj.kind else {
                return false;
            };
            match edit {
                ToolbarEdit::Content(value) => replace(&mut text.text, value.clone()),
                ToolbarEdit::FontFamily(value) => {
                    let family = css::primary_font_family(value)
                        .unwrap_or_else(|| value.trim().to_string());
                    if family.is_empty() {
                        return false;
                    }
                    replace(&mut text.font_family, family)
                }
                ToolbarEdit::FontSize(size) if size.is_finite() && *size > 0.0 => {
                    replace(&mut text.font_size, *size)
                }
                ToolbarEdit::FontSize(_) => false,
                ToolbarEdit::Align(align) => replace(&mut text.text_align, *align),
                ToolbarEdit::ToggleBold => {
                    let next = text.font_weight.toggled();
                    replace(&mut text.font_weight, next)
                }
                ToolbarEdit::ToggleItalic => {
                    let next = text.font_style.toggled();
                    replace(&mut text.font_style, next)
                }
                ToolbarEdit::ToggleUnderline => {
                    text.underline = !text.underline;
                    true
                }
                ToolbarEdit::Color(_) => false,
            }
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
