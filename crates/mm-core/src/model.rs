//! Scene data model for greeting cards.
//!
//! A card is an ordered list of drawable objects on a fixed logical canvas.
//! Order is z-order: the last object is drawn on top. Each object carries a
//! transform, paint, an optional animation tag, and a kind-specific payload.
//! Text properties live only on the `Text` variant.

use crate::id::ObjectId;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Current scene format version written into snapshots and exports.
pub const SCENE_VERSION: u32 = 1;

// ─── Colors ──────────────────────────────────────────────────────────────

/// 8-bit RGBA color. Serialized as a hex string (`#RRGGBB` or `#RRGGBBAA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok();
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            3 => Some(Self::rgb(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
            4 => Some(Self::rgba(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
                nibble(3)? * 17,
            )),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Uppercase hex; alpha is only written when not fully opaque.
    /// `#RRGGBB` without alpha, the form `<input type="color">` accepts.
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Alpha as a `0.0..=1.0` fraction.
    pub fn alpha(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::css::parse_color(&s).ok_or_else(|| de::Error::custom(format!("invalid color `{s}`")))
    }
}

/// Outline drawn around an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

// ─── Fonts ───────────────────────────────────────────────────────────────

/// CSS-style font weight. Loaded designs may carry any numeric weight;
/// the editor itself only ever writes `Normal` or `Bold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Numeric(u16),
}

impl FontWeight {
    /// Bold for display purposes: the `bold` keyword or any weight >= 700.
    pub fn is_bold(&self) -> bool {
        match self {
            FontWeight::Normal => false,
            FontWeight::Bold => true,
            FontWeight::Numeric(w) => *w >= 700,
        }
    }

    pub fn toggled(&self) -> Self {
        if self.is_bold() {
            FontWeight::Normal
        } else {
            FontWeight::Bold
        }
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontWeight::Normal => f.write_str("normal"),
            FontWeight::Bold => f.write_str("bold"),
            FontWeight::Numeric(w) => write!(f, "{w}"),
        }
    }
}

impl Serialize for FontWeight {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FontWeight::Numeric(w) => serializer.serialize_u16(*w),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeightVisitor;

        impl Visitor<'_> for WeightVisitor {
            type Value = FontWeight;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a font weight keyword or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FontWeight, E> {
                crate::css::parse_font_weight(v)
                    .ok_or_else(|| E::custom(format!("invalid font weight `{v}`")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FontWeight, E> {
                u16::try_from(v)
                    .map(FontWeight::Numeric)
                    .map_err(|_| E::custom(format!("font weight {v} out of range")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FontWeight, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("font weight {v} out of range")))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FontWeight, E> {
                if v.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&v) {
                    Ok(FontWeight::Numeric(v as u16))
                } else {
                    Err(E::custom(format!("font weight {v} is not an integer")))
                }
            }
        }

        deserializer.deserialize_any(WeightVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    #[serde(alias = "oblique")]
    Italic,
}

impl FontStyle {
    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic)
    }

    pub fn toggled(&self) -> Self {
        match self {
            FontStyle::Normal => FontStyle::Italic,
            FontStyle::Italic => FontStyle::Normal,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }
}

// ─── Animation tags ──────────────────────────────────────────────────────

/// Custom animation attached to an object. Carried through snapshots,
/// exports and share links so the viewer can play it back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AnimationTag {
    /// Continuous rotation.
    Spin { degrees_per_sec: f32 },
    /// Breathing scale: `1 + amplitude * sin(2πt / period)`.
    Pulse { amplitude: f32, period_ms: u32 },
}

// ─── Objects ─────────────────────────────────────────────────────────────

/// Position, scale and rotation in logical canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub left: f32,
    pub top: f32,
    #[serde(default = "one")]
    pub scale_x: f32,
    #[serde(default = "one")]
    pub scale_y: f32,
    /// Rotation in degrees.
    #[serde(default)]
    pub angle: f32,
}

fn one() -> f32 {
    1.0
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }
}

impl Transform {
    pub fn at(left: f32, top: f32) -> Self {
        Self {
            left,
            top,
            ..Self::default()
        }
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale_x = scale;
        self.scale_y = scale;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    pub font_family: String,
    pub font_size: f32,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "sans-serif".into(),
            font_size: 40.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            underline: false,
            text_align: TextAlign::Left,
        }
    }
}

/// A raster sticker. `width`/`height` are the natural pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProps {
    pub src: String,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StickerProps {
    pub src: String,
}

/// The object kinds on a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectKind {
    #[serde(rename = "i-text", alias = "text")]
    Text(TextProps),
    #[serde(rename = "image")]
    Image(ImageProps),
    #[serde(rename = "sticker")]
    VectorSticker(StickerProps),
}

impl ObjectKind {
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Text(_) => "text",
            ObjectKind::Image(_) => "image",
            ObjectKind::VectorSticker(_) => "sticker",
        }
    }
}

/// One drawable object on the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredObject")]
pub struct SceneObject {
    pub id: ObjectId,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(default)]
    pub fill: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default = "one")]
    pub opacity: f32,
    #[serde(default)]
    pub animation: Option<AnimationTag>,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

/// Wire form of [`SceneObject`]. Designs saved straight from the canvas
/// library carry no `id`; those objects get a fresh one on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredObject {
    #[serde(default)]
    id: Option<ObjectId>,
    #[serde(flatten)]
    transform: Transform,
    #[serde(default)]
    fill: Color,
    #[serde(default)]
    stroke: Option<Stroke>,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    animation: Option<AnimationTag>,
    #[serde(flatten)]
    kind: ObjectKind,
}

impl From<StoredObject> for SceneObject {
    fn from(stored: StoredObject) -> Self {
        let id = stored
            .id
            .unwrap_or_else(|| ObjectId::with_prefix(stored.kind.name()));
        Self {
            id,
            transform: stored.transform,
            fill: stored.fill,
            stroke: stored.stroke,
            opacity: stored.opacity,
            animation: stored.animation,
            kind: stored.kind,
        }
    }
}

impl SceneObject {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            transform: Transform::default(),
            fill: Color::BLACK,
            stroke: None,
            opacity: 1.0,
            animation: None,
            kind,
        }
    }

    pub fn as_text(&self) -> Option<&TextProps> {
        match &self.kind {
            ObjectKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextProps> {
        match &mut self.kind {
            ObjectKind::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text(_))
    }
}

// ─── Scene ───────────────────────────────────────────────────────────────

/// The card contents: objects in z-order plus the background color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "scene_version", deserialize_with = "version_field")]
    pub version: u32,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default = "white")]
    pub background: Color,
}

fn scene_version() -> u32 {
    SCENE_VERSION
}

/// Our format version, or the canvas library's own semver string, which
/// predates versioning and reads as the current version.
fn version_field<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Format(u32),
        Library(String),
    }
    Ok(match Version::deserialize(deserializer)? {
        Version::Format(v) => v,
        Version::Library(_) => SCENE_VERSION,
    })
}

fn white() -> Color {
    Color::WHITE
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            version: SCENE_VERSION,
            objects: Vec::new(),
            background: Color::WHITE,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Append on top of the z-order.
    pub fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let idx = self.index_of(id)?;
        Some(self.objects.remove(idx))
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Move one step up the z-order. Returns `false` if already on top.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(idx) if idx + 1 < self.objects.len() => {
                self.objects.swap(idx, idx + 1);
                true
            }
            _ => false,
        }
    }

    /// Move one step down the z-order. Returns `false` if already at the bottom.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(idx) if idx > 0 => {
                self.objects.swap(idx, idx - 1);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str) -> SceneObject {
        SceneObject::new(
            ObjectId::intern(id),
            ObjectKind::Text(TextProps {
                text: id.to_string(),
                ..TextProps::default()
            }),
        )
    }

    #[test]
    fn hex_roundtrip() {
        let c = Color::from_hex("#FF8000").unwrap();
        assert_eq!(c, Color::rgb(255, 128, 0));
        assert_eq!(c.to_hex(), "#FF8000");
        assert_eq!(Color::from_hex("#f00").unwrap(), Color::rgb(255, 0, 0));
        assert_eq!(Color::from_hex("00000080").unwrap().to_hex(), "#00000080");
        assert_eq!(Color::from_hex("00000080").unwrap().to_rgb_hex(), "#000000");
        assert!(Color::from_hex("#12345").is_none());
        assert!(Color::from_hex("#gg0000").is_none());
    }

    #[test]
    fn bold_detection_uses_700_threshold() {
        assert!(!FontWeight::Normal.is_bold());
        assert!(FontWeight::Bold.is_bold());
        assert!(!FontWeight::Numeric(600).is_bold());
        assert!(FontWeight::Numeric(700).is_bold());
        assert!(FontWeight::Numeric(900).is_bold());
    }

    #[test]
    fn toggles_land_on_canonical_values() {
        assert_eq!(FontWeight::Numeric(600).toggled(), FontWeight::Bold);
        assert_eq!(FontWeight::Numeric(800).toggled(), FontWeight::Normal);
        assert_eq!(FontStyle::Normal.toggled(), FontStyle::Italic);
        assert_eq!(FontStyle::Italic.toggled(), FontStyle::Normal);
    }

    #[test]
    fn z_order_moves() {
        let mut scene = Scene::new();
        scene.add(text("a"));
        scene.add(text("b"));
        scene.add(text("c"));

        assert!(scene.bring_forward(ObjectId::intern("a")));
        assert_eq!(scene.index_of(ObjectId::intern("a")), Some(1));
        assert!(!scene.bring_forward(ObjectId::intern("c")));
        assert!(scene.send_backward(ObjectId::intern("c")));
        assert_eq!(scene.index_of(ObjectId::intern("c")), Some(1));
        assert!(!scene.send_backward(ObjectId::intern("b")));
    }

    #[test]
    fn remove_returns_object() {
        let mut scene = Scene::new();
        scene.add(text("gone"));
        let removed = scene.remove(ObjectId::intern("gone")).unwrap();
        assert_eq!(removed.as_text().unwrap().text, "gone");
        assert!(scene.is_empty());
        assert!(scene.remove(ObjectId::intern("gone")).is_none());
    }
}
