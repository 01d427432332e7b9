//! Immutable scene snapshots and the JSON formats built on them.
//!
//! A `Snapshot` is the JSON text of a `Scene` at one instant. History entries
//! and the recovery copy are snapshots. They are never mutated; cloning
//! shares the text.

use crate::error::{Error, Result};
use crate::model::{SCENE_VERSION, Scene};
use std::fmt;
use std::sync::Arc;

/// Suggested file name for exported cards.
pub const EXPORT_FILE_NAME: &str = "merrymaker-card.json";

#[derive(Clone, PartialEq, Eq)]
pub struct Snapshot(Arc<str>);

impl Snapshot {
    /// Serialize the full scene, including animation tags.
    pub fn capture(scene: &Scene) -> Result<Self> {
        let json = serde_json::to_string(scene)?;
        Ok(Self(json.into()))
    }

    /// Wrap previously persisted JSON. The text is validated on `restore`,
    /// not here, so recovery can log and skip a corrupt entry.
    pub fn from_json(json: impl Into<Arc<str>>) -> Self {
        Self(json.into())
    }

    pub fn as_json(&self) -> &str {
        &self.0
    }

    /// Rebuild the scene this snapshot was taken from.
    pub fn restore(&self) -> Result<Scene> {
        scene_from_json(&self.0)
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Snapshot({} bytes)", self.0.len())
    }
}

/// Parse scene JSON from a snapshot, export file or shared document.
pub fn scene_from_json(json: &str) -> Result<Scene> {
    let scene: Scene = serde_json::from_str(json)?;
    check_version(&scene)?;
    Ok(scene)
}

pub(crate) fn check_version(scene: &Scene) -> Result<()> {
    if scene.version > SCENE_VERSION {
        return Err(Error::UnsupportedVersion(scene.version));
    }
    Ok(())
}

/// Pretty-printed JSON for the downloadable export file.
pub fn export_json(scene: &Scene) -> Result<String> {
    Ok(serde_json::to_string_pretty(scene)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ObjectId;
    use crate::model::*;
    use pretty_assertions::assert_eq;

    fn card() -> Scene {
        let mut scene = Scene::new();
        let mut title = SceneObject::new(
            ObjectId::intern("title"),
            ObjectKind::Text(TextProps {
                text: "Merry Xmas".into(),
                font_family: "Mountains of Christmas".into(),
                font_weight: FontWeight::Numeric(600),
                ..TextProps::default()
            }),
        );
        title.animation = Some(AnimationTag::Pulse {
            amplitude: 0.1,
            period_ms: 1200,
        });
        scene.add(title);
        let mut star = SceneObject::new(
            ObjectId::intern("star"),
            ObjectKind::Image(ImageProps {
                src: "assets/star.png".into(),
                width: 256.0,
                height: 256.0,
            }),
        );
        star.transform = Transform {
            left: 110.0,
            top: 190.0,
            scale_x: 0.390625,
            scale_y: 0.390625,
            angle: 15.0,
        };
        star.animation = Some(AnimationTag::Spin {
            degrees_per_sec: 45.0,
        });
        scene.add(star);
        scene
    }

    #[test]
    fn capture_restore_preserves_tags() {
        let scene = card();
        let snap = Snapshot::capture(&scene).unwrap();
        assert_eq!(snap.restore().unwrap(), scene);
        assert!(snap.as_json().contains(r#""kind":"spin""#));
        assert!(snap.as_json().contains(r#""degreesPerSec":45.0"#));
    }

    #[test]
    fn object_json_shape() {
        let snap = Snapshot::capture(&card()).unwrap();
        let value: serde_json::Value = serde_json::from_str(snap.as_json()).unwrap();
        let title = &value["objects"][0];
        assert_eq!(title["type"], "i-text");
        assert_eq!(title["fontWeight"], 600);
        assert_eq!(title["fill"], "#000000");
        assert_eq!(title["scaleX"], 1.0);
        assert_eq!(value["objects"][1]["type"], "image");
        assert_eq!(value["background"], "#FFFFFF");
    }

    #[test]
    fn accepts_minimal_foreign_objects() {
        let json = r##"{"objects":[
            {"type":"text","id":"t","left":10,"top":20,"text":"Hi","fontFamily":"Lobster","fontSize":32,"fontWeight":"bold","fill":"rgb(255,0,0)"},
            {"type":"sticker","id":"s","left":0,"top":0,"src":"assets/tree.svg"}
        ]}"##;
        let scene = scene_from_json(json).unwrap();
        assert_eq!(scene.len(), 2);
        let t = scene.objects[0].as_text().unwrap();
        assert_eq!(t.font_weight, FontWeight::Bold);
        assert_eq!(scene.objects[0].fill, Color::rgb(255, 0, 0));
        assert_eq!(scene.objects[0].transform.scale_x, 1.0);
        assert!(matches!(scene.objects[1].kind, ObjectKind::VectorSticker(_)));
    }

    #[test]
    fn rejects_future_versions() {
        let err = scene_from_json(r#"{"version":99,"objects":[]}"#).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(99)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Snapshot::from_json("{not json").restore(),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn export_is_pretty_and_reloadable() {
        let scene = card();
        let exported = export_json(&scene).unwrap();
        assert!(exported.contains('\n'));
        assert_eq!(scene_from_json(&exported).unwrap(), scene);
    }
}
