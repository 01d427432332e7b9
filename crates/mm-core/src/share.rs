//! Share payloads.
//!
//! A card is shared one of two ways:
//!
//! - **Document**: the scene is stored remotely as
//!   `{ "data": <scene>, "createdAt": <ms> }` and the link carries the
//!   document id in the `id` query parameter.
//! - **Inline link**: the scene itself rides in the `d` query parameter as
//!   `tag + base64url(payload)`, where the payload is MessagePack, zstd
//!   compressed when the build has zstd. Tag `z` = compressed, `m` = plain.

use crate::error::{Error, Result};
use crate::model::Scene;
use crate::snapshot::check_version;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

/// Query parameter carrying a remote document id.
pub const ID_PARAM: &str = "id";
/// Query parameter carrying an inline encoded scene.
pub const DATA_PARAM: &str = "d";

const TAG_ZSTD: char = 'z';
const TAG_PLAIN: char = 'm';

#[cfg(feature = "zstd")]
const ZSTD_LEVEL: i32 = 19;

/// Body of a shared design document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDesign {
    pub data: Scene,
    /// Milliseconds since the Unix epoch.
    pub created_at: f64,
}

impl SharedDesign {
    pub fn new(data: Scene, created_at: f64) -> Self {
        Self { data, created_at }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SharedDesign = serde_json::from_str(json)?;
        check_version(&doc.data)?;
        Ok(doc)
    }
}

/// What a viewer URL points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareTarget {
    Document(String),
    Inline(String),
}

/// Build the link for a stored document: `origin + path + "?id=" + id`.
pub fn document_url(origin: &str, path: &str, id: &str) -> Result<String> {
    viewer_url(origin, path, ID_PARAM, id)
}

/// Build the link for an inline-encoded scene.
pub fn inline_url(origin: &str, path: &str, scene: &Scene) -> Result<String> {
    viewer_url(origin, path, DATA_PARAM, &encode_scene(scene)?)
}

fn viewer_url(origin: &str, path: &str, key: &str, value: &str) -> Result<String> {
    let mut url = Url::parse(&format!("{origin}{path}"))?;
    url.query_pairs_mut().clear().append_pair(key, value);
    Ok(url.into())
}

/// Find the share target in a URL query string (with or without the `?`).
/// An `id` parameter wins over `d` when both are present.
pub fn parse_query(query: &str) -> Option<ShareTarget> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut inline = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            ID_PARAM => return Some(ShareTarget::Document(value.into_owned())),
            DATA_PARAM if inline.is_none() => inline = Some(value.into_owned()),
            _ => {}
        }
    }
    inline.map(ShareTarget::Inline)
}

/// Encode a scene for the `d` query parameter.
pub fn encode_scene(scene: &Scene) -> Result<String> {
    let packed = rmp_serde::to_vec_named(scene)?;
    let (tag, body) = compress(packed)?;
    let mut out = String::with_capacity(1 + body.len() * 4 / 3 + 4);
    out.push(tag);
    URL_SAFE_NO_PAD.encode_string(body, &mut out);
    Ok(out)
}

/// Decode the `d` query parameter back into a scene.
pub fn decode_scene(payload: &str) -> Result<Scene> {
    let mut chars = payload.chars();
    let tag = chars.next().ok_or(Error::EmptyPayload)?;
    let body = URL_SAFE_NO_PAD.decode(chars.as_str())?;
    let packed = match tag {
        TAG_PLAIN => body,
        TAG_ZSTD => decompress(&body)?,
        other => return Err(Error::UnknownFormat(other)),
    };
    let scene: Scene = rmp_serde::from_slice(&packed)?;
    check_version(&scene)?;
    Ok(scene)
}

#[cfg(feature = "zstd")]
fn compress(packed: Vec<u8>) -> Result<(char, Vec<u8>)> {
    let compressed = zstd::encode_all(packed.as_slice(), ZSTD_LEVEL)?;
    // Tiny scenes can grow under compression.
    if compressed.len() < packed.len() {
        Ok((TAG_ZSTD, compressed))
    } else {
        Ok((TAG_PLAIN, packed))
    }
}

#[cfg(not(feature = "zstd"))]
fn compress(packed: Vec<u8>) -> Result<(char, Vec<u8>)> {
    Ok((TAG_PLAIN, packed))
}

#[cfg(feature = "zstd")]
fn decompress(body: &[u8]) -> Result<Vec<u8>> {
    Ok(zstd::decode_all(body)?)
}

#[cfg(not(feature = "zstd"))]
fn decompress(_body: &[u8]) -> Result<Vec<u8>> {
    Err(Error::CompressionUnavailable)
}
