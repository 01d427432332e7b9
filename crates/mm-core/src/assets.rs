//! Sticker asset listing.
//!
//! The picker is populated from a repository directory listing: a JSON
//! array of entries with at least a `name` field. Only image files are kept.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Directory (relative to the site root) that stickers are served from.
pub const ASSET_DIR: &str = "assets";

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "svg", "webp"];

#[derive(Debug, Deserialize)]
struct ListingEntry {
    name: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Parse a directory listing and keep image file names, in listing order.
pub fn parse_listing(json: &str) -> Result<Vec<String>> {
    let entries: Vec<ListingEntry> =
        serde_json::from_str(json).map_err(|e| Error::Listing(e.to_string()))?;
    Ok(entries
        .into_iter()
        .filter(|e| e.kind.as_deref().is_none_or(|k| k == "file"))
        .filter(|e| is_image(&e.name))
        .map(|e| e.name)
        .collect())
}

/// Case-insensitive extension check against the supported image types.
/// Dotfiles such as `.png` count; only the suffix matters.
pub fn is_image(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

pub fn is_vector(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("svg"))
}

/// Case-insensitive substring filter used by the picker's search box. The
/// query is taken as typed, spaces included.
pub fn filter_assets<'a>(names: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.to_lowercase();
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&query))
        .map(String::as_str)
        .collect()
}

/// Path a sticker is loaded from: `assets/<name>`.
pub fn asset_path(name: &str) -> String {
    format!("{ASSET_DIR}/{name}")
}
