use thiserror::Error;

/// Errors from encoding or decoding card payloads.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not encode share payload: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("could not decode share payload: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("share payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("share payload compression failed: {0}")]
    Compression(#[from] std::io::Error),
    #[error("unknown share payload format `{0}`")]
    UnknownFormat(char),
    #[error("share payload is compressed but this build has no zstd support")]
    CompressionUnavailable,
    #[error("invalid share link base: {0}")]
    Url(#[from] url::ParseError),
    #[error("empty share payload")]
    EmptyPayload,
    #[error("unsupported scene version {0}")]
    UnsupportedVersion(u32),
    #[error("asset listing is malformed: {0}")]
    Listing(String),
}

pub type Result<T> = std::result::Result<T, Error>;
