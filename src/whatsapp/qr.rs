//! QR payload handling.
//!
//! The backend hands out QR codes as `data:image/png;base64,…` URLs meant
//! for an `<img src>`. Anything else is kept as plain text.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrPayload {
    Image { mime: String, bytes: Vec<u8> },
    Text(String),
}

impl QrPayload {
    pub fn parse(raw: &str) -> Self {
        match decode_data_url(raw) {
            Some((mime, bytes)) => Self::Image { mime, bytes },
            None => Self::Text(raw.to_string()),
        }
    }

    /// File extension matching the image type, if this is an image.
    pub fn extension(&self) -> Option<&str> {
        match self {
            Self::Image { mime, .. } => mime.strip_prefix("image/").map(|ext| match ext {
                "svg+xml" => "svg",
                "jpeg" => "jpg",
                other => other,
            }),
            Self::Text(_) => None,
        }
    }
}

fn decode_data_url(raw: &str) -> Option<(String, Vec<u8>)> {
    let rest = raw.trim().strip_prefix("data:")?;
    let (meta, data) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(data.trim()).ok()?;
    Some((mime.to_string(), bytes))
}
