use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Mime type declared for every image sent to or returned from the editor.
pub const PNG_MIME: &str = "image/png";

/// Raw base64 payload of a data URL: the segment between the first and the
/// second comma. A string with no comma, or an empty segment, is returned
/// unchanged.
pub fn strip_data_url_prefix(image: &str) -> &str {
    image
        .split(',')
        .nth(1)
        .filter(|data| !data.is_empty())
        .unwrap_or(image)
}

pub fn png_data_url(base64_data: &str) -> String {
    format!("data:{PNG_MIME};base64,{base64_data}")
}

pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Splits `data:<mime>;base64,<data>` and decodes the payload.
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let Some(rest) = data_url.strip_prefix("data:") else {
        bail!("not a data URL");
    };
    let Some((header, data)) = rest.split_once(',') else {
        bail!("data URL has no payload separator");
    };
    let Some(mime) = header.strip_suffix(";base64") else {
        bail!("data URL is not base64 encoded ({header})");
    };
    let bytes = BASE64
        .decode(data.trim().as_bytes())
        .context("data URL base64 decode failed")?;
    let mime = if mime.is_empty() { "text/plain" } else { mime };
    Ok((mime.to_string(), bytes))
}

pub fn guess_image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" | "heif" => "image/heic",
        _ => PNG_MIME,
    }
}

/// Reads a local file into a data URL. Size and format are not checked.
pub fn read_file_as_data_url(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    Ok(encode_data_url(&bytes, guess_image_mime(path)))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn strips_prefix_at_first_comma() {
        assert_eq!(strip_data_url_prefix("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url_prefix("data:image/jpeg;base64,/9j/4A"), "/9j/4A");
        assert_eq!(
            strip_data_url_prefix("data:image/png;base64,AAAA,BBBB"),
            "AAAA"
        );
    }

    #[test]
    fn string_without_comma_is_unchanged() {
        assert_eq!(strip_data_url_prefix("AAAA"), "AAAA");
        assert_eq!(strip_data_url_prefix(""), "");
    }

    #[test]
    fn empty_payload_after_comma_keeps_whole_string() {
        assert_eq!(strip_data_url_prefix("data:,"), "data:,");
        assert_eq!(strip_data_url_prefix("data:x,,AAAA"), "data:x,,AAAA");
    }

    #[test]
    fn decode_round_trips_encoded_bytes() -> anyhow::Result<()> {
        let url = encode_data_url(b"\x89PNG", PNG_MIME);
        assert!(url.starts_with("data:image/png;base64,"));
        let (mime, bytes) = decode_data_url(&url)?;
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"\x89PNG");
        Ok(())
    }

    #[test]
    fn decode_rejects_plain_text() {
        assert!(decode_data_url("hello").is_err());
        assert!(decode_data_url("data:image/png,AAAA").is_err());
        assert!(decode_data_url("data:image/png;base64").is_err());
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(guess_image_mime(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(guess_image_mime(Path::new("a.webp")), "image/webp");
        assert_eq!(guess_image_mime(Path::new("a.bmp")), "image/png");
        assert_eq!(guess_image_mime(Path::new("noext")), "image/png");
    }

    #[test]
    fn read_file_as_data_url_encodes_contents() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("photo.jpeg");
        std::fs::write(&path, b"abc")?;
        let url = read_file_as_data_url(&path)?;
        assert_eq!(url, "data:image/jpeg;base64,YWJj");
        assert!(read_file_as_data_url(&temp.path().join("missing.png")).is_err());
        Ok(())
    }
}
