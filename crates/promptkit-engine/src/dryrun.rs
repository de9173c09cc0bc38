use std::io::Cursor;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, Rgb, RgbImage};
use sha2::{Digest, Sha256};

use crate::{
    GenerativeBackend, ImageEditRequest, InlineImage, ResponsePart, TextGenerationRequest,
};

const FALLBACK_EDGE: u32 = 256;
const MAX_EDGE: u32 = 1024;

/// Offline backend: deterministic text and solid-colour images derived from
/// the request, no network.
pub struct DryrunBackend;

impl GenerativeBackend for DryrunBackend {
    fn name(&self) -> &str {
        "dryrun"
    }

    fn generate_text(&self, request: &TextGenerationRequest) -> Result<Option<String>> {
        if request.prompt.trim().is_empty() {
            return Ok(None);
        }
        let digest = short_id(&format!("{}\n{}", request.system_instruction, request.prompt));
        Ok(Some(format!(
            "[{} {}] {}",
            request.model,
            digest,
            request.prompt.trim()
        )))
    }

    fn edit_image(&self, request: &ImageEditRequest) -> Result<Vec<ResponsePart>> {
        let (width, height) = source_dims(&request.image_base64);
        let (r, g, b) = color_from_instruction(&request.instruction);
        let mut image = RgbImage::new(width, height);
        for pixel in image.pixels_mut() {
            *pixel = Rgb([r, g, b]);
        }
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .context("dryrun image encode failed")?;
        Ok(vec![
            ResponsePart {
                text: Some(format!("dryrun edit: {}", request.instruction)),
                inline_data: None,
            },
            ResponsePart {
                text: None,
                inline_data: Some(InlineImage {
                    mime_type: Some("image/png".to_string()),
                    data: BASE64.encode(bytes),
                }),
            },
        ])
    }
}

/// Dimensions of the submitted image, capped, or a small square when the
/// payload does not decode.
fn source_dims(image_base64: &str) -> (u32, u32) {
    BASE64
        .decode(image_base64.as_bytes())
        .ok()
        .and_then(|bytes| image::load_from_memory(&bytes).ok())
        .map(|decoded| {
            (
                decoded.width().clamp(1, MAX_EDGE),
                decoded.height().clamp(1, MAX_EDGE),
            )
        })
        .unwrap_or((FALLBACK_EDGE, FALLBACK_EDGE))
}

fn color_from_instruction(instruction: &str) -> (u8, u8, u8) {
    let mut hasher = Sha256::new();
    hasher.update(instruction.as_bytes());
    let digest = hasher.finalize();
    (digest[0], digest[1], digest[2])
}

fn short_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..4])
}
