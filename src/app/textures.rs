use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use eframe::egui;
use std::collections::HashMap;
use tracing::warn;

/// Sticker backgrounds decoded into GPU textures, keyed by href. Failed
/// decodes are remembered so they are not retried every frame.
#[derive(Default)]
pub(super) struct TextureCache {
    textures: HashMap<String, Option<egui::TextureHandle>>,
}

impl TextureCache {
    pub fn get(&mut self, ctx: &egui::Context, href: &str) -> Option<egui::TextureId> {
        if !self.textures.contains_key(href) {
            let loaded = match decode(href) {
                Ok(image) => Some(ctx.load_texture(
                    format!("sticker-{}", self.textures.len()),
                    image,
                    egui::TextureOptions::LINEAR,
                )),
                Err(e) => {
                    warn!(error = %e, "could not load sticker image");
                    None
                }
            };
            self.textures.insert(href.to_string(), loaded);
        }
        self.textures.get(href)?.as_ref().map(|t| t.id())
    }
}

fn decode(href: &str) -> Result<egui::ColorImage, String> {
    let bytes = match href.strip_prefix("data:") {
        Some(rest) => {
            let (meta, payload) = rest.split_once(',').ok_or("malformed data url")?;
            if !meta.ends_with(";base64") {
                return Err(format!("unsupported data url encoding {meta:?}"));
            }
            BASE64_STANDARD
                .decode(payload.trim())
                .map_err(|e| format!("invalid base64 payload: {e}"))?
        }
        None => std::fs::read(href).map_err(|e| format!("{href}: {e}"))?,
    };
    let image = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
