use anyhow::Result;

use lantern::gfx::texture::PixelData;
use lantern::LanternApp;

const DIFFUSE_MAP_PATH: &str = "assets/container_diffuse.png";
const SPECULAR_MAP_PATH: &str = "assets/container_specular.png";

fn main() -> Result<()> {
    env_logger::init();

    // Image decoding stays out here at the binary boundary; the renderer
    // only ever sees decoded pixels.
    let diffuse = load_pixels(DIFFUSE_MAP_PATH);
    let specular = load_pixels(SPECULAR_MAP_PATH);

    LanternApp::new(diffuse, specular)?.run()
}

/// Decodes an image into rgba8 pixels. A failure is logged and the
/// checkerboard fallback keeps the scene textured.
fn load_pixels(path: &str) -> PixelData {
    match image::open(path) {
        Ok(decoded) => {
            let channels = decoded.color().channel_count();
            let rgba = decoded.into_rgba8();
            let (width, height) = rgba.dimensions();
            PixelData::new(rgba.into_raw(), width, height, channels)
        }
        Err(err) => {
            log::warn!("failed to load texture {path}: {err}; using fallback pattern");
            PixelData::fallback()
        }
    }
}
