use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::imageops::FilterType;
use resvg::tiny_skia;

use crate::{
    assets::logo::LogoKind,
    assets::store::PreparedAssets,
    compose::template::{BackgroundLayer, Layer, LogoLayer, Template},
    foundation::error::{PanelError, PanelResult},
    model::format::OutputFormat,
    render::backend::{EncodedImage, OutputEncoding, Rasterizer, RasterizerFactory},
    render::svg::layer_svg,
};

/// Supersampling factor used while drawing; output is downsampled to the exact format size.
pub const DEVICE_PIXEL_RATIO: u32 = 2;

/// Largest device-pixel canvas side the rasterizer will allocate.
pub const MAX_DEVICE_DIM: u32 = 16_384;

/// CPU rasterizer: raster layers through `image`, vector layers through `usvg`/`resvg`.
pub struct SvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    encoding: OutputEncoding,
}

impl SvgRasterizer {
    /// Rasterizer over an existing font database.
    pub fn new(fontdb: Arc<usvg::fontdb::Database>, encoding: OutputEncoding) -> Self {
        Self { fontdb, encoding }
    }

    /// Rasterizer over system fonts plus every font file in `font_dirs`.
    pub fn with_fonts(font_dirs: &[PathBuf], encoding: OutputEncoding) -> Self {
        Self::new(build_fontdb(font_dirs), encoding)
    }

    fn svg_options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: self.fontdb.clone(),
            font_resolver: make_font_resolver(),
            ..Default::default()
        }
    }

    fn draw_background(
        &self,
        pixmap: &mut tiny_skia::Pixmap,
        layer: &BackgroundLayer,
        assets: &PreparedAssets,
    ) -> PanelResult<()> {
        let c = layer.color;
        pixmap.fill(tiny_skia::Color::from_rgba8(c.r, c.g, c.b, 255));
        let Some(cover) = &layer.image else {
            return Ok(());
        };

        let src = assets.background(&cover.image.id)?;
        let (sw, sh) = (src.width, src.height);
        let x = (cover.crop.x0.round().max(0.0) as u32).min(sw.saturating_sub(1));
        let y = (cover.crop.y0.round().max(0.0) as u32).min(sh.saturating_sub(1));
        let cw = (cover.crop.width().round().max(1.0) as u32).min(sw - x);
        let ch = (cover.crop.height().round().max(1.0) as u32).min(sh - y);

        let cropped = image::imageops::crop_imm(src.pixels.as_ref(), x, y, cw, ch).to_image();
        let scaled =
            image::imageops::resize(&cropped, pixmap.width(), pixmap.height(), FilterType::Lanczos3);
        for (dst, src) in pixmap
            .data_mut()
            .chunks_exact_mut(4)
            .zip(scaled.as_raw().chunks_exact(3))
        {
            dst[..3].copy_from_slice(src);
            dst[3] = 255;
        }
        Ok(())
    }

    fn draw_logo(
        &self,
        pixmap: &mut tiny_skia::Pixmap,
        layer: &LogoLayer,
        assets: &PreparedAssets,
    ) -> PanelResult<()> {
        let logo = assets.logo(&layer.logo.id)?;
        let dpr = DEVICE_PIXEL_RATIO as f64;
        let w = (layer.rect.width() * dpr).round().max(1.0) as u32;
        let h = (layer.rect.height() * dpr).round().max(1.0) as u32;
        let x = (layer.rect.x0 * dpr).round() as i32;
        let y = (layer.rect.y0 * dpr).round() as i32;

        match &logo.kind {
            LogoKind::Raster(rgba) => {
                let scaled = image::imageops::resize(rgba.as_ref(), w, h, FilterType::Lanczos3);
                let mut data = scaled.into_raw();
                premultiply_rgba8_in_place(&mut data);
                let size = tiny_skia::IntSize::from_wh(w, h)
                    .ok_or_else(|| PanelError::render("logo has zero size"))?;
                let logo_pm = tiny_skia::Pixmap::from_vec(data, size)
                    .ok_or_else(|| PanelError::render("logo pixel buffer size mismatch"))?;
                pixmap.draw_pixmap(
                    x,
                    y,
                    logo_pm.as_ref(),
                    &tiny_skia::PixmapPaint::default(),
                    tiny_skia::Transform::identity(),
                    None,
                );
            }
            LogoKind::Svg(tree) => {
                let size = tree.size();
                let sx = w as f32 / size.width();
                let sy = h as f32 / size.height();
                let xform = tiny_skia::Transform::from_row(sx, 0.0, 0.0, sy, x as f32, y as f32);
                resvg::render(tree, xform, &mut pixmap.as_mut());
            }
        }
        Ok(())
    }

    fn draw_vector(
        &self,
        pixmap: &mut tiny_skia::Pixmap,
        svg: &str,
        opts: &usvg::Options<'_>,
    ) -> PanelResult<()> {
        let tree = usvg::Tree::from_str(svg, opts)
            .map_err(|e| PanelError::render(format!("layer svg parse failed: {e}")))?;
        let dpr = DEVICE_PIXEL_RATIO as f32;
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(dpr, dpr),
            &mut pixmap.as_mut(),
        );
        Ok(())
    }
}

impl Rasterizer for SvgRasterizer {
    fn name(&self) -> &'static str {
        "svg"
    }

    #[tracing::instrument(level = "debug", skip_all, fields(format = %format.id))]
    fn render(
        &self,
        template: &Template,
        format: &OutputFormat,
        assets: &PreparedAssets,
    ) -> PanelResult<EncodedImage> {
        if (template.width, template.height) != (format.width, format.height) {
            return Err(PanelError::render(format!(
                "template is {}x{} but format '{}' is {}x{}",
                template.width, template.height, format.id, format.width, format.height
            )));
        }

        let dw = format.width.saturating_mul(DEVICE_PIXEL_RATIO);
        let dh = format.height.saturating_mul(DEVICE_PIXEL_RATIO);
        if dw > MAX_DEVICE_DIM || dh > MAX_DEVICE_DIM {
            return Err(PanelError::resource_exhaustion(format!(
                "canvas {dw}x{dh} exceeds {MAX_DEVICE_DIM}x{MAX_DEVICE_DIM}"
            )));
        }
        let mut pixmap = tiny_skia::Pixmap::new(dw, dh).ok_or_else(|| {
            PanelError::resource_exhaustion(format!("failed to allocate {dw}x{dh} canvas"))
        })?;

        let opts = self.svg_options();
        for layer in &template.layers {
            match layer {
                Layer::Background(bg) => self.draw_background(&mut pixmap, bg, assets)?,
                Layer::Logo(logo) => self.draw_logo(&mut pixmap, logo, assets)?,
                other => {
                    if let Some(svg) = layer_svg(other, template.width, template.height) {
                        self.draw_vector(&mut pixmap, &svg, &opts)?;
                    }
                }
            }
        }

        let rgb = opaque_rgb(&pixmap)?;
        let device = image::RgbImage::from_raw(dw, dh, rgb)
            .ok_or_else(|| PanelError::render("device buffer size mismatch"))?;
        let out = if DEVICE_PIXEL_RATIO == 1 {
            device
        } else {
            image::imageops::resize(&device, format.width, format.height, FilterType::Lanczos3)
        };
        EncodedImage::encode(&out, self.encoding)
    }
}

/// Builds an [`SvgRasterizer`] with a freshly loaded font database on every call.
#[derive(Clone, Debug, Default)]
pub struct SvgRasterizerFactory {
    /// Extra directories scanned for `ttf`/`otf`/`ttc` files.
    pub font_dirs: Vec<PathBuf>,
    /// Output encoding of created rasterizers.
    pub encoding: OutputEncoding,
}

impl SvgRasterizerFactory {
    /// Factory with explicit font directories and encoding.
    pub fn new(font_dirs: Vec<PathBuf>, encoding: OutputEncoding) -> Self {
        Self {
            font_dirs,
            encoding,
        }
    }
}

impl RasterizerFactory for SvgRasterizerFactory {
    fn create(&self) -> PanelResult<Arc<dyn Rasterizer>> {
        tracing::debug!(font_dirs = self.font_dirs.len(), "building rasterizer");
        Ok(Arc::new(SvgRasterizer::with_fonts(
            &self.font_dirs,
            self.encoding,
        )))
    }
}

/// Strip alpha from a fully opaque premultiplied pixmap.
fn opaque_rgb(pixmap: &tiny_skia::Pixmap) -> PanelResult<Vec<u8>> {
    let len = pixmap.width() as usize * pixmap.height() as usize * 3;
    let mut rgb = Vec::new();
    rgb.try_reserve_exact(len).map_err(|e| {
        PanelError::resource_exhaustion(format!("failed to allocate output buffer: {e}"))
    })?;
    for px in pixmap.data().chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    Ok(rgb)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// System fonts plus every font file found in `dirs` (and their `fonts/` subdirectories).
pub fn build_fontdb(dirs: &[PathBuf]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    for dir in dirs {
        load_fonts_from_dir(&mut db, dir);
        load_fonts_from_dir(&mut db, &dir.join("fonts"));
    }
    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };
            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
