use crate::config::{PipelineConfig, SymbolConfig};
use crate::foundation::error::{QrfeedError, QrfeedResult};
use crate::palette::Palette;
use crate::render::frame::{Frame, PixelOrder};
use crate::render::symbol::{QrEncoder, SymbolEncoder};
use crate::tier::{EcTier, TierTable};

/// Renders one event's text into a fixed-size square frame.
pub struct FrameRenderer {
    symbol: SymbolConfig,
    frame_px: u32,
    order: PixelOrder,
    encoder: Box<dyn SymbolEncoder>,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("symbol", &self.symbol)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

impl FrameRenderer {
    /// Renderer using the built-in QR encoder.
    pub fn new(cfg: &PipelineConfig) -> QrfeedResult<Self> {
        Self::with_encoder(cfg, Box::new(QrEncoder))
    }

    /// Renderer with a custom encoder. Validates `cfg` and checks that worst-case (byte-mode) text
    /// at every tier's threshold fits the configured version.
    pub fn with_encoder(
        cfg: &PipelineConfig,
        encoder: Box<dyn SymbolEncoder>,
    ) -> QrfeedResult<Self> {
        cfg.validate()?;
        let renderer = Self {
            frame_px: cfg.symbol.frame_px()?,
            symbol: cfg.symbol.clone(),
            order: cfg.video.pixel_order,
            encoder,
        };
        renderer.check_tier_capacity(&cfg.tiers)?;
        Ok(renderer)
    }

    fn check_tier_capacity(&self, tiers: &TierTable) -> QrfeedResult<()> {
        for entry in tiers.entries() {
            // Lowercase letters have no denser mode than byte mode.
            let worst_case = "a".repeat(entry.max_len);
            self.encode_checked(&worst_case, entry.tier).map_err(|e| {
                QrfeedError::encoding(format!(
                    "tier {:?} threshold {} does not fit QR version {}: {e}",
                    entry.tier, entry.max_len, self.symbol.version
                ))
            })?;
        }
        Ok(())
    }

    fn encode_checked(
        &self,
        text: &str,
        tier: EcTier,
    ) -> QrfeedResult<crate::render::symbol::ModuleMatrix> {
        let matrix = self.encoder.encode(text, self.symbol.version, tier)?;
        let grid = self.symbol.grid_modules() as usize;
        if matrix.width() != grid {
            return Err(QrfeedError::encoding(format!(
                "encoder produced a {0}x{0} symbol, expected {grid}x{grid}",
                matrix.width()
            )));
        }
        Ok(matrix)
    }

    /// Pixel edge length of every frame this renderer produces.
    pub fn frame_px(&self) -> u32 {
        self.frame_px
    }

    /// Render `text` at `tier`: dark modules in the foreground color, light modules and the
    /// quiet zone in the background color.
    pub fn render(&self, text: &str, tier: EcTier, palette: Palette) -> QrfeedResult<Frame> {
        let matrix = self.encode_checked(text, tier)?;

        let px = self.symbol.module_px;
        let quiet = self.symbol.quiet_zone;
        let side = self.frame_px();
        let fg = image::Rgb(palette.foreground.to_array());
        let bg = image::Rgb(palette.background.to_array());
        let mut img = image::RgbImage::from_pixel(side, side, bg);

        for (mx, my) in matrix.dark_modules() {
            let x0 = (mx as u32 + quiet) * px;
            let y0 = (my as u32 + quiet) * px;
            for y in y0..y0 + px {
                for x in x0..x0 + px {
                    img.put_pixel(x, y, fg);
                }
            }
        }

        Ok(Frame::from_rgb_image(img, self.order))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
