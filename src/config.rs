//! Immutable configuration shared by tier selection, rendering, and encoding.
//!
//! One object carries the symbol geometry and the tier table together so the renderer's grid
//! can be checked against the largest configured threshold before any event is processed.

use std::path::Path;

use crate::foundation::core::Fps;
use crate::foundation::error::{QrfeedError, QrfeedResult};
use crate::palette::SideSlot;
use crate::render::frame::PixelOrder;
use crate::tier::TierTable;

/// Full pipeline configuration. `Default` reproduces the reference output (154x154 @ 30 fps).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub symbol: SymbolConfig,
    pub tiers: TierTable,
    pub video: VideoConfig,
    pub palette: PaletteConfig,
}

/// Fixed QR symbol geometry.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    /// QR version (1..=40); the module grid is `17 + 4 * version` wide.
    pub version: u8,
    /// Pixel edge length of one module.
    pub module_px: u32,
    /// Light border around the symbol, in modules.
    pub quiet_zone: u32,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            version: 13,
            module_px: 2,
            quiet_zone: 4,
        }
    }
}

impl SymbolConfig {
    /// Modules per side of the symbol, excluding the quiet zone.
    pub fn grid_modules(&self) -> u32 {
        17 + 4 * u32::from(self.version)
    }

    /// Pixel edge length of the rendered frame.
    pub fn frame_px(&self) -> QrfeedResult<u32> {
        self.quiet_zone
            .checked_mul(2)
            .and_then(|q| q.checked_add(self.grid_modules()))
            .and_then(|modules| modules.checked_mul(self.module_px))
            .ok_or_else(|| {
                QrfeedError::validation(format!(
                    "frame size overflows u32 (version {}, {} px/module, quiet zone {})",
                    self.version, self.module_px, self.quiet_zone
                ))
            })
    }
}

/// Output stream parameters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub fps: Fps,
    pub width: u32,
    pub height: u32,
    /// Channel order the sink consumes.
    pub pixel_order: PixelOrder,
    pub codec: CodecConfig,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
            width: 154,
            height: 154,
            pixel_order: PixelOrder::Bgr,
            codec: CodecConfig::default(),
        }
    }
}

/// Encoder/container selection for the ffmpeg sink.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// ffmpeg muxer name (`-f`).
    pub container: String,
    /// ffmpeg encoder name (`-c:v`).
    pub encoder: String,
    /// Optional fourcc tag (`-tag:v`).
    pub fourcc: Option<String>,
    /// Output pixel format (`-pix_fmt`).
    pub pix_fmt: String,
    /// Single-threaded bit-exact encoding so identical input yields an identical file.
    pub bitexact: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            container: "avi".to_owned(),
            encoder: "mpeg4".to_owned(),
            fourcc: Some("XVID".to_owned()),
            pix_fmt: "yuv420p".to_owned(),
            bitexact: true,
        }
    }
}

/// Active/inactive side handling.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Event type that swaps the active and inactive sides.
    pub transition_event_type: i64,
    /// Side active before the first transition event.
    pub initial_active: SideSlot,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            transition_event_type: 2,
            initial_active: SideSlot::B,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(s: &str) -> QrfeedResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| QrfeedError::serde(format!("invalid pipeline config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> QrfeedResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            QrfeedError::Other(anyhow::anyhow!(
                "failed to read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&s)
    }

    /// Check internal consistency. Symbol capacity is checked separately by the renderer.
    pub fn validate(&self) -> QrfeedResult<()> {
        let sym = &self.symbol;
        if !(1..=40).contains(&sym.version) {
            return Err(QrfeedError::validation(format!(
                "QR version must be in 1..=40, got {}",
                sym.version
            )));
        }
        if sym.module_px == 0 {
            return Err(QrfeedError::validation("module_px must be non-zero"));
        }

        self.tiers.validate()?;

        let v = &self.video;
        if v.fps.num == 0 || v.fps.den == 0 {
            return Err(QrfeedError::validation("fps must be non-zero"));
        }
        if v.width == 0 || v.height == 0 {
            return Err(QrfeedError::validation(
                "video width/height must be non-zero",
            ));
        }
        if !v.width.is_multiple_of(2) || !v.height.is_multiple_of(2) {
            return Err(QrfeedError::validation(
                "video width/height must be even (required for yuv420p output)",
            ));
        }
        let px = sym.frame_px()?;
        if v.width != px || v.height != px {
            return Err(QrfeedError::validation(format!(
                "video resolution {}x{} does not match rendered frame {px}x{px} \
                 (version {}, {} px/module, quiet zone {})",
                v.width, v.height, sym.version, sym.module_px, sym.quiet_zone
            )));
        }
        if v.codec.container.is_empty() || v.codec.encoder.is_empty() || v.codec.pix_fmt.is_empty()
        {
            return Err(QrfeedError::validation(
                "codec container/encoder/pix_fmt must be non-empty",
            ));
        }
        Ok(())
    }
}
