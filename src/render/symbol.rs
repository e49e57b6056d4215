use crate::foundation::error::{QrfeedError, QrfeedResult};
use crate::tier::EcTier;

/// Square grid of dark/light modules, row-major, without quiet zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl ModuleMatrix {
    pub fn new(width: usize, dark: Vec<bool>) -> QrfeedResult<Self> {
        if dark.len() != width * width {
            return Err(QrfeedError::encoding(format!(
                "module matrix of width {width} needs {} modules, got {}",
                width * width,
                dark.len()
            )));
        }
        Ok(Self { width, dark })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.dark[y * self.width + x]
    }

    /// `(x, y)` of every dark module.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.dark
            .iter()
            .enumerate()
            .filter(|(_, d)| **d)
            .map(|(i, _)| (i % self.width, i / self.width))
    }
}

/// Black-box symbol encoder: text + tier at a fixed version -> module matrix.
pub trait SymbolEncoder: Send + Sync {
    /// Encode `text` at exactly `version`, failing if it does not fit.
    fn encode(&self, text: &str, version: u8, tier: EcTier) -> QrfeedResult<ModuleMatrix>;
}

/// QR Model 2 encoder backed by the `qrcode` crate.
///
/// Segment modes are chosen by the encoder. If the optimized segmentation does not fit, the text
/// is retried as a single byte-mode segment, so anything within the byte capacity of the version
/// and tier always encodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct QrEncoder;

impl SymbolEncoder for QrEncoder {
    fn encode(&self, text: &str, version: u8, tier: EcTier) -> QrfeedResult<ModuleMatrix> {
        let ec = match tier {
            EcTier::L => qrcode::EcLevel::L,
            EcTier::M => qrcode::EcLevel::M,
            EcTier::Q => qrcode::EcLevel::Q,
            EcTier::H => qrcode::EcLevel::H,
        };
        let qr_version = qrcode::Version::Normal(version.into());
        let code = qrcode::QrCode::with_version(text.as_bytes(), qr_version, ec)
            .or_else(|_| {
                let mut bits = qrcode::bits::Bits::new(qr_version);
                bits.push_byte_data(text.as_bytes())?;
                bits.push_terminator(ec)?;
                qrcode::QrCode::with_bits(bits, ec)
            })
            .map_err(|e| {
                QrfeedError::encoding(format!(
                    "{} bytes do not fit QR version {version} at tier {tier:?}: {e}",
                    text.len()
                ))
            })?;

        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        ModuleMatrix::new(code.width(), dark)
    }
}
