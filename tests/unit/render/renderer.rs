use super::*;
use crate::foundation::core::Rgb8;
use crate::render::symbol::ModuleMatrix;

const RED: Rgb8 = Rgb8::new(255, 0, 0);
const BLUE: Rgb8 = Rgb8::new(0, 0, 255);

fn palette() -> Palette {
    Palette {
        foreground: RED,
        background: BLUE,
    }
}

#[test]
fn renders_fixed_resolution_in_sink_order() {
    let r = FrameRenderer::new(&PipelineConfig::default()).unwrap();
    let f = r.render("HELLO WORLD", EcTier::H, palette()).unwrap();
    assert_eq!((f.width, f.height), (154, 154));
    assert_eq!(f.order, PixelOrder::Bgr);
    assert_eq!(f.data.len(), 154 * 154 * 3);
    // Stored as B, G, R.
    assert_eq!(&f.data[0..3], &[255, 0, 0]);
}

#[test]
fn quiet_zone_is_background_and_finder_is_foreground() {
    let r = FrameRenderer::new(&PipelineConfig::default()).unwrap();
    let f = r.render("HELLO", EcTier::Q, palette()).unwrap();
    assert_eq!(f.rgb_at(0, 0), Some(BLUE.to_array()));
    assert_eq!(f.rgb_at(7, 7), Some(BLUE.to_array()));
    // Quiet zone is 4 modules * 2 px, so the finder corner starts at pixel 8.
    assert_eq!(f.rgb_at(8, 8), Some(RED.to_array()));
    assert_eq!(f.rgb_at(9, 9), Some(RED.to_array()));
    assert_eq!(f.rgb_at(153, 153), Some(BLUE.to_array()));
}

#[test]
fn only_palette_colors_appear() {
    let r = FrameRenderer::new(&PipelineConfig::default()).unwrap();
    let f = r.render("Jessica Telephone hits a Single!", EcTier::H, palette()).unwrap();
    for y in 0..f.height {
        for x in 0..f.width {
            let px = f.rgb_at(x, y).unwrap();
            assert!(px == RED.to_array() || px == BLUE.to_array());
        }
    }
}

#[test]
fn render_is_deterministic() {
    let r = FrameRenderer::new(&PipelineConfig::default()).unwrap();
    let a = r.render("Strike, looking. 0-1", EcTier::M, palette()).unwrap();
    let b = r.render("Strike, looking. 0-1", EcTier::M, palette()).unwrap();
    assert_eq!(a.data, b.data);
}

#[test]
fn rgb_order_is_configurable() {
    let mut cfg = PipelineConfig::default();
    cfg.video.pixel_order = PixelOrder::Rgb;
    let r = FrameRenderer::new(&cfg).unwrap();
    let f = r.render("X", EcTier::H, palette()).unwrap();
    assert_eq!(&f.data[0..3], &[0, 0, 255]);
}

#[test]
fn text_too_long_for_tier_is_encoding_error() {
    let r = FrameRenderer::new(&PipelineConfig::default()).unwrap();
    let err = r.render(&"A".repeat(400), EcTier::H, palette()).unwrap_err();
    assert!(matches!(err, QrfeedError::Encoding(_)));
}

const PLAY: &str = "Jessica Telephone hits a ground out to Wyatt Mason. ";

#[test]
fn mixed_case_text_at_every_default_threshold_renders() {
    let cfg = PipelineConfig::default();
    let r = FrameRenderer::new(&cfg).unwrap();
    for entry in cfg.tiers.entries() {
        let text: String = PLAY.chars().cycle().take(entry.max_len).collect();
        assert_eq!(cfg.tiers.select(text.len()).unwrap(), entry.tier);
        let f = r.render(&text, entry.tier, palette()).unwrap_or_else(|e| {
            panic!("{:?} at {} bytes: {e}", entry.tier, entry.max_len)
        });
        assert_eq!((f.width, f.height), (154, 154));
    }
}

#[test]
fn alphanumeric_capacity_table_is_rejected_at_construction() {
    let cfg = PipelineConfig::from_json_str(
        r#"{"tiers": [
            {"max_len": 259, "tier": "H"},
            {"max_len": 352, "tier": "Q"},
            {"max_len": 483, "tier": "M"},
            {"max_len": 619, "tier": "L"}
        ]}"#,
    )
    .unwrap();
    let err = FrameRenderer::new(&cfg).unwrap_err();
    assert!(matches!(err, QrfeedError::Encoding(_)));
    assert!(err.to_string().contains("tier H threshold 259"));
}

#[test]
fn version_too_small_for_tiers_is_rejected_at_construction() {
    let mut cfg = PipelineConfig::default();
    cfg.symbol.version = 10;
    cfg.video.width = (17 + 40 + 8) * 2;
    cfg.video.height = cfg.video.width;
    let err = FrameRenderer::new(&cfg).unwrap_err();
    assert!(err.to_string().contains("does not fit QR version 10"));
}

struct WrongSizeEncoder;

impl SymbolEncoder for WrongSizeEncoder {
    fn encode(&self, _text: &str, _version: u8, _tier: EcTier) -> QrfeedResult<ModuleMatrix> {
        ModuleMatrix::new(21, vec![false; 21 * 21])
    }
}

#[test]
fn encoder_grid_must_match_configured_version() {
    let err = FrameRenderer::with_encoder(&PipelineConfig::default(), Box::new(WrongSizeEncoder))
        .unwrap_err();
    assert!(matches!(err, QrfeedError::Encoding(_)));
}
