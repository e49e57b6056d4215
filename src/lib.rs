//! qrfeed turns a game's event feed into a video with one QR-code frame per event.
//!
//! - Load an [`EventFeed`] and the two [`Side`]s
//! - Build a [`Pipeline`] from a validated [`PipelineConfig`]
//! - Run it into a [`VideoSink`] ([`FfmpegSink`] for files, [`InMemorySink`] for tests)
#![forbid(unsafe_code)]

mod fingerprint;
mod foundation;

/// Immutable pipeline configuration.
pub mod config;
/// Video sinks.
pub mod encode;
/// Game feed and side metadata input.
pub mod event;
/// Active/inactive side tracking.
pub mod palette;
/// Pipeline driver.
pub mod pipeline;
/// Frame rendering.
pub mod render;
/// Error-correction tier selection.
pub mod tier;

pub use crate::foundation::core::{Fps, FrameIndex, Rgb8};
pub use crate::foundation::error::{FrameSize, QrfeedError, QrfeedResult};

pub use crate::config::{CodecConfig, PaletteConfig, PipelineConfig, SymbolConfig, VideoConfig};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{InMemorySink, SinkConfig, VideoSink};
pub use crate::event::{EventFeed, GameEvent, SidePair};
pub use crate::fingerprint::StreamFingerprint;
pub use crate::palette::{Palette, PaletteTracker, Side, SideSlot};
pub use crate::pipeline::{Pipeline, RunStats};
pub use crate::render::FrameRenderer;
pub use crate::render::frame::{Frame, PixelOrder};
pub use crate::render::symbol::{ModuleMatrix, QrEncoder, SymbolEncoder};
pub use crate::tier::{EcTier, TierTable, TierThreshold, text_len};
