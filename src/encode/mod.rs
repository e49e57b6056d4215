//! Video sinks.
//!
//! Sinks consume rendered frames in event order and are driven by `Pipeline::run`.

/// `ffmpeg`-based sink (system `ffmpeg` binary).
pub mod ffmpeg;
/// `VideoSink` trait and the in-memory sink.
pub mod sink;
