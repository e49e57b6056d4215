//! Per-event frame rendering.

/// Rendered frames and channel-order conversion.
pub mod frame;
/// `SymbolEncoder` trait and the QR implementation.
pub mod symbol;

mod renderer;

pub use renderer::FrameRenderer;
