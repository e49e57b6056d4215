use std::fmt;

pub type QrfeedResult<T> = Result<T, QrfeedError>;

/// Frame dimensions carried by [`QrfeedError::FrameSizeMismatch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum QrfeedError {
    #[error("capacity exceeded: text of {len} bytes does not fit any tier (max {max})")]
    CapacityExceeded { len: usize, max: usize },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("frame size mismatch: got {got}, expected {expected}")]
    FrameSizeMismatch {
        got: FrameSize,
        expected: FrameSize,
    },

    #[error("sink i/o error: {context}: {source}")]
    SinkIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("event {index} ({preview:?}): {source}")]
    AtEvent {
        index: usize,
        preview: String,
        #[source]
        source: Box<QrfeedError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QrfeedError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn sink_io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::SinkIo {
            context: context.into(),
            source,
        }
    }

    pub fn frame_size_mismatch(got: (u32, u32), expected: (u32, u32)) -> Self {
        Self::FrameSizeMismatch {
            got: FrameSize {
                width: got.0,
                height: got.1,
            },
            expected: FrameSize {
                width: expected.0,
                height: expected.1,
            },
        }
    }

    /// Attach the position and a short preview of the event that caused `self`.
    pub fn at_event(self, index: usize, description: &str) -> Self {
        const PREVIEW_CHARS: usize = 48;
        let mut preview: String = description.chars().take(PREVIEW_CHARS).collect();
        if description.chars().nth(PREVIEW_CHARS).is_some() {
            preview.push('…');
        }
        Self::AtEvent {
            index,
            preview,
            source: Box::new(self),
        }
    }

    /// The stage error underneath any event context.
    pub fn root(&self) -> &QrfeedError {
        match self {
            Self::AtEvent { source, .. } => source.root(),
            other => other,
        }
    }
}
