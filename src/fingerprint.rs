use xxhash_rust::xxh3::Xxh3;

use crate::render::frame::Frame;

const XXH3_SEED: u64 = 0x5172_6665_6564_0001;

/// Stable 128-bit fingerprint of a frame stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StreamFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl std::fmt::Display for StreamFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Order-sensitive hasher over frames as they are written.
pub(crate) struct StreamHasher {
    inner: Xxh3,
}

impl StreamHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_frame(&mut self, frame: &Frame) {
        self.inner.update(&frame.width.to_le_bytes());
        self.inner.update(&frame.height.to_le_bytes());
        self.inner.update(&frame.data);
    }

    pub(crate) fn finish(&self) -> StreamFingerprint {
        let v = self.inner.digest128();
        StreamFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}
