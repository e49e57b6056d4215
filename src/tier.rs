//! Error-correction tier selection.
//!
//! A [`TierTable`] binds four capacity thresholds to the four QR error-correction levels at a
//! fixed symbol version. Selection picks the first threshold (ascending) that still holds the
//! text, which is the strongest correction that fits and so the densest-looking symbol.
//!
//! Lengths are UTF-8 bytes and thresholds are byte-mode capacities, the worst case for any text
//! of that length, so a selected tier always has room for the text it was selected for.

use crate::foundation::error::{QrfeedError, QrfeedResult};

/// QR error-correction level, weakest (`L`) to strongest (`H`).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum EcTier {
    /// ~7% of codewords recoverable.
    L,
    /// ~15% of codewords recoverable.
    M,
    /// ~25% of codewords recoverable.
    Q,
    /// ~30% of codewords recoverable.
    H,
}

impl EcTier {
    /// All tiers, weakest first.
    pub const ALL: [EcTier; 4] = [EcTier::L, EcTier::M, EcTier::Q, EcTier::H];

    pub(crate) fn slot(self) -> usize {
        match self {
            EcTier::L => 0,
            EcTier::M => 1,
            EcTier::Q => 2,
            EcTier::H => 3,
        }
    }
}

/// Maximum text length (UTF-8 bytes) a tier can hold at the configured symbol version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TierThreshold {
    pub max_len: usize,
    pub tier: EcTier,
}

/// Ascending capacity thresholds, one per tier.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct TierTable {
    entries: Vec<TierThreshold>,
}

impl Default for TierTable {
    /// Byte-mode capacities for QR version 13.
    fn default() -> Self {
        Self {
            entries: vec![
                TierThreshold {
                    max_len: 177,
                    tier: EcTier::H,
                },
                TierThreshold {
                    max_len: 241,
                    tier: EcTier::Q,
                },
                TierThreshold {
                    max_len: 331,
                    tier: EcTier::M,
                },
                TierThreshold {
                    max_len: 428,
                    tier: EcTier::L,
                },
            ],
        }
    }
}

impl TierTable {
    /// Build a validated table. Entries may be given in any order.
    pub fn new(entries: impl IntoIterator<Item = TierThreshold>) -> QrfeedResult<Self> {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by_key(|e| e.max_len);
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Require exactly one threshold per tier, strictly ascending.
    pub fn validate(&self) -> QrfeedResult<()> {
        if self.entries.len() != EcTier::ALL.len() {
            return Err(QrfeedError::validation(format!(
                "tier table must have exactly {} entries, got {}",
                EcTier::ALL.len(),
                self.entries.len()
            )));
        }

        let mut seen = [false; 4];
        for e in &self.entries {
            if std::mem::replace(&mut seen[e.tier.slot()], true) {
                return Err(QrfeedError::validation(format!(
                    "tier {:?} appears more than once in the tier table",
                    e.tier
                )));
            }
        }

        for pair in self.entries.windows(2) {
            if pair[0].max_len >= pair[1].max_len {
                return Err(QrfeedError::validation(format!(
                    "tier thresholds must be strictly ascending ({} then {})",
                    pair[0].max_len, pair[1].max_len
                )));
            }
        }
        Ok(())
    }

    /// Thresholds in ascending order.
    pub fn entries(&self) -> &[TierThreshold] {
        &self.entries
    }

    /// Largest text length any tier accepts.
    pub fn max_capacity(&self) -> usize {
        self.entries.last().map_or(0, |e| e.max_len)
    }

    /// Threshold configured for `tier`, if present.
    pub fn threshold_of(&self, tier: EcTier) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.tier == tier)
            .map(|e| e.max_len)
    }

    /// Tier of the smallest threshold `>= text_len`.
    pub fn select(&self, text_len: usize) -> QrfeedResult<EcTier> {
        self.entries
            .iter()
            .find(|e| e.max_len >= text_len)
            .map(|e| e.tier)
            .ok_or(QrfeedError::CapacityExceeded {
                len: text_len,
                max: self.max_capacity(),
            })
    }
}

/// Text length as counted for tier selection (UTF-8 bytes).
pub fn text_len(text: &str) -> usize {
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid() {
        TierTable::default().validate().unwrap();
        assert_eq!(TierTable::default().max_capacity(), 428);
    }

    #[test]
    fn select_picks_smallest_sufficient_threshold() {
        let t = TierTable::default();
        assert_eq!(t.select(0).unwrap(), EcTier::H);
        assert_eq!(t.select(20).unwrap(), EcTier::H);
        assert_eq!(t.select(200).unwrap(), EcTier::Q);
        assert_eq!(t.select(260).unwrap(), EcTier::M);
        assert_eq!(t.select(400).unwrap(), EcTier::L);
    }

    #[test]
    fn select_is_inclusive_at_each_threshold() {
        let t = TierTable::default();
        for e in t.entries() {
            assert_eq!(t.select(e.max_len).unwrap(), e.tier);
        }
        assert_eq!(t.select(178).unwrap(), EcTier::Q);
    }

    #[test]
    fn select_fails_above_every_threshold() {
        let err = TierTable::default().select(429).unwrap_err();
        assert!(matches!(
            err,
            QrfeedError::CapacityExceeded { len: 429, max: 428 }
        ));
    }

    #[test]
    fn select_matches_brute_force_over_all_lengths() {
        let t = TierTable::default();
        for len in 0..=t.max_capacity() {
            let expected = t
                .entries()
                .iter()
                .filter(|e| e.max_len >= len)
                .min_by_key(|e| e.max_len)
                .unwrap()
                .tier;
            assert_eq!(t.select(len).unwrap(), expected, "len {len}");
        }
    }

    #[test]
    fn new_sorts_and_rejects_bad_tables() {
        let t = TierTable::new([
            TierThreshold {
                max_len: 30,
                tier: EcTier::L,
            },
            TierThreshold {
                max_len: 10,
                tier: EcTier::H,
            },
            TierThreshold {
                max_len: 20,
                tier: EcTier::M,
            },
            TierThreshold {
                max_len: 15,
                tier: EcTier::Q,
            },
        ])
        .unwrap();
        assert_eq!(t.entries()[0].tier, EcTier::H);
        assert_eq!(t.threshold_of(EcTier::M), Some(20));

        let dup = TierTable::new([
            TierThreshold {
                max_len: 10,
                tier: EcTier::H,
            },
            TierThreshold {
                max_len: 20,
                tier: EcTier::H,
            },
            TierThreshold {
                max_len: 30,
                tier: EcTier::M,
            },
            TierThreshold {
                max_len: 40,
                tier: EcTier::L,
            },
        ]);
        assert!(dup.is_err());

        let equal = TierTable::new([
            TierThreshold {
                max_len: 10,
                tier: EcTier::H,
            },
            TierThreshold {
                max_len: 10,
                tier: EcTier::Q,
            },
            TierThreshold {
                max_len: 30,
                tier: EcTier::M,
            },
            TierThreshold {
                max_len: 40,
                tier: EcTier::L,
            },
        ]);
        assert!(equal.is_err());

        assert!(TierTable::new([]).is_err());
    }

    #[test]
    fn text_len_counts_utf8_bytes() {
        assert_eq!(text_len("abc"), 3);
        assert_eq!(text_len("é€"), 5);
    }
}
