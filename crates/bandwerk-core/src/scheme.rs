// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scramble scheme — the protocol constants that decide whether an album is
// scrambled and how many bands its images were cut into.
//
// These values are observed from the upstream site, not chosen here. The
// asymmetric ranges (the middle range uses the same modulus as the default)
// are kept exactly as observed.

use serde::{Deserialize, Serialize};

use crate::error::{BandwerkError, Result};

/// Albums below this id were never scrambled.
pub const SCRAMBLE_THRESHOLD: u64 = 220_980;

/// Band counts indexed by `digest_char % modulus`.
pub const SEGMENT_TABLE: [u32; 10] = [2, 4, 6, 8, 10, 12, 14, 16, 18, 20];

/// Modulus used when no range matches.
pub const DEFAULT_MODULUS: u32 = 10;

/// Ordered album-id ranges with their own modulus. First match wins.
pub const MODULUS_RANGES: [ModulusRange; 2] = [
    ModulusRange {
        start: 268_850,
        end: Some(421_925),
        modulus: 10,
    },
    ModulusRange {
        start: 421_926,
        end: None,
        modulus: 8,
    },
];

/// An inclusive album-id range mapped to a modulus. `end: None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulusRange {
    pub start: u64,
    pub end: Option<u64>,
    pub modulus: u32,
}

impl ModulusRange {
    pub fn contains(&self, album_id: u64) -> bool {
        album_id >= self.start && self.end.is_none_or(|end| album_id <= end)
    }
}

/// Validated set of protocol constants.
///
/// Fields are private: every constructed scheme has a non-empty table and
/// moduli that index inside it, so band-count resolution is total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScheme", into = "RawScheme")]
pub struct ScrambleScheme {
    threshold: u64,
    ranges: Vec<ModulusRange>,
    default_modulus: u32,
    segment_table: Vec<u32>,
}

/// Unvalidated wire form of [`ScrambleScheme`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawScheme {
    threshold: u64,
    ranges: Vec<ModulusRange>,
    default_modulus: u32,
    segment_table: Vec<u32>,
}

impl ScrambleScheme {
    /// Build a scheme, rejecting moduli that would index past the table.
    pub fn new(
        threshold: u64,
        ranges: Vec<ModulusRange>,
        default_modulus: u32,
        segment_table: Vec<u32>,
    ) -> Result<Self> {
        if segment_table.is_empty() {
            return Err(BandwerkError::InvalidScheme(
                "segment table is empty".into(),
            ));
        }
        let table_len = segment_table.len();
        let check_modulus = |modulus: u32| -> Result<()> {
            if modulus == 0 || modulus as usize > table_len {
                return Err(BandwerkError::InvalidScheme(format!(
                    "modulus {modulus} outside 1..={table_len}"
                )));
            }
            Ok(())
        };

        check_modulus(default_modulus)?;
        for range in &ranges {
            check_modulus(range.modulus)?;
            if let Some(end) = range.end {
                if end < range.start {
                    return Err(BandwerkError::InvalidScheme(format!(
                        "range {}..={} is inverted",
                        range.start, end
                    )));
                }
            }
        }

        Ok(Self {
            threshold,
            ranges,
            default_modulus,
            segment_table,
        })
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn ranges(&self) -> &[ModulusRange] {
        &self.ranges
    }

    pub fn segment_table(&self) -> &[u32] {
        &self.segment_table
    }

    /// Whether images of this album were sliced at all.
    pub fn is_scrambled(&self, album_id: u64) -> bool {
        album_id >= self.threshold
    }

    /// Modulus applied to the digest character for `album_id`.
    pub fn modulus_for(&self, album_id: u64) -> u32 {
        self.ranges
            .iter()
            .find(|range| range.contains(album_id))
            .map_or(self.default_modulus, |range| range.modulus)
    }

    /// Band count stored at `index`. `index` is always `< modulus`, which
    /// construction bounds by the table length.
    pub fn band_count_at(&self, index: usize) -> u32 {
        self.segment_table[index]
    }
}

impl Default for ScrambleScheme {
    fn default() -> Self {
        Self {
            threshold: SCRAMBLE_THRESHOLD,
            ranges: MODULUS_RANGES.to_vec(),
            default_modulus: DEFAULT_MODULUS,
            segment_table: SEGMENT_TABLE.to_vec(),
        }
    }
}

impl TryFrom<RawScheme> for ScrambleScheme {
    type Error = BandwerkError;

    fn try_from(raw: RawScheme) -> Result<Self> {
        Self::new(raw.threshold, raw.ranges, raw.default_modulus, raw.segment_table)
    }
}

impl From<ScrambleScheme> for RawScheme {
    fn from(scheme: ScrambleScheme) -> Self {
        Self {
            threshold: scheme.threshold,
            ranges: scheme.ranges,
            default_modulus: scheme.default_modulus,
            segment_table: scheme.segment_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheme_matches_observed_constants() {
        let scheme = ScrambleScheme::default();
        assert_eq!(scheme.threshold(), 220_980);
        assert_eq!(scheme.segment_table(), &[2, 4, 6, 8, 10, 12, 14, 16, 18, 20]);
    }

    #[test]
    fn threshold_boundary() {
        let scheme = ScrambleScheme::default();
        assert!(!scheme.is_scrambled(220_979));
        assert!(scheme.is_scrambled(220_980));
    }

    #[test]
    fn modulus_range_boundaries() {
        let scheme = ScrambleScheme::default();
        assert_eq!(scheme.modulus_for(220_980), 10);
        assert_eq!(scheme.modulus_for(268_849), 10);
        assert_eq!(scheme.modulus_for(268_850), 10);
        assert_eq!(scheme.modulus_for(421_925), 10);
        assert_eq!(scheme.modulus_for(421_926), 8);
        assert_eq!(scheme.modulus_for(u64::MAX), 8);
    }

    #[test]
    fn rejects_modulus_past_table() {
        let err = ScrambleScheme::new(0, Vec::new(), 11, SEGMENT_TABLE.to_vec()).unwrap_err();
        assert!(matches!(err, BandwerkError::InvalidScheme(_)));
    }

    #[test]
    fn rejects_zero_modulus_in_range() {
        let ranges = vec![ModulusRange {
            start: 5,
            end: None,
            modulus: 0,
        }];
        assert!(ScrambleScheme::new(0, ranges, 4, vec![1, 2, 3, 4]).is_err());
    }

    #[test]
    fn rejects_inverted_range() {
        let ranges = vec![ModulusRange {
            start: 10,
            end: Some(9),
            modulus: 2,
        }];
        assert!(ScrambleScheme::new(0, ranges, 2, vec![2, 4]).is_err());
    }

    #[test]
    fn rejects_empty_table() {
        assert!(ScrambleScheme::new(0, Vec::new(), 1, Vec::new()).is_err());
    }

    #[test]
    fn deserialization_is_validated() {
        let json = r#"{"threshold":0,"ranges":[],"default_modulus":3,"segment_table":[2,4]}"#;
        assert!(serde_json::from_str::<ScrambleScheme>(json).is_err());

        let json = r#"{"threshold":7,"ranges":[],"default_modulus":2,"segment_table":[2,4]}"#;
        let scheme: ScrambleScheme = serde_json::from_str(json).unwrap();
        assert_eq!(scheme.threshold(), 7);
        assert_eq!(scheme.modulus_for(100), 2);
    }

    #[test]
    fn serde_round_trip_keeps_defaults() {
        let json = serde_json::to_string(&ScrambleScheme::default()).unwrap();
        let back: ScrambleScheme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ScrambleScheme::default());
    }
}
