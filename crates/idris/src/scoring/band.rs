use serde::{Deserialize, Serialize};

use super::aggregate::CompositeScore;
use super::domain::Band;
use super::veto::VetoFlag;

/// Inclusive integer range of composite scores covered by a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRange {
    pub band: Band,
    pub min: u8,
    pub max: u8,
}

/// Ordered range table, worst band first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandTable {
    ranges: Vec<BandRange>,
}

impl Default for BandTable {
    fn default() -> Self {
        Self {
            ranges: vec![
                BandRange {
                    band: Band::Red,
                    min: 0,
                    max: 34,
                },
                BandRange {
                    band: Band::Amber,
                    min: 35,
                    max: 54,
                },
                BandRange {
                    band: Band::Green,
                    min: 55,
                    max: 74,
                },
                BandRange {
                    band: Band::DarkGreen,
                    min: 75,
                    max: 100,
                },
            ],
        }
    }
}

/// Range-derived band and the band after the veto cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banding {
    pub raw: Band,
    pub effective: Band,
}

impl BandTable {
    pub fn new(ranges: Vec<BandRange>) -> Result<Self, String> {
        let table = Self { ranges };
        table.validate()?;
        Ok(table)
    }

    pub fn ranges(&self) -> &[BandRange] {
        &self.ranges
    }

    /// The table must list every band once, in order, covering 0-100 without gaps or overlaps.
    pub fn validate(&self) -> Result<(), String> {
        let bands: Vec<Band> = self.ranges.iter().map(|range| range.band).collect();
        if bands != Band::ordered() {
            return Err(format!(
                "bands must list red, amber, green, dark_green in order, found {bands:?}"
            ));
        }

        let mut expected_min = 0u16;
        for range in &self.ranges {
            if u16::from(range.min) != expected_min {
                return Err(format!(
                    "bands.{}: starts at {} but the previous band ends at {}",
                    range.band.key(),
                    range.min,
                    expected_min.saturating_sub(1)
                ));
            }
            if range.max < range.min {
                return Err(format!(
                    "bands.{}: max {} is below min {}",
                    range.band.key(),
                    range.max,
                    range.min
                ));
            }
            expected_min = u16::from(range.max) + 1;
        }

        if expected_min != 101 {
            return Err("bands must end at 100".to_string());
        }
        Ok(())
    }

    /// Looked up on the presented score. Lower bounds are inclusive, so 54.9 is still Amber.
    pub fn raw_band(&self, score: CompositeScore) -> Band {
        let value = score.presented();
        self.ranges
            .iter()
            .rev()
            .find(|range| value >= f64::from(range.min))
            .map(|range| range.band)
            .unwrap_or(Band::Red)
    }

    pub fn classify(&self, score: CompositeScore, veto: &VetoFlag) -> Banding {
        let raw = self.raw_band(score);
        let effective = if veto.is_triggered() {
            raw.min(Band::Amber)
        } else {
            raw
        };
        Banding { raw, effective }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::Dimension;

    fn band_of(value: f64) -> Band {
        BandTable::default().raw_band(CompositeScore::new(value))
    }

    #[test]
    fn boundary_values_follow_lower_inclusive_ranges() {
        assert_eq!(band_of(0.0), Band::Red);
        assert_eq!(band_of(34.0), Band::Red);
        assert_eq!(band_of(34.99), Band::Red);
        assert_eq!(band_of(35.0), Band::Amber);
        assert_eq!(band_of(54.0), Band::Amber);
        assert_eq!(band_of(55.0), Band::Green);
        assert_eq!(band_of(74.0), Band::Green);
        assert_eq!(band_of(75.0), Band::DarkGreen);
        assert_eq!(band_of(100.0), Band::DarkGreen);
    }

    #[test]
    fn float_noise_below_a_boundary_does_not_drop_a_band() {
        assert_eq!(band_of(54.999_999_999_99), Band::Green);
    }

    #[test]
    fn band_agrees_with_presented_score_next_to_boundaries() {
        for (value, presented, band) in [
            (54.999_999_999_5, 55.0, Band::Green),
            (54.999_999_998_5, 54.9, Band::Amber),
            (34.999_999_999_5, 35.0, Band::Amber),
            (74.999_999_999_5, 75.0, Band::DarkGreen),
            (74.95, 74.9, Band::Green),
        ] {
            assert_eq!(CompositeScore::new(value).presented(), presented, "{value}");
            assert_eq!(band_of(value), band, "{value}");
        }
    }

    #[test]
    fn veto_caps_green_bands_at_amber() {
        let table = BandTable::default();
        let veto = VetoFlag {
            triggered_by: vec![Dimension::Gender],
        };

        let dark = table.classify(CompositeScore::new(90.0), &veto);
        assert_eq!(dark.raw, Band::DarkGreen);
        assert_eq!(dark.effective, Band::Amber);

        let green = table.classify(CompositeScore::new(60.0), &veto);
        assert_eq!(green.effective, Band::Amber);

        let red = table.classify(CompositeScore::new(20.0), &veto);
        assert_eq!(red.effective, Band::Red);
    }

    #[test]
    fn rejects_gaps_and_overlaps() {
        let mut gap = BandTable::default().ranges().to_vec();
        gap[1].min = 36;
        assert!(BandTable::new(gap).is_err());

        let mut overlap = BandTable::default().ranges().to_vec();
        overlap[2].min = 50;
        assert!(BandTable::new(overlap).is_err());
    }

    #[test]
    fn rejects_out_of_order_bands() {
        let mut swapped = BandTable::default().ranges().to_vec();
        swapped.swap(0, 1);
        assert!(BandTable::new(swapped).is_err());
    }

    #[test]
    fn rejects_table_not_reaching_100() {
        let mut short = BandTable::default().ranges().to_vec();
        short[3].max = 99;
        let err = BandTable::new(short).expect_err("must end at 100");
        assert!(err.contains("100"));
    }
}
