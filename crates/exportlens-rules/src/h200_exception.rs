//! January 2026 H200 exception envelope.
//!
//! Chips below both the TPP and memory-bandwidth ceilings may be licensed
//! case by case. Two narrow bands carry the 25 % tariff.
//!
//! ## Checks
//! - **Envelope**: TPP < 21,000 AND memory bandwidth < 6.5 TB/s
//! - **Tariff zone**: point lies in one of the tariff rectangles (inclusive)
//!
//! [`H200Plot`] places catalog chips on the (TPP, memory bandwidth) plane.
//! Points that round to the same position (TPP to the integer, bandwidth to
//! 0.1 TB/s) form a stack.

use crate::catalog::ChipCatalog;
use crate::threshold_map::group_stacks;
use serde::{Deserialize, Serialize};

/// TPP ceiling of the exception envelope (exclusive).
pub const H200_TPP_CEILING: f64 = 21_000.0;
/// Memory bandwidth ceiling, TB/s (exclusive).
pub const H200_MEM_BW_CEILING_TBPS: f64 = 6.5;

/// A rectangle on the (TPP, memory bandwidth) plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TariffZone {
    pub tpp_min: f64,
    pub tpp_max: f64,
    pub mem_bw_min_tbps: f64,
    pub mem_bw_max_tbps: f64,
}

impl TariffZone {
    pub fn contains(&self, tpp: f64, mem_bw_tbps: f64) -> bool {
        (self.tpp_min..=self.tpp_max).contains(&tpp)
            && (self.mem_bw_min_tbps..=self.mem_bw_max_tbps).contains(&mem_bw_tbps)
    }
}

/// 25 % tariff bands.
pub const TARIFF_ZONES: [TariffZone; 2] = [
    TariffZone {
        tpp_min: 14_000.0,
        tpp_max: 17_500.0,
        mem_bw_min_tbps: 4.5,
        mem_bw_max_tbps: 5.0,
    },
    TariffZone {
        tpp_min: 20_800.0,
        tpp_max: 21_100.0,
        mem_bw_min_tbps: 5.8,
        mem_bw_max_tbps: 6.2,
    },
];

/// Outcome of the H200 exception check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct H200Assessment {
    /// Inside the case-by-case envelope
    pub within_exception: bool,
    /// Inside a 25 % tariff band
    pub tariff_zone: bool,
}

/// Assess a (TPP, memory bandwidth) point. Both operands are required.
pub fn assess_h200_exception(tpp: Option<f64>, mem_bw_tbps: Option<f64>) -> Option<H200Assessment> {
    let tpp = tpp.filter(|x| x.is_finite())?;
    let bw = mem_bw_tbps.filter(|x| x.is_finite())?;

    Some(H200Assessment {
        within_exception: tpp < H200_TPP_CEILING && bw < H200_MEM_BW_CEILING_TBPS,
        tariff_zone: TARIFF_ZONES.iter().any(|z| z.contains(tpp, bw)),
    })
}

// =============================================================================
// H200Plot
// =============================================================================

/// View window around the exception envelope (max TPP, max TB/s).
pub const H200_VIEW_EXCEPTION: (f64, f64) = (30_000.0, 10.0);
/// View window covering every catalog chip.
pub const H200_VIEW_ALL: (f64, f64) = (110_000.0, 25.0);

/// One chip on the H200 plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct H200Point {
    pub name: String,
    pub tpp: f64,
    pub mem_bw_tbps: f64,
    pub assessment: H200Assessment,
}

impl H200Point {
    pub fn new(name: impl Into<String>, tpp: f64, mem_bw_tbps: f64) -> Option<Self> {
        let assessment = assess_h200_exception(Some(tpp), Some(mem_bw_tbps))?;
        Some(Self {
            name: name.into(),
            tpp,
            mem_bw_tbps,
            assessment,
        })
    }

    /// Position key used for stacking.
    pub fn stack_key(&self) -> (i64, i64) {
        (self.tpp.round() as i64, (self.mem_bw_tbps * 10.0).round() as i64)
    }
}

/// Catalog chips with both TPP and a numeric memory bandwidth.
#[derive(Debug, Clone, Default, Serialize)]
pub struct H200Plot {
    pub points: Vec<H200Point>,
}

impl H200Plot {
    /// Plottable chips, in catalog order.
    pub fn from_catalog(catalog: &ChipCatalog) -> Self {
        let points = catalog
            .chips
            .iter()
            .filter_map(|chip| {
                H200Point::new(
                    chip.name.clone(),
                    chip.metrics().tpp()?,
                    chip.memory_bandwidth_tbps()?,
                )
            })
            .collect();
        Self { points }
    }

    /// Coincident points grouped, groups in first-seen order.
    pub fn stacks(&self) -> Vec<Vec<&H200Point>> {
        group_stacks(&self.points, H200Point::stack_key)
    }

    /// Points inside `[0, max_tpp] x [0, max_mem_bw_tbps]`.
    pub fn visible(&self, max_tpp: f64, max_mem_bw_tbps: f64) -> usize {
        self.points
            .iter()
            .filter(|p| p.tpp <= max_tpp && p.mem_bw_tbps <= max_mem_bw_tbps)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(name: &str, tpp: f64, bw: f64) -> H200Point {
        H200Point::new(name, tpp, bw).unwrap()
    }

    #[test]
    fn test_h200_like_point_is_inside() {
        let a = assess_h200_exception(Some(15_832.0), Some(4.8)).unwrap();
        assert!(a.within_exception);
        assert!(a.tariff_zone);
    }

    #[test]
    fn test_ceilings_exclusive() {
        let a = assess_h200_exception(Some(21_000.0), Some(4.0)).unwrap();
        assert!(!a.within_exception);

        let a = assess_h200_exception(Some(10_000.0), Some(6.5)).unwrap();
        assert!(!a.within_exception);
    }

    #[test]
    fn test_second_tariff_band_straddles_ceiling() {
        let a = assess_h200_exception(Some(21_050.0), Some(6.0)).unwrap();
        assert!(!a.within_exception);
        assert!(a.tariff_zone);
    }

    #[test]
    fn test_blackwell_class_is_outside() {
        let a = assess_h200_exception(Some(36_000.0), Some(8.0)).unwrap();
        assert_eq!(
            a,
            H200Assessment {
                within_exception: false,
                tariff_zone: false
            }
        );
    }

    #[test]
    fn test_missing_operand() {
        assert!(assess_h200_exception(None, Some(4.0)).is_none());
        assert!(assess_h200_exception(Some(10_000.0), None).is_none());
    }

    // =========================================================================
    // Plot
    // =========================================================================

    #[test]
    fn test_stacks_round_bandwidth_to_tenths() {
        let plot = H200Plot {
            points: vec![
                point("a", 15_832.0, 4.8),
                point("b", 15_832.2, 4.83),
                point("c", 15_832.0, 4.9),
            ],
        };
        let stacks = plot.stacks();
        assert_eq!(stacks.len(), 2);
        let names: Vec<&str> = stacks[0].iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(stacks[1][0].name, "c");
    }

    #[test]
    fn test_visible_window() {
        let plot = H200Plot {
            points: vec![point("a", 15_832.0, 4.8), point("b", 36_000.0, 8.0)],
        };
        let (tpp, bw) = H200_VIEW_EXCEPTION;
        assert_eq!(plot.visible(tpp, bw), 1);
        let (tpp, bw) = H200_VIEW_ALL;
        assert_eq!(plot.visible(tpp, bw), 2);
        assert_eq!(plot.visible(20_000.0, 4.0), 0);
    }

    #[test]
    fn test_point_carries_assessment() {
        let p = point("a", 15_832.0, 4.8);
        assert!(p.assessment.within_exception);
        assert!(H200Point::new("x", f64::NAN, 4.0).is_none());
    }
}
