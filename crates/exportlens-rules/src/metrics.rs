//! # Metric Calculator
//!
//! Derives TPP and PD from raw chip figures.
//!
//! ## Formulas
//! - `tpp = (is_sparse ? peak / 2 : peak) × bit_length`
//! - `pd  = tpp ÷ die_area`
//!
//! Sparse halving is fixed. It follows the datasheet convention that sparse
//! figures are quoted at 2× dense throughput, which does not hold for every
//! part (some FP4 configurations). A caller that knows the dense figure passes
//! it directly with `is_sparse = false`.
//!
//! Missing, zero, negative or non-finite inputs make the affected metric
//! absent; nothing here divides by zero or panics.

use exportlens_models::{ChipMetrics, DerivedMetrics};
use tracing::trace;

/// Stateless TPP/PD calculator.
pub struct MetricCalculator;

impl MetricCalculator {
    /// Compute TPP and PD for one chip.
    pub fn compute_metrics(input: &ChipMetrics) -> DerivedMetrics {
        let tpp = input
            .peak_throughput
            .and_then(positive)
            .map(|peak| dense_throughput(peak, input.is_sparse) * input.bit_length.multiplier())
            .and_then(finite);

        let pd = tpp.and_then(|tpp| performance_density(tpp, input.die_area));

        trace!(
            peak = ?input.peak_throughput,
            bits = input.bit_length.bits(),
            sparse = input.is_sparse,
            die_area = ?input.die_area,
            tpp = ?tpp,
            pd = ?pd,
            "computed metrics"
        );

        DerivedMetrics::from_parts(tpp, pd)
    }
}

/// Build metrics for a published catalog row.
///
/// A published PD is used as-is; otherwise PD is derived from TPP and die
/// area. A PD without a TPP is discarded.
pub fn from_published(tpp: Option<f64>, die_area: Option<f64>, pd: Option<f64>) -> DerivedMetrics {
    let tpp = tpp.and_then(positive);
    let pd = match (tpp, pd.and_then(finite)) {
        (Some(_), Some(pd)) => Some(pd),
        (Some(tpp), None) => performance_density(tpp, die_area),
        (None, _) => None,
    };
    DerivedMetrics::from_parts(tpp, pd)
}

/// Sparse figures are halved.
fn dense_throughput(peak: f64, is_sparse: bool) -> f64 {
    if is_sparse {
        peak / 2.0
    } else {
        peak
    }
}

fn performance_density(tpp: f64, die_area: Option<f64>) -> Option<f64> {
    die_area
        .and_then(positive)
        .map(|area| tpp / area)
        .and_then(finite)
}

fn positive(x: f64) -> Option<f64> {
    (x.is_finite() && x > 0.0).then_some(x)
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exportlens_models::BitLength;

    fn metrics(peak: Option<f64>, bits: BitLength, sparse: bool, area: Option<f64>) -> ChipMetrics {
        ChipMetrics {
            peak_throughput: peak,
            bit_length: bits,
            is_sparse: sparse,
            die_area: area,
            is_datacenter_marketed: true,
        }
    }

    #[test]
    fn test_h100_dense_fp8() {
        let m = MetricCalculator::compute_metrics(&metrics(Some(1979.0), BitLength::B8, false, Some(814.0)));
        assert_eq!(m.tpp(), Some(15832.0));
        let pd = m.pd().unwrap();
        assert!((pd - 19.45).abs() < 0.01, "pd = {}", pd);
    }

    #[test]
    fn test_sparse_is_halved() {
        let m = MetricCalculator::compute_metrics(&metrics(Some(3958.0), BitLength::B8, true, None));
        assert_eq!(m.tpp(), Some(15832.0));
        assert!(m.pd().is_none());
    }

    #[test]
    fn test_missing_throughput_yields_nothing() {
        let m = MetricCalculator::compute_metrics(&metrics(None, BitLength::B8, false, Some(814.0)));
        assert_eq!(m, DerivedMetrics::UNKNOWN);
    }

    #[test]
    fn test_zero_throughput_yields_nothing() {
        let m = MetricCalculator::compute_metrics(&metrics(Some(0.0), BitLength::B16, false, Some(100.0)));
        assert!(m.tpp().is_none());
        assert!(m.pd().is_none());
    }

    #[test]
    fn test_zero_die_area_is_unknown_pd() {
        let m = MetricCalculator::compute_metrics(&metrics(Some(100.0), BitLength::B8, false, Some(0.0)));
        assert_eq!(m.tpp(), Some(800.0));
        assert!(m.pd().is_none());
    }

    #[test]
    fn test_bit_length_multiplier() {
        let m = MetricCalculator::compute_metrics(&metrics(Some(624.0), BitLength::B8, false, Some(826.0)));
        assert_eq!(m.tpp(), Some(4992.0));

        let m = MetricCalculator::compute_metrics(&metrics(Some(100.0), BitLength::B64, false, None));
        assert_eq!(m.tpp(), Some(6400.0));
    }

    #[test]
    fn test_from_published_prefers_published_pd() {
        let m = from_published(Some(13364.0), Some(814.0), Some(16.42));
        assert_eq!(m.pd(), Some(16.42));
    }

    #[test]
    fn test_from_published_derives_missing_pd() {
        let m = from_published(Some(8000.0), Some(1000.0), None);
        assert_eq!(m.pd(), Some(8.0));
    }

    #[test]
    fn test_from_published_drops_orphan_pd() {
        let m = from_published(None, Some(814.0), Some(19.4));
        assert_eq!(m, DerivedMetrics::UNKNOWN);
    }
}
