//! Property tests for the TPP/PD calculator and the current rule.
//!
//! Covers:
//! 1. Missing or non-positive throughput yields no metrics
//! 2. Sparse halving equals pre-halved dense input
//! 3. compute_metrics is idempotent
//! 4. TPP monotone in throughput, PD non-increasing in die area
//! 5. Severity never drops as TPP rises at fixed PD

use exportlens_models::{BitLength, ChipMetrics, ControlStatus, DerivedMetrics};
use exportlens_rules::{ClassificationEngine, MetricCalculator, RuleVersion};
use proptest::prelude::*;

fn arb_bit_length() -> impl Strategy<Value = BitLength> {
    prop::sample::select(BitLength::ALL.to_vec())
}

fn arb_throughput() -> impl Strategy<Value = f64> {
    0.001f64..1.0e6
}

fn arb_die_area() -> impl Strategy<Value = f64> {
    1.0f64..5000.0
}

fn severity(status: ControlStatus) -> u8 {
    match status {
        ControlStatus::Unknown | ControlStatus::NotControlled => 0,
        ControlStatus::ControlledEligibleForException => 1,
        ControlStatus::Controlled => 2,
    }
}

proptest! {
    // =========================================================================
    // Absent inputs
    // =========================================================================

    #[test]
    fn missing_throughput_has_no_metrics(
        bits in arb_bit_length(),
        sparse in any::<bool>(),
        area in prop::option::of(arb_die_area()),
    ) {
        let input = ChipMetrics {
            peak_throughput: None,
            bit_length: bits,
            is_sparse: sparse,
            die_area: area,
            is_datacenter_marketed: true,
        };
        let m = MetricCalculator::compute_metrics(&input);
        prop_assert_eq!(m.tpp(), None);
        prop_assert_eq!(m.pd(), None);
        prop_assert_eq!(
            ClassificationEngine::classify(&m, true, RuleVersion::current()).status,
            ControlStatus::Unknown
        );
    }

    #[test]
    fn non_positive_throughput_has_no_metrics(t in -1.0e6f64..=0.0, bits in arb_bit_length()) {
        let m = MetricCalculator::compute_metrics(&ChipMetrics::dense(t, bits, Some(800.0)));
        prop_assert_eq!(m, DerivedMetrics::UNKNOWN);
    }

    // =========================================================================
    // Sparsity and idempotence
    // =========================================================================

    #[test]
    fn sparse_equals_pre_halved_dense(
        t in arb_throughput(),
        bits in arb_bit_length(),
        area in prop::option::of(arb_die_area()),
    ) {
        let sparse = MetricCalculator::compute_metrics(&ChipMetrics::dense(t, bits, area).sparse());
        let dense = MetricCalculator::compute_metrics(&ChipMetrics::dense(t / 2.0, bits, area));
        prop_assert_eq!(sparse, dense);
    }

    #[test]
    fn compute_metrics_is_idempotent(
        t in arb_throughput(),
        bits in arb_bit_length(),
        sparse in any::<bool>(),
        area in prop::option::of(arb_die_area()),
    ) {
        let mut input = ChipMetrics::dense(t, bits, area);
        input.is_sparse = sparse;
        prop_assert_eq!(
            MetricCalculator::compute_metrics(&input),
            MetricCalculator::compute_metrics(&input)
        );
    }

    // =========================================================================
    // Monotonicity
    // =========================================================================

    #[test]
    fn tpp_monotone_in_throughput(
        a in arb_throughput(),
        b in arb_throughput(),
        bits in arb_bit_length(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let m_lo = MetricCalculator::compute_metrics(&ChipMetrics::dense(lo, bits, None));
        let m_hi = MetricCalculator::compute_metrics(&ChipMetrics::dense(hi, bits, None));
        prop_assert!(m_lo.tpp().unwrap() <= m_hi.tpp().unwrap());
    }

    #[test]
    fn pd_non_increasing_in_die_area(
        t in arb_throughput(),
        a in arb_die_area(),
        b in arb_die_area(),
    ) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let m_small = MetricCalculator::compute_metrics(&ChipMetrics::dense(t, BitLength::B8, Some(small)));
        let m_large = MetricCalculator::compute_metrics(&ChipMetrics::dense(t, BitLength::B8, Some(large)));
        prop_assert!(m_small.pd().unwrap() >= m_large.pd().unwrap());
    }

    #[test]
    fn severity_never_drops_as_tpp_rises(
        a in 1.0f64..20_000.0,
        b in 1.0f64..20_000.0,
        pd in prop::option::of(0.0f64..30.0),
        datacenter in any::<bool>(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let classify = |tpp: f64| {
            ClassificationEngine::classify(
                &DerivedMetrics::new(tpp, pd),
                datacenter,
                RuleVersion::current(),
            )
            .status
        };
        prop_assert!(severity(classify(lo)) <= severity(classify(hi)));
    }

    #[test]
    fn known_tpp_is_never_unknown(
        tpp in 0.001f64..1.0e6,
        pd in prop::option::of(0.0f64..100.0),
        datacenter in any::<bool>(),
    ) {
        for version in RuleVersion::ALL {
            let c = ClassificationEngine::classify(&DerivedMetrics::new(tpp, pd), datacenter, version);
            prop_assert_ne!(c.status, ControlStatus::Unknown);
        }
    }
}
