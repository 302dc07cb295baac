//! Classification Engine — maps (TPP, PD, context) to a control status.
//!
//! Stateless, one-shot evaluation against the tables owned by a
//! [`RuleVersion`]. The first matching rule wins; if none matches the chip is
//! not controlled. A missing TPP short-circuits to `Unknown` before any table
//! is consulted.
//!
//! ## Usage
//! ```ignore
//! use exportlens_rules::{ClassificationEngine, MetricCalculator, RuleVersion};
//!
//! let metrics = MetricCalculator::compute_metrics(&input);
//! let verdict = ClassificationEngine::classify(&metrics, true, RuleVersion::current());
//! ```

use crate::rule_history::RuleVersion;
use crate::threshold_table::{first_match, RuleInput};
use exportlens_models::{Classification, DerivedMetrics};
use tracing::debug;

/// Stateless classification engine.
pub struct ClassificationEngine;

impl ClassificationEngine {
    /// Classify a chip under `rule_version`.
    ///
    /// Interconnect bandwidth is not supplied, so under the 2022 baseline the
    /// conjunctive test cannot be satisfied.
    pub fn classify(
        metrics: &DerivedMetrics,
        is_datacenter_marketed: bool,
        rule_version: RuleVersion,
    ) -> Classification {
        Self::classify_with_interconnect(metrics, is_datacenter_marketed, None, rule_version)
    }

    /// Classify a chip, supplying interconnect bandwidth (GB/s) for rule
    /// versions that use it. Versions that do not use it ignore the value.
    pub fn classify_with_interconnect(
        metrics: &DerivedMetrics,
        is_datacenter_marketed: bool,
        interconnect_gbps: Option<f64>,
        rule_version: RuleVersion,
    ) -> Classification {
        let Some(tpp) = metrics.tpp() else {
            debug!(rule = %rule_version, "no TPP; classification unknown");
            return Classification::unknown();
        };

        let input = RuleInput {
            tpp,
            pd: metrics.pd(),
            interconnect_gbps: if rule_version.uses_interconnect() {
                interconnect_gbps
            } else {
                None
            },
        };

        let table = rule_version.table(is_datacenter_marketed);
        let classification = match first_match(table, &input) {
            Some(rule) => Classification::matched(rule.verdict, rule.tier_label, rule.eccn),
            None => Classification::not_controlled(),
        };

        debug!(
            rule = %rule_version,
            tpp,
            pd = ?input.pd,
            interconnect_gbps = ?input.interconnect_gbps,
            datacenter = is_datacenter_marketed,
            status = %classification.status,
            tier = ?classification.matched_tier,
            "classified"
        );

        classification
    }
}
