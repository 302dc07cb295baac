//! Threshold tables — ordered, first-match-wins rule lists.
//!
//! ## Rule Order (Oct 2023 framework, datacenter-marketed)
//! 1. A1: TPP ≥ 4800 → Controlled (3A090.a.1)
//! 2. A2: TPP ≥ 1600 AND PD ≥ 5.92 → Controlled (3A090.a.2)
//! 3. B1: 2400 ≤ TPP < 4800 AND 1.6 ≤ PD < 5.92 → NAC/ACA eligible (3A090.b.1)
//! 4. B2: TPP ≥ 1600 AND 3.2 ≤ PD < 5.92 → NAC/ACA eligible (3A090.b.2)
//! 5. Else: not controlled
//!
//! ## Rule Order (Oct 2023 framework, not datacenter-marketed)
//! 1. ND: TPP ≥ 4800 → NAC/ACA eligible (no subsection)
//! 2. Else: not controlled
//!
//! ## Rule Order (Oct 2022 baseline)
//! 1. TPP ≥ 4800 AND interconnect ≥ 600 GB/s → Controlled (3A090.a)
//! 2. Else: not controlled
//!
//! Bounds are inclusive below and exclusive above. A predicate that needs PD
//! or interconnect bandwidth fails when that operand is absent.

use exportlens_models::ControlStatus;

// =============================================================================
// Threshold constants
// =============================================================================

/// TPP above which every chip is covered (both frameworks).
pub const TPP_HIGH: f64 = 4800.0;
/// Lower TPP edge of the 3A090.b.1 band.
pub const TPP_MID: f64 = 2400.0;
/// TPP floor for the density-based rules.
pub const TPP_LOW: f64 = 1600.0;

/// PD at or above which a chip over [`TPP_LOW`] is license-controlled.
pub const PD_HIGH: f64 = 5.92;
/// Lower PD edge of the 3A090.b.2 band.
pub const PD_MID: f64 = 3.2;
/// Lower PD edge of the 3A090.b.1 band.
pub const PD_LOW: f64 = 1.6;

/// Oct 2022 interconnect threshold, GB/s.
pub const INTERCONNECT_GBPS_2022: f64 = 600.0;

// =============================================================================
// RuleInput / ThresholdRule
// =============================================================================

/// Operands a predicate may inspect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleInput {
    pub tpp: f64,
    pub pd: Option<f64>,
    /// Aggregate bidirectional interconnect bandwidth, GB/s
    pub interconnect_gbps: Option<f64>,
}

/// One row of a threshold table.
#[derive(Clone, Copy)]
pub struct ThresholdRule {
    /// Short tier label (`A1`, `B2`, ...)
    pub tier_label: &'static str,
    /// ECCN subsection cited when this rule matches
    pub eccn: Option<&'static str>,
    /// Human-readable predicate
    pub description: &'static str,
    pub predicate: fn(&RuleInput) -> bool,
    pub verdict: ControlStatus,
}

impl std::fmt::Debug for ThresholdRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdRule")
            .field("tier_label", &self.tier_label)
            .field("eccn", &self.eccn)
            .field("description", &self.description)
            .field("verdict", &self.verdict)
            .finish_non_exhaustive()
    }
}

impl ThresholdRule {
    /// Evaluate the predicate.
    pub fn matches(&self, input: &RuleInput) -> bool {
        (self.predicate)(input)
    }
}

/// First rule in `table` whose predicate holds.
pub fn first_match<'a>(table: &'a [ThresholdRule], input: &RuleInput) -> Option<&'a ThresholdRule> {
    table.iter().find(|rule| rule.matches(input))
}

/// `low <= x < high`
fn in_band(x: f64, low: f64, high: f64) -> bool {
    x >= low && x < high
}

fn pd_in_band(input: &RuleInput, low: f64, high: f64) -> bool {
    input.pd.is_some_and(|pd| in_band(pd, low, high))
}

// =============================================================================
// Tables
// =============================================================================

/// Oct 2023 / Dec 2024 datacenter table (most restrictive first).
pub static DATACENTER_2023: [ThresholdRule; 4] = [
    ThresholdRule {
        tier_label: "A1",
        eccn: Some("3A090.a.1"),
        description: "TPP >= 4800",
        predicate: |i| i.tpp >= TPP_HIGH,
        verdict: ControlStatus::Controlled,
    },
    ThresholdRule {
        tier_label: "A2",
        eccn: Some("3A090.a.2"),
        description: "TPP >= 1600 and PD >= 5.92",
        predicate: |i| i.tpp >= TPP_LOW && i.pd.is_some_and(|pd| pd >= PD_HIGH),
        verdict: ControlStatus::Controlled,
    },
    ThresholdRule {
        tier_label: "B1",
        eccn: Some("3A090.b.1"),
        description: "2400 <= TPP < 4800 and 1.6 <= PD < 5.92",
        predicate: |i| in_band(i.tpp, TPP_MID, TPP_HIGH) && pd_in_band(i, PD_LOW, PD_HIGH),
        verdict: ControlStatus::ControlledEligibleForException,
    },
    ThresholdRule {
        tier_label: "B2",
        eccn: Some("3A090.b.2"),
        description: "TPP >= 1600 and 3.2 <= PD < 5.92",
        predicate: |i| i.tpp >= TPP_LOW && pd_in_band(i, PD_MID, PD_HIGH),
        verdict: ControlStatus::ControlledEligibleForException,
    },
];

/// Oct 2023 / Dec 2024 table for chips not marketed for datacenters.
///
/// No ECCN subsection is cited: the rule text leaves the subsection open for
/// these parts.
pub static NON_DATACENTER_2023: [ThresholdRule; 1] = [ThresholdRule {
    tier_label: "ND",
    eccn: None,
    description: "TPP >= 4800 (non-datacenter)",
    predicate: |i| i.tpp >= TPP_HIGH,
    verdict: ControlStatus::ControlledEligibleForException,
}];

/// Oct 2022 baseline: performance AND interconnect.
pub static BASELINE_2022: [ThresholdRule; 1] = [ThresholdRule {
    tier_label: "2022",
    eccn: Some("3A090.a"),
    description: "TPP >= 4800 and interconnect >= 600 GB/s",
    predicate: |i| i.tpp >= TPP_HIGH && i.interconnect_gbps.is_some_and(|bw| bw >= INTERCONNECT_GBPS_2022),
    verdict: ControlStatus::Controlled,
}];

// =============================================================================
// Canonical bytes
// =============================================================================

/// Canonical byte for a status (frozen).
pub fn status_byte(status: ControlStatus) -> u8 {
    match status {
        ControlStatus::Controlled => 0x01,
        ControlStatus::ControlledEligibleForException => 0x02,
        ControlStatus::NotControlled => 0x03,
        ControlStatus::Unknown => 0x04,
    }
}

/// Canonical bytes of a table.
///
/// Field order per rule: tier_label, eccn (0x00 | 0x01 + string),
/// description, verdict byte. Strings are u32 LE length + UTF-8.
pub fn table_canonical_bytes(table: &[ThresholdRule]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(table.len() as u32).to_le_bytes());
    for rule in table {
        write_string(&mut bytes, rule.tier_label);
        match rule.eccn {
            None => bytes.push(0x00),
            Some(eccn) => {
                bytes.push(0x01);
                write_string(&mut bytes, eccn);
            }
        }
        write_string(&mut bytes, rule.description);
        bytes.push(status_byte(rule.verdict));
    }
    bytes
}

pub(crate) fn write_string(bytes: &mut Vec<u8>, s: &str) {
    bytes.extend_from_slice(&(s.len() as u32).to_le_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tpp: f64, pd: Option<f64>) -> RuleInput {
        RuleInput {
            tpp,
            pd,
            interconnect_gbps: None,
        }
    }

    fn tier(table: &[ThresholdRule], i: RuleInput) -> Option<&'static str> {
        first_match(table, &i).map(|r| r.tier_label)
    }

    // =========================================================================
    // Datacenter table
    // =========================================================================

    #[test]
    fn test_a1_precedes_a2() {
        assert_eq!(tier(&DATACENTER_2023, input(5000.0, Some(10.0))), Some("A1"));
    }

    #[test]
    fn test_a1_without_pd() {
        assert_eq!(tier(&DATACENTER_2023, input(4800.0, None)), Some("A1"));
    }

    #[test]
    fn test_a2_lower_bounds_inclusive() {
        assert_eq!(tier(&DATACENTER_2023, input(1600.0, Some(5.92))), Some("A2"));
        assert_eq!(tier(&DATACENTER_2023, input(1599.999, Some(5.92))), None);
    }

    #[test]
    fn test_b1_band_edges() {
        assert_eq!(tier(&DATACENTER_2023, input(2400.0, Some(1.6))), Some("B1"));
        // PD upper bound exclusive: 5.92 moves to A2
        assert_eq!(tier(&DATACENTER_2023, input(2400.0, Some(5.92))), Some("A2"));
        // PD below band
        assert_eq!(tier(&DATACENTER_2023, input(3000.0, Some(1.599))), None);
    }

    #[test]
    fn test_b2_below_b1_tpp_band() {
        assert_eq!(tier(&DATACENTER_2023, input(2000.0, Some(3.2))), Some("B2"));
        assert_eq!(tier(&DATACENTER_2023, input(2000.0, Some(3.19))), None);
    }

    #[test]
    fn test_pd_rules_fail_without_pd() {
        assert_eq!(tier(&DATACENTER_2023, input(4799.0, None)), None);
    }

    // =========================================================================
    // Other tables
    // =========================================================================

    #[test]
    fn test_non_datacenter_threshold() {
        assert_eq!(tier(&NON_DATACENTER_2023, input(4800.0, Some(100.0))), Some("ND"));
        assert_eq!(tier(&NON_DATACENTER_2023, input(4799.9, Some(100.0))), None);
    }

    #[test]
    fn test_baseline_2022_requires_both() {
        let mut i = input(4992.0, None);
        assert_eq!(tier(&BASELINE_2022, i), None);

        i.interconnect_gbps = Some(600.0);
        assert_eq!(tier(&BASELINE_2022, i), Some("2022"));

        i.interconnect_gbps = Some(400.0);
        assert_eq!(tier(&BASELINE_2022, i), None);

        i.tpp = 4700.0;
        i.interconnect_gbps = Some(900.0);
        assert_eq!(tier(&BASELINE_2022, i), None);
    }

    // =========================================================================
    // Canonical bytes
    // =========================================================================

    #[test]
    fn test_canonical_bytes_stable_and_distinct() {
        let a = table_canonical_bytes(&DATACENTER_2023);
        assert_eq!(a, table_canonical_bytes(&DATACENTER_2023));
        assert_ne!(a, table_canonical_bytes(&NON_DATACENTER_2023));
        assert_eq!(&a[..4], &4u32.to_le_bytes());
    }
}
