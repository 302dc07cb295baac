//! Rule History — the static list of BIS advanced-computing rule versions.
//!
//! Each [`RuleVersion`] variant owns its own threshold tables and metadata.
//! The list is append-only: a new rule gets a new variant, old variants keep
//! their tables so that earlier verdicts stay reproducible.
//!
//! ## Versions
//! - `2022-10-07` Baseline: performance AND interconnect
//! - `2023-10-17` Advanced: TPP/PD tiers, datacenter distinction
//! - `2024-12-02` Refinement: same compute thresholds, adds HBM controls
//!
//! "Current" is the version with the latest effective date.

use crate::threshold_table::{
    self, BASELINE_2022, DATACENTER_2023, NON_DATACENTER_2023, ThresholdRule, write_string,
};
use crate::RulesError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// =============================================================================
// RuleRecord — static metadata
// =============================================================================

/// Published metadata for one rule version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleRecord {
    /// Effective date (year, month, day)
    pub effective: (i32, u32, u32),
    /// Federal Register citation
    pub citation: &'static str,
    /// TPP (or 2022 "performance") threshold
    pub tpp_threshold: f64,
    pub pd_threshold: Option<f64>,
    /// Interconnect threshold as published
    pub interconnect_threshold: Option<&'static str>,
    pub url: &'static str,
    pub summary: &'static str,
}

const RECORD_2022: RuleRecord = RuleRecord {
    effective: (2022, 10, 7),
    citation: "Implementation of Additional Export Controls: Certain Advanced Computing and \
               Semiconductor Manufacturing Items; Supercomputer and Semiconductor End Use; \
               Entity List Modification, 87 Fed. Reg. 62186 (Oct. 13, 2022)",
    tpp_threshold: 4800.0,
    pd_threshold: None,
    interconnect_threshold: Some("600 GB/s"),
    url: "https://www.federalregister.gov/documents/2022/10/13/2022-21658/implementation-of-additional-export-controls-certain-advanced-computing-and-semiconductor",
    summary: "Initial BIS controls on AI chips. A chip was controlled only if it met both \
              criteria: bit length x TOPS of 4800 or more, and aggregate bidirectional \
              transfer rate of 600 GB/s or more. The thresholds sat just below the NVIDIA \
              A100; reduced-interconnect variants (A800, H800) escaped them.",
};

const RECORD_2023: RuleRecord = RuleRecord {
    effective: (2023, 10, 17),
    citation: "Implementation of Additional Export Controls: Certain Advanced Computing Items; \
               Supercomputer and Semiconductor End Use; Updates and Corrections, \
               88 Fed. Reg. 73458 (Oct. 25, 2023)",
    tpp_threshold: 4800.0,
    pd_threshold: Some(5.92),
    interconnect_threshold: None,
    url: "https://www.federalregister.gov/documents/2023/10/25/2023-23055/implementation-of-additional-export-controls-certain-advanced-computing-items-supercomputer-and",
    summary: "Replaced the interconnect test with Total Processing Performance and \
              Performance Density, added the datacenter-marketing criterion, and created \
              the NAC/ACA exception tiers under 3A090.b. Non-datacenter chips with \
              TPP >= 4800 face the lighter regime.",
};

const RECORD_2024: RuleRecord = RuleRecord {
    effective: (2024, 12, 2),
    citation: "Foreign-Produced Direct Product Rule Additions, and Refinements to Controls for \
               Advanced Computing and Semiconductor Manufacturing Items, \
               89 Fed. Reg. 96790 (Dec. 5, 2024)",
    tpp_threshold: 4800.0,
    pd_threshold: Some(5.92),
    interconnect_threshold: None,
    url: "https://www.federalregister.gov/documents/2024/12/05/2024-28270/foreign-produced-direct-product-rule-additions-and-refinements-to-controls-for-advanced-computing",
    summary: "Added high-bandwidth memory controls and foreign direct product rule \
              refinements. Compute thresholds unchanged from October 2023.",
};

// =============================================================================
// RuleVersion
// =============================================================================

/// A regulatory threshold regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RuleVersion {
    Baseline2022,
    Advanced2023,
    Refinement2024,
}

impl RuleVersion {
    /// Every version, newest first.
    pub const ALL: [RuleVersion; 3] = [
        RuleVersion::Refinement2024,
        RuleVersion::Advanced2023,
        RuleVersion::Baseline2022,
    ];

    /// The version with the latest effective date.
    pub fn current() -> RuleVersion {
        Self::ALL
            .into_iter()
            .max_by_key(|v| v.record().effective)
            .unwrap_or(RuleVersion::Refinement2024)
    }

    /// Stable identifier (the effective date).
    pub fn id(&self) -> &'static str {
        match self {
            RuleVersion::Baseline2022 => "2022-10-07",
            RuleVersion::Advanced2023 => "2023-10-17",
            RuleVersion::Refinement2024 => "2024-12-02",
        }
    }

    pub fn record(&self) -> &'static RuleRecord {
        match self {
            RuleVersion::Baseline2022 => &RECORD_2022,
            RuleVersion::Advanced2023 => &RECORD_2023,
            RuleVersion::Refinement2024 => &RECORD_2024,
        }
    }

    /// Effective date as a calendar date.
    pub fn effective_date(&self) -> NaiveDate {
        let (y, m, d) = self.record().effective;
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
    }

    /// Whether the datacenter-marketing flag selects a different table.
    pub fn distinguishes_datacenter(&self) -> bool {
        !matches!(self, RuleVersion::Baseline2022)
    }

    /// Whether the interconnect bandwidth is an operand.
    pub fn uses_interconnect(&self) -> bool {
        matches!(self, RuleVersion::Baseline2022)
    }

    /// Threshold table for the given datacenter flag.
    pub fn table(&self, is_datacenter_marketed: bool) -> &'static [ThresholdRule] {
        match self {
            RuleVersion::Baseline2022 => &BASELINE_2022,
            RuleVersion::Advanced2023 | RuleVersion::Refinement2024 => {
                if is_datacenter_marketed {
                    &DATACENTER_2023
                } else {
                    &NON_DATACENTER_2023
                }
            }
        }
    }

    /// Canonical bytes of the version's thresholds and tables.
    ///
    /// Field order:
    /// 1. id
    /// 2. tpp_threshold (f64 LE bits)
    /// 3. pd_threshold (0x00 | 0x01 + f64 LE bits)
    /// 4. interconnect_threshold (0x00 | 0x01 + string)
    /// 5. datacenter table
    /// 6. non-datacenter table
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let record = self.record();
        let mut bytes = Vec::new();

        write_string(&mut bytes, self.id());
        bytes.extend_from_slice(&record.tpp_threshold.to_bits().to_le_bytes());

        match record.pd_threshold {
            None => bytes.push(0x00),
            Some(pd) => {
                bytes.push(0x01);
                bytes.extend_from_slice(&pd.to_bits().to_le_bytes());
            }
        }

        match record.interconnect_threshold {
            None => bytes.push(0x00),
            Some(ic) => {
                bytes.push(0x01);
                write_string(&mut bytes, ic);
            }
        }

        bytes.extend_from_slice(&threshold_table::table_canonical_bytes(self.table(true)));
        bytes.extend_from_slice(&threshold_table::table_canonical_bytes(self.table(false)));
        bytes
    }

    /// SHA-256 of [`canonical_bytes`](Self::canonical_bytes).
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_bytes());
        let result = hasher.finalize();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Fingerprint as hex (for display/logging).
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint())
    }
}

impl Default for RuleVersion {
    fn default() -> Self {
        RuleVersion::current()
    }
}

impl std::fmt::Display for RuleVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for RuleVersion {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("current") || s.eq_ignore_ascii_case("latest") {
            return Ok(RuleVersion::current());
        }
        RuleVersion::ALL
            .into_iter()
            .find(|v| v.id() == s)
            .ok_or_else(|| RulesError::UnknownRuleVersion(s.to_string()))
    }
}

impl TryFrom<String> for RuleVersion {
    type Error = RulesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RuleVersion> for String {
    fn from(value: RuleVersion) -> Self {
        value.id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_is_latest_effective_date() {
        let current = RuleVersion::current();
        assert_eq!(current, RuleVersion::Refinement2024);
        for v in RuleVersion::ALL {
            assert!(v.effective_date() <= current.effective_date());
        }
        assert_eq!(RuleVersion::default(), current);
    }

    #[test]
    fn test_all_is_newest_first() {
        let dates: Vec<NaiveDate> = RuleVersion::ALL.iter().map(|v| v.effective_date()).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_effective_dates_are_valid() {
        for v in RuleVersion::ALL {
            assert_ne!(v.effective_date(), NaiveDate::MIN, "{} has invalid date", v);
            assert_eq!(v.effective_date().format("%Y-%m-%d").to_string(), v.id());
        }
    }

    #[test]
    fn test_parse_ids_and_aliases() {
        assert_eq!("2022-10-07".parse::<RuleVersion>().unwrap(), RuleVersion::Baseline2022);
        assert_eq!(" 2023-10-17 ".parse::<RuleVersion>().unwrap(), RuleVersion::Advanced2023);
        assert_eq!("current".parse::<RuleVersion>().unwrap(), RuleVersion::current());
        assert_eq!("LATEST".parse::<RuleVersion>().unwrap(), RuleVersion::current());

        let err = "2021-01-01".parse::<RuleVersion>().unwrap_err();
        assert!(matches!(err, RulesError::UnknownRuleVersion(ref s) if s == "2021-01-01"));
    }

    #[test]
    fn test_serde_as_id_string() {
        let json = serde_json::to_string(&RuleVersion::Advanced2023).unwrap();
        assert_eq!(json, "\"2023-10-17\"");
        let back: RuleVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RuleVersion::Advanced2023);
        assert!(serde_json::from_str::<RuleVersion>("\"1999-01-01\"").is_err());
    }

    #[test]
    fn test_tables_per_version() {
        assert_eq!(RuleVersion::Baseline2022.table(true).len(), 1);
        assert_eq!(RuleVersion::Baseline2022.table(false).len(), 1);
        assert_eq!(RuleVersion::Advanced2023.table(true).len(), 4);
        assert_eq!(RuleVersion::Refinement2024.table(false).len(), 1);
        assert!(!RuleVersion::Baseline2022.distinguishes_datacenter());
        assert!(RuleVersion::Baseline2022.uses_interconnect());
    }

    #[test]
    fn test_fingerprints_stable_and_distinct() {
        let a = RuleVersion::Advanced2023.fingerprint_hex();
        assert_eq!(a.len(), 64);
        assert_eq!(a, RuleVersion::Advanced2023.fingerprint_hex());
        // Same thresholds, different id
        assert_ne!(a, RuleVersion::Refinement2024.fingerprint_hex());
        assert_ne!(a, RuleVersion::Baseline2022.fingerprint_hex());
    }

    #[test]
    fn test_record_thresholds() {
        let r = RuleVersion::Baseline2022.record();
        assert_eq!(r.tpp_threshold, 4800.0);
        assert!(r.pd_threshold.is_none());
        assert_eq!(r.interconnect_threshold, Some("600 GB/s"));
        assert_eq!(RuleVersion::current().record().pd_threshold, Some(5.92));
    }
}
