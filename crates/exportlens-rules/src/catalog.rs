//! Chip Catalog — the static reference dataset.
//!
//! The built-in catalog is compiled in from `data/chips.json`. An external
//! file with the same schema can be loaded instead (see [`ChipCatalog::load`]).
//!
//! ## Validation
//! 1. schema_version == "1.0.0"
//! 2. Names non-empty and unique (ignoring ASCII case)
//! 3. tpp / die_area / pd finite and non-negative when present
//! 4. Published PD within 2 % of TPP ÷ die area when all three are present
//!
//! Classification is per chip and independent; [`ChipCatalog::classify_all`]
//! is a convenience over the engine, not a separate rule path.

use crate::bandwidth::{parse_bandwidth_gbps, parse_bandwidth_tbps};
use crate::classification::ClassificationEngine;
use crate::metrics::from_published;
use crate::rule_history::RuleVersion;
use chrono::{DateTime, Utc};
use exportlens_models::{Classification, ControlStatus, DerivedMetrics};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Schema version for the catalog file format.
pub const CATALOG_SCHEMA_VERSION: &str = "1.0.0";

/// Maximum relative gap between published and derived PD.
pub const PD_TOLERANCE: f64 = 0.02;

const BUILTIN_CATALOG: &str = include_str!("../data/chips.json");

// =============================================================================
// ChipRecord
// =============================================================================

/// Citation for a catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// One chip in the catalog.
///
/// Every numeric field may be absent when the figure is not public.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipRecord {
    pub name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub release_date: String,

    // === Regulatory metrics ===
    #[serde(default)]
    pub tpp: Option<f64>,
    /// mm²
    #[serde(default)]
    pub die_area: Option<f64>,
    #[serde(default)]
    pub pd: Option<f64>,

    // === Datasheet text ===
    #[serde(default)]
    pub hbm_capacity: Option<String>,
    #[serde(default)]
    pub memory_bandwidth: Option<String>,
    #[serde(default)]
    pub tdp: Option<String>,
    #[serde(default)]
    pub interconnect: Option<String>,

    #[serde(default = "default_true")]
    pub datacenter_marketed: bool,

    /// Status as published alongside the data (free text)
    #[serde(default)]
    pub status_label: String,
    /// ECCN as published (free text)
    #[serde(default)]
    pub eccn: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

fn default_true() -> bool { true }

impl ChipRecord {
    /// TPP and PD for classification.
    pub fn metrics(&self) -> DerivedMetrics {
        from_published(self.tpp, self.die_area, self.pd)
    }

    /// Interconnect bandwidth in GB/s, if the published text is numeric.
    pub fn interconnect_gbps(&self) -> Option<f64> {
        self.interconnect.as_deref().and_then(parse_bandwidth_gbps)
    }

    /// Memory bandwidth in TB/s, if the published text is numeric.
    pub fn memory_bandwidth_tbps(&self) -> Option<f64> {
        self.memory_bandwidth.as_deref().and_then(parse_bandwidth_tbps)
    }

    /// Classify this chip under `rule_version`.
    pub fn classify(&self, rule_version: RuleVersion) -> Classification {
        ClassificationEngine::classify_with_interconnect(
            &self.metrics(),
            self.datacenter_marketed,
            self.interconnect_gbps(),
            rule_version,
        )
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Column to sort the catalog by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Tpp,
    Pd,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

fn compare(a: &ChipRecord, b: &ChipRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Status => a.status_label.cmp(&b.status_label),
        // Missing figures sort as zero
        SortKey::Tpp => a.tpp.unwrap_or(0.0).total_cmp(&b.tpp.unwrap_or(0.0)),
        SortKey::Pd => a.pd.unwrap_or(0.0).total_cmp(&b.pd.unwrap_or(0.0)),
    }
}

// =============================================================================
// ChipCatalog
// =============================================================================

/// The chip dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipCatalog {
    pub schema_version: String,
    /// Date the data was last reviewed
    #[serde(default)]
    pub updated: String,
    pub chips: Vec<ChipRecord>,
}

impl ChipCatalog {
    /// The compiled-in catalog, validated.
    pub fn builtin() -> Result<Self, CatalogError> {
        let catalog = Self::from_json(BUILTIN_CATALOG, Path::new("<builtin>"))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let catalog = Self::from_json(&content, path)?;
        catalog.validate()?;
        info!(path = %path.display(), chips = catalog.len(), "loaded chip catalog");
        Ok(catalog)
    }

    /// Parse a catalog from JSON (schema version checked, not validated).
    pub fn from_json(json: &str, path: &Path) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json).map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        if catalog.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                path: path.to_path_buf(),
                expected: CATALOG_SCHEMA_VERSION.to_string(),
                found: catalog.schema_version.clone(),
            });
        }

        Ok(catalog)
    }

    /// Validate catalog integrity.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();

        for chip in &self.chips {
            if chip.name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            // Lookup by name is case-insensitive
            if !seen.insert(chip.name.to_ascii_lowercase()) {
                return Err(CatalogError::DuplicateName {
                    name: chip.name.clone(),
                });
            }

            for (field, value) in [("tpp", chip.tpp), ("die_area", chip.die_area), ("pd", chip.pd)] {
                if let Some(v) = value {
                    if !v.is_finite() || v < 0.0 {
                        return Err(CatalogError::InvalidNumber {
                            chip: chip.name.clone(),
                            field: field.to_string(),
                            value: v,
                        });
                    }
                }
            }

            if let (Some(tpp), Some(area), Some(pd)) = (chip.tpp, chip.die_area, chip.pd) {
                if area > 0.0 {
                    let derived = tpp / area;
                    if derived > 0.0 && ((pd - derived) / derived).abs() > PD_TOLERANCE {
                        return Err(CatalogError::InconsistentPd {
                            chip: chip.name.clone(),
                            published: pd,
                            derived,
                        });
                    }
                }
            }
        }

        debug!(chips = self.chips.len(), "catalog validated");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }

    /// Find a chip by exact name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ChipRecord> {
        self.chips.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Chips ordered by `key`.
    pub fn sorted_by(&self, key: SortKey, direction: SortDirection) -> Vec<&ChipRecord> {
        let mut chips: Vec<&ChipRecord> = self.chips.iter().collect();
        chips.sort_by(|a, b| {
            let ord = compare(a, b, key);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        chips
    }

    /// Classify every chip under `rule_version`.
    pub fn classify_all(&self, rule_version: RuleVersion) -> CatalogReport {
        let verdicts: Vec<ChipVerdict> = self
            .chips
            .iter()
            .map(|chip| ChipVerdict {
                name: chip.name.clone(),
                metrics: chip.metrics(),
                classification: chip.classify(rule_version),
            })
            .collect();

        let report = CatalogReport::new(rule_version, verdicts);

        info!(
            rule = %rule_version,
            chips = report.verdicts.len(),
            controlled = report.count(ControlStatus::Controlled),
            eligible = report.count(ControlStatus::ControlledEligibleForException),
            not_controlled = report.count(ControlStatus::NotControlled),
            unknown = report.count(ControlStatus::Unknown),
            "catalog classified"
        );

        report
    }
}

// =============================================================================
// CatalogReport
// =============================================================================

/// Verdict for one catalog chip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChipVerdict {
    pub name: String,
    pub metrics: DerivedMetrics,
    pub classification: Classification,
}

/// Verdicts for a whole catalog under one rule version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogReport {
    pub rule_version: RuleVersion,
    /// Fingerprint of the rule tables the verdicts were computed against
    pub rule_fingerprint: String,
    pub generated_at: DateTime<Utc>,
    pub verdicts: Vec<ChipVerdict>,
}

impl CatalogReport {
    fn new(rule_version: RuleVersion, verdicts: Vec<ChipVerdict>) -> Self {
        Self {
            rule_version,
            rule_fingerprint: rule_version.fingerprint_hex(),
            generated_at: Utc::now(),
            verdicts,
        }
    }

    /// Number of chips with `status`.
    pub fn count(&self, status: ControlStatus) -> usize {
        self.verdicts
            .iter()
            .filter(|v| v.classification.status == status)
            .count()
    }

    /// Verdict for a named chip.
    pub fn get(&self, name: &str) -> Option<&ChipVerdict> {
        self.verdicts.iter().find(|v| v.name == name)
    }
}

// =============================================================================
// Catalog Errors
// =============================================================================

/// Errors from catalog loading and validation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error loading catalog from {path}: {error}")]
    Io {
        path: std::path::PathBuf,
        error: String,
    },

    #[error("Parse error in catalog {path}: {error}")]
    Parse {
        path: std::path::PathBuf,
        error: String,
    },

    #[error("Unsupported catalog version in {path}: expected {expected}, found {found}")]
    UnsupportedVersion {
        path: std::path::PathBuf,
        expected: String,
        found: String,
    },

    #[error("Chip with empty name in catalog")]
    EmptyName,

    #[error("Duplicate chip name '{name}'")]
    DuplicateName { name: String },

    #[error("Invalid {field} for '{chip}': {value}")]
    InvalidNumber {
        chip: String,
        field: String,
        value: f64,
    },

    #[error("Published PD {published} for '{chip}' disagrees with TPP / die area = {derived:.3}")]
    InconsistentPd {
        chip: String,
        published: f64,
        derived: f64,
    },
}

// =============================================================================
// Tests
// =============================================================================
