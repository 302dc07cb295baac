//! # ExportLens Rules
//!
//! TPP/PD calculator and U.S. export-control classification engine for AI chips.
//!
//! ## Components
//! - **MetricCalculator**: raw throughput, bit length, sparsity, die area → TPP, PD
//! - **ClassificationEngine**: TPP, PD, datacenter flag, rule version → verdict + ECCN
//! - **RuleVersion**: static history of BIS rule versions, one evaluation table each
//! - **ChipCatalog**: compiled-in reference dataset, classified chip by chip
//! - **ThresholdMap**: catalog chips on the PD/TPP plane
//! - **H200 exception**: January 2026 case-by-case envelope and tariff bands
//!
//! ## Usage
//! ```ignore
//! use exportlens_models::{BitLength, ChipMetrics};
//! use exportlens_rules::{ClassificationEngine, MetricCalculator, RuleVersion};
//!
//! let input = ChipMetrics::dense(1979.0, BitLength::B8, Some(814.0));
//! let metrics = MetricCalculator::compute_metrics(&input);
//! let verdict = ClassificationEngine::classify(&metrics, true, RuleVersion::current());
//! assert_eq!(verdict.eccn.as_deref(), Some("3A090.a.1"));
//! ```
//!
//! The calculator and engine are pure functions over immutable tables. They
//! never fail: "cannot classify" is `ControlStatus::Unknown`.

pub mod bandwidth;
pub mod catalog;
pub mod classification;
pub mod config;
pub mod h200_exception;
pub mod metrics;
pub mod rule_history;
pub mod threshold_map;
pub mod threshold_table;

pub use bandwidth::{parse_bandwidth_gbps, parse_bandwidth_tbps};
pub use catalog::{
    CATALOG_SCHEMA_VERSION, CatalogError, CatalogReport, ChipCatalog, ChipRecord, ChipVerdict,
    SortDirection, SortKey, Source,
};
pub use classification::ClassificationEngine;
pub use config::{ConfigError, EngineConfig, OutputFormat};
pub use h200_exception::{
    H200_VIEW_ALL, H200_VIEW_EXCEPTION, H200Assessment, H200Plot, H200Point, TARIFF_ZONES,
    TariffZone, assess_h200_exception,
};
pub use metrics::MetricCalculator;
pub use rule_history::{RuleRecord, RuleVersion};
pub use threshold_map::{MapPoint, MapRegion, ThresholdMap};
pub use threshold_table::{RuleInput, ThresholdRule};

/// Rule lookup error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("Unknown rule version '{0}' (expected 2022-10-07, 2023-10-17, 2024-12-02 or current)")]
    UnknownRuleVersion(String),
}
