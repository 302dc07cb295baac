//! exportlens CLI — AI chip export-control reference tool.
//!
//! ## Usage
//!
//! ```bash
//! # TPP/PD calculator with verdict under the current rule
//! exportlens calc --throughput 1979 --bit-length 8 --die-area 814
//!
//! # Sparse figure, consumer part, Oct 2023 rule
//! exportlens calc --throughput 1321 --sparse --non-datacenter --rule 2023-10-17
//!
//! # Classify the built-in catalog, sorted by PD
//! exportlens catalog --sort pd
//!
//! # One chip under every rule version
//! exportlens chip "NVIDIA H800"
//!
//! # Rule history, threshold map, H200 exception
//! exportlens history
//! exportlens map --max-tpp 6000 --max-pd 10
//! exportlens h200
//! ```
//!
//! ## Exit Codes
//! - 0: Success
//! - 2: Error (bad arguments, unreadable config or catalog, unknown chip)

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use exportlens_models::{BitLength, ChipMetrics, Classification};
use exportlens_rules::{
    ChipCatalog, ClassificationEngine, EngineConfig, H200_VIEW_ALL, H200_VIEW_EXCEPTION, H200Plot,
    H200Point, MetricCalculator, OutputFormat, RuleVersion, SortDirection, SortKey, ThresholdMap,
    parse_bandwidth_gbps, parse_bandwidth_tbps,
};
use tracing::info;
use tracing::level_filters::LevelFilter;

/// Log level when `RUST_LOG` is unset; catalog summaries log at INFO.
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

/// exportlens: AI chip export-control reference tool.
#[derive(Parser)]
#[command(name = "exportlens")]
#[command(version)]
#[command(about = "TPP/PD calculator and BIS export-control classifier for AI chips")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(long, global = true)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute TPP/PD from raw figures and classify
    Calc {
        /// Peak throughput (TFLOPS or TOPS) at the given bit length
        #[arg(long, short = 't')]
        throughput: f64,

        /// Operand bit length (4, 8, 16, 32, 64)
        #[arg(long, short = 'b', default_value = "8")]
        bit_length: BitLength,

        /// Throughput is a sparse figure (halved before use)
        #[arg(long)]
        sparse: bool,

        /// Applicable logic die area in mm²
        #[arg(long, short = 'a')]
        die_area: Option<f64>,

        /// Chip is designed or marketed for datacenters (overrides config)
        #[arg(long, conflicts_with = "non_datacenter")]
        datacenter: bool,

        /// Chip is not designed or marketed for datacenters (overrides config)
        #[arg(long)]
        non_datacenter: bool,

        /// Interconnect bandwidth, e.g. "600 GB/s" (2022 rule only)
        #[arg(long)]
        interconnect: Option<String>,

        /// Rule version id or "current"
        #[arg(long, short = 'r')]
        rule: Option<RuleVersion>,
    },

    /// Classify every chip in the catalog
    Catalog {
        #[arg(long, short = 'r')]
        rule: Option<RuleVersion>,

        /// Sort column
        #[arg(long, short = 's', value_enum, default_value = "tpp")]
        sort: SortKey,

        /// Ascending order (default descending)
        #[arg(long)]
        asc: bool,
    },

    /// Show one catalog chip under every rule version
    Chip {
        /// Chip name (case-insensitive)
        name: String,
    },

    /// List rule versions, newest first
    History,

    /// Plot catalog chips on the PD/TPP threshold map
    Map {
        #[arg(long, default_value = "110000")]
        max_tpp: f64,

        #[arg(long, default_value = "70")]
        max_pd: f64,
    },

    /// Check the January 2026 H200 exception envelope
    H200 {
        /// TPP of an ad-hoc point (catalog chips are listed if omitted)
        #[arg(long)]
        tpp: Option<f64>,

        /// Memory bandwidth of the ad-hoc point, e.g. "4.8 TB/s"
        #[arg(long)]
        mem_bw: Option<String>,

        /// Zoom to the exception envelope instead of the full range
        #[arg(long)]
        zoom: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(DEFAULT_LOG_LEVEL.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_toml(path)?,
        None => EngineConfig::default(),
    };
    let format = cli.format.unwrap_or(config.output);

    match cli.command {
        Commands::Calc {
            throughput,
            bit_length,
            sparse,
            die_area,
            datacenter,
            non_datacenter,
            interconnect,
            rule,
        } => {
            if !throughput.is_finite() || throughput < 0.0 {
                bail!("throughput must be a finite, non-negative number");
            }
            if let Some(area) = die_area {
                if !area.is_finite() || area < 0.0 {
                    bail!("die area must be a finite, non-negative number");
                }
            }
            let explicit = match (datacenter, non_datacenter) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let input = ChipMetrics {
                peak_throughput: Some(throughput),
                bit_length,
                is_sparse: sparse,
                die_area,
                is_datacenter_marketed: config.resolve_datacenter(explicit),
            };
            let interconnect_gbps = match interconnect.as_deref() {
                Some(text) => Some(
                    parse_bandwidth_gbps(text)
                        .with_context(|| format!("cannot parse interconnect bandwidth '{}'", text))?,
                ),
                None => None,
            };
            run_calc(&input, interconnect_gbps, rule.unwrap_or(config.rule_version), format)
        }
        Commands::Catalog { rule, sort, asc } => {
            let catalog = load_catalog(&config)?;
            let direction = if asc { SortDirection::Asc } else { SortDirection::Desc };
            run_catalog(&catalog, rule.unwrap_or(config.rule_version), sort, direction, format)
        }
        Commands::Chip { name } => {
            let catalog = load_catalog(&config)?;
            run_chip(&catalog, &name, format)
        }
        Commands::History => run_history(format),
        Commands::Map { max_tpp, max_pd } => {
            let catalog = load_catalog(&config)?;
            run_map(&catalog, max_tpp, max_pd, format)
        }
        Commands::H200 { tpp, mem_bw, zoom } => {
            let catalog = load_catalog(&config)?;
            let view = if zoom { H200_VIEW_EXCEPTION } else { H200_VIEW_ALL };
            run_h200(&catalog, tpp, mem_bw.as_deref(), view, format)
        }
    }
}

fn load_catalog(config: &EngineConfig) -> Result<ChipCatalog> {
    let catalog = match &config.catalog_path {
        Some(path) => ChipCatalog::load(path)?,
        None => ChipCatalog::builtin()?,
    };
    Ok(catalog)
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "—".to_string(),
    }
}

fn verdict_line(c: &Classification) -> String {
    match &c.matched_tier {
        Some(tier) => format!("{} [{} / {}]", c.status, tier, c.eccn_display()),
        None => c.status.to_string(),
    }
}

// =============================================================================
// Subcommands
// =============================================================================

fn run_calc(
    input: &ChipMetrics,
    interconnect_gbps: Option<f64>,
    rule: RuleVersion,
    format: OutputFormat,
) -> Result<()> {
    let metrics = MetricCalculator::compute_metrics(input);
    let classification = ClassificationEngine::classify_with_interconnect(
        &metrics,
        input.is_datacenter_marketed,
        interconnect_gbps,
        rule,
    );

    info!(rule = %rule, status = %classification.status, "calc complete");

    match format {
        OutputFormat::Text => {
            let dense = if input.is_sparse { "(TFLOPS ÷ 2)" } else { "TFLOPS" };
            println!("Formula: TPP = {} × {}", dense, input.bit_length);
            println!("  TPP: {}", fmt_opt(metrics.tpp(), 0));
            println!("  PD:  {}", fmt_opt(metrics.pd(), 2));
            println!(
                "  Datacenter-marketed: {}",
                if input.is_datacenter_marketed { "yes" } else { "no" }
            );
            println!("\nRule {}: {}", rule, verdict_line(&classification));
            if !metrics.is_known() {
                println!("  Enter a positive throughput to classify.");
            }
        }
        OutputFormat::Json => {
            let out = serde_json::json!({
                "rule_version": rule,
                "metrics": metrics,
                "classification": classification,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn run_catalog(
    catalog: &ChipCatalog,
    rule: RuleVersion,
    sort: SortKey,
    direction: SortDirection,
    format: OutputFormat,
) -> Result<()> {
    let report = catalog.classify_all(rule);

    match format {
        OutputFormat::Text => {
            println!("Rule {} ({})", rule, &report.rule_fingerprint[..12]);
            println!(
                "{:<26} {:>8} {:>7} {:>12}  {}",
                "Chip", "TPP", "PD", "Interconnect", "Verdict"
            );
            for chip in catalog.sorted_by(sort, direction) {
                let Some(v) = report.get(&chip.name) else { continue };
                println!(
                    "{:<26} {:>8} {:>7} {:>12}  {}",
                    chip.name,
                    fmt_opt(v.metrics.tpp(), 0),
                    fmt_opt(v.metrics.pd(), 2),
                    chip.interconnect.as_deref().unwrap_or("—"),
                    verdict_line(&v.classification),
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn run_chip(catalog: &ChipCatalog, name: &str, format: OutputFormat) -> Result<()> {
    let Some(chip) = catalog.get(name) else {
        bail!("no chip named '{}' in catalog", name);
    };

    let verdicts: Vec<(RuleVersion, Classification)> = RuleVersion::ALL
        .into_iter()
        .map(|v| (v, chip.classify(v)))
        .collect();

    match format {
        OutputFormat::Text => {
            println!("{}", chip.name);
            println!(
                "  {} · {} · Released {}",
                chip.manufacturer, chip.architecture, chip.release_date
            );
            println!(
                "  TPP: {}  PD: {}  Die area: {} mm²",
                fmt_opt(chip.tpp, 0),
                fmt_opt(chip.pd, 2),
                fmt_opt(chip.die_area, 0),
            );
            println!(
                "  Memory BW: {}  Interconnect: {}  TDP: {}",
                chip.memory_bandwidth.as_deref().unwrap_or("—"),
                chip.interconnect.as_deref().unwrap_or("—"),
                chip.tdp.as_deref().unwrap_or("—"),
            );
            println!("  Published status: {}", chip.status_label);
            if !chip.notes.is_empty() {
                println!("  Notes: {}", chip.notes);
            }
            println!();
            for (v, c) in &verdicts {
                println!("  {}: {}", v, verdict_line(c));
            }
        }
        OutputFormat::Json => {
            let by_rule: Vec<serde_json::Value> = verdicts
                .iter()
                .map(|(v, c)| serde_json::json!({ "rule_version": v, "classification": c }))
                .collect();
            let out = serde_json::json!({ "chip": chip, "verdicts": by_rule });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn run_history(format: OutputFormat) -> Result<()> {
    let current = RuleVersion::current();

    match format {
        OutputFormat::Text => {
            for v in RuleVersion::ALL {
                let r = v.record();
                let marker = if v == current { " (current)" } else { "" };
                println!("{}{}", v.effective_date().format("%B %-d, %Y"), marker);
                println!("  {}", r.citation);
                println!("  TPP threshold: {}", r.tpp_threshold);
                if let Some(pd) = r.pd_threshold {
                    println!("  PD threshold: {}", pd);
                }
                if let Some(ic) = r.interconnect_threshold {
                    println!("  Interconnect threshold: {}", ic);
                }
                println!("  {}", r.summary);
                println!("  {}", r.url);
                println!("  Fingerprint: {}\n", v.fingerprint_hex());
            }
        }
        OutputFormat::Json => {
            let out: Vec<serde_json::Value> = RuleVersion::ALL
                .into_iter()
                .map(|v| {
                    let r = v.record();
                    serde_json::json!({
                        "id": v,
                        "current": v == current,
                        "citation": r.citation,
                        "tpp_threshold": r.tpp_threshold,
                        "pd_threshold": r.pd_threshold,
                        "interconnect_threshold": r.interconnect_threshold,
                        "url": r.url,
                        "fingerprint": v.fingerprint_hex(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn run_map(catalog: &ChipCatalog, max_tpp: f64, max_pd: f64, format: OutputFormat) -> Result<()> {
    let map = ThresholdMap::from_catalog(catalog);

    match format {
        OutputFormat::Text => {
            println!(
                "Showing {} of {} chips (TPP <= {}, PD <= {})",
                map.visible(max_tpp, max_pd),
                map.points.len(),
                max_tpp,
                max_pd
            );
            for stack in map.stacks() {
                let Some(first) = stack.first() else { continue };
                let names: Vec<&str> = stack.iter().map(|p| p.name.as_str()).collect();
                println!(
                    "  ({:>7.0}, {:>5.2}) {:?}: {}",
                    first.tpp,
                    first.pd,
                    first.region,
                    names.join(", ")
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }
    Ok(())
}

fn run_h200(
    catalog: &ChipCatalog,
    tpp: Option<f64>,
    mem_bw: Option<&str>,
    (max_tpp, max_mem_bw): (f64, f64),
    format: OutputFormat,
) -> Result<()> {
    let plot = match (tpp, mem_bw) {
        (None, None) => H200Plot::from_catalog(catalog),
        (Some(tpp), Some(text)) => {
            let bw = parse_bandwidth_tbps(text)
                .with_context(|| format!("cannot parse memory bandwidth '{}'", text))?;
            let Some(point) = H200Point::new("(input)", tpp, bw) else {
                bail!("TPP and memory bandwidth must be finite numbers");
            };
            H200Plot { points: vec![point] }
        }
        _ => bail!("--tpp and --mem-bw must be given together"),
    };

    match format {
        OutputFormat::Text => {
            println!(
                "Showing {} of {} chips (TPP <= {}, memory BW <= {} TB/s)",
                plot.visible(max_tpp, max_mem_bw),
                plot.points.len(),
                max_tpp,
                max_mem_bw
            );
            for stack in plot.stacks() {
                let Some(first) = stack.first() else { continue };
                let a = first.assessment;
                let names: Vec<&str> = stack.iter().map(|p| p.name.as_str()).collect();
                println!(
                    "  ({:>7.0}, {:>4.1} TB/s) {}{}: {}",
                    first.tpp,
                    first.mem_bw_tbps,
                    if a.within_exception { "case-by-case eligible" } else { "outside exception" },
                    if a.tariff_zone { ", 25% tariff zone" } else { "" },
                    names.join(", ")
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plot)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level_shows_info() {
        assert_eq!(DEFAULT_LOG_LEVEL, LevelFilter::INFO);
        assert!(tracing::Level::INFO <= DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_datacenter_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "exportlens", "calc", "-t", "100", "--datacenter", "--non-datacenter",
        ]);
        assert!(parsed.is_err());
    }
}
