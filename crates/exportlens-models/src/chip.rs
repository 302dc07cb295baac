//! Chip performance inputs and derived regulatory metrics.
//!
//! ## Metrics
//! - **TPP** (Total Processing Performance): dense throughput × operand bit length
//! - **PD** (Performance Density): TPP ÷ applicable logic die area (mm²)
//!
//! PD is strictly derived from TPP. A [`DerivedMetrics`] value never carries a
//! PD without a TPP; the constructors and deserialization enforce this.

use serde::{Deserialize, Serialize};

// =============================================================================
// BitLength — operand width
// =============================================================================

/// Operand bit width of the quoted throughput figure.
///
/// Serialized as the plain integer (`4`, `8`, `16`, `32`, `64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BitLength {
    B4,
    B8,
    B16,
    B32,
    B64,
}

impl BitLength {
    /// All supported widths, narrowest first.
    pub const ALL: [BitLength; 5] = [
        BitLength::B4,
        BitLength::B8,
        BitLength::B16,
        BitLength::B32,
        BitLength::B64,
    ];

    /// Width in bits.
    pub fn bits(self) -> u8 {
        match self {
            BitLength::B4 => 4,
            BitLength::B8 => 8,
            BitLength::B16 => 16,
            BitLength::B32 => 32,
            BitLength::B64 => 64,
        }
    }

    /// TPP multiplier for this width.
    pub fn multiplier(self) -> f64 {
        f64::from(self.bits())
    }
}

impl Default for BitLength {
    /// 8-bit is the width most datasheets quote their headline dense figure at.
    fn default() -> Self {
        BitLength::B8
    }
}

impl std::fmt::Display for BitLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// A bit length outside {4, 8, 16, 32, 64}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported bit length {0} (expected 4, 8, 16, 32 or 64)")]
pub struct InvalidBitLength(pub u8);

impl TryFrom<u8> for BitLength {
    type Error = InvalidBitLength;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(BitLength::B4),
            8 => Ok(BitLength::B8),
            16 => Ok(BitLength::B16),
            32 => Ok(BitLength::B32),
            64 => Ok(BitLength::B64),
            other => Err(InvalidBitLength(other)),
        }
    }
}

impl From<BitLength> for u8 {
    fn from(value: BitLength) -> Self {
        value.bits()
    }
}

impl std::str::FromStr for BitLength {
    type Err = InvalidBitLength;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits: u8 = s.trim().parse().map_err(|_| InvalidBitLength(0))?;
        BitLength::try_from(bits)
    }
}

// =============================================================================
// ChipMetrics — calculator input
// =============================================================================

/// Raw performance figures for one chip, as supplied by a caller.
///
/// Numeric fields are expected to be finite and non-negative. Rejecting bad
/// user text is the caller's job; the calculator only maps missing or
/// non-positive figures to "absent".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChipMetrics {
    /// Vendor-reported TFLOPS/TOPS at `bit_length`
    #[serde(default)]
    pub peak_throughput: Option<f64>,

    /// Operand width of `peak_throughput`
    #[serde(default)]
    pub bit_length: BitLength,

    /// Throughput is a sparse figure (halved before use)
    #[serde(default)]
    pub is_sparse: bool,

    /// Applicable logic die area in mm²
    #[serde(default)]
    pub die_area: Option<f64>,

    /// Designed or marketed for datacenter use
    #[serde(default)]
    pub is_datacenter_marketed: bool,
}

impl ChipMetrics {
    /// Dense metrics for a datacenter part.
    pub fn dense(peak_throughput: f64, bit_length: BitLength, die_area: Option<f64>) -> Self {
        Self {
            peak_throughput: Some(peak_throughput),
            bit_length,
            is_sparse: false,
            die_area,
            is_datacenter_marketed: true,
        }
    }

    /// Mark the throughput figure as sparse.
    pub fn sparse(mut self) -> Self {
        self.is_sparse = true;
        self
    }

    /// Set the datacenter-marketed flag.
    pub fn with_datacenter(mut self, datacenter: bool) -> Self {
        self.is_datacenter_marketed = datacenter;
        self
    }
}

// =============================================================================
// DerivedMetrics — calculator output
// =============================================================================

/// TPP and PD for one chip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawDerivedMetrics")]
pub struct DerivedMetrics {
    tpp: Option<f64>,
    pd: Option<f64>,
}

/// Wire shape of [`DerivedMetrics`]; decoding goes through `from_parts`.
#[derive(Deserialize)]
struct RawDerivedMetrics {
    #[serde(default)]
    tpp: Option<f64>,
    #[serde(default)]
    pd: Option<f64>,
}

impl From<RawDerivedMetrics> for DerivedMetrics {
    fn from(raw: RawDerivedMetrics) -> Self {
        DerivedMetrics::from_parts(raw.tpp, raw.pd)
    }
}

impl DerivedMetrics {
    /// Neither metric could be computed.
    pub const UNKNOWN: DerivedMetrics = DerivedMetrics { tpp: None, pd: None };

    /// Build from a TPP and an optional PD.
    pub fn new(tpp: f64, pd: Option<f64>) -> Self {
        Self { tpp: Some(tpp), pd }
    }

    /// TPP only; PD unknown.
    pub fn tpp_only(tpp: f64) -> Self {
        Self { tpp: Some(tpp), pd: None }
    }

    /// Build from optional parts. A PD without a TPP is dropped.
    pub fn from_parts(tpp: Option<f64>, pd: Option<f64>) -> Self {
        match tpp {
            Some(tpp) => Self { tpp: Some(tpp), pd },
            None => Self::UNKNOWN,
        }
    }

    /// Total Processing Performance.
    pub fn tpp(&self) -> Option<f64> {
        self.tpp
    }

    /// Performance Density.
    pub fn pd(&self) -> Option<f64> {
        self.pd
    }

    /// TPP is available, so the chip can be classified.
    pub fn is_known(&self) -> bool {
        self.tpp.is_some()
    }
}
