//! Control-status verdicts.

use serde::{Deserialize, Serialize};

// =============================================================================
// ControlStatus
// =============================================================================

/// Export-control status of a chip under one rule version.
///
/// `Unknown` means TPP was not available. It is never produced by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    /// License required
    Controlled,
    /// Controlled, but eligible for the NAC/ACA license exceptions
    ControlledEligibleForException,
    /// Below every threshold
    NotControlled,
    /// Not enough input to classify
    Unknown,
}

impl ControlStatus {
    /// All statuses, most restrictive first.
    pub const ALL: [ControlStatus; 4] = [
        ControlStatus::Controlled,
        ControlStatus::ControlledEligibleForException,
        ControlStatus::NotControlled,
        ControlStatus::Unknown,
    ];

    /// Stable machine label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlStatus::Controlled => "controlled",
            ControlStatus::ControlledEligibleForException => "controlled_eligible_for_exception",
            ControlStatus::NotControlled => "not_controlled",
            ControlStatus::Unknown => "unknown",
        }
    }

    /// Human-readable badge text.
    pub fn label(&self) -> &'static str {
        match self {
            ControlStatus::Controlled => "Controlled",
            ControlStatus::ControlledEligibleForException => "NAC/ACA Eligible",
            ControlStatus::NotControlled => "Not Controlled",
            ControlStatus::Unknown => "Unknown",
        }
    }

    /// Any form of control applies (with or without exception eligibility).
    pub fn is_controlled(&self) -> bool {
        matches!(
            self,
            ControlStatus::Controlled | ControlStatus::ControlledEligibleForException
        )
    }
}

impl std::fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Result of classifying one chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub status: ControlStatus,

    /// ECCN subsection cited by the matching rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eccn: Option<String>,

    /// Label of the rule that matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_tier: Option<String>,
}

impl Classification {
    /// Insufficient input.
    pub fn unknown() -> Self {
        Self {
            status: ControlStatus::Unknown,
            eccn: None,
            matched_tier: None,
        }
    }

    /// No rule matched.
    pub fn not_controlled() -> Self {
        Self {
            status: ControlStatus::NotControlled,
            eccn: None,
            matched_tier: None,
        }
    }

    /// A rule matched.
    pub fn matched(status: ControlStatus, tier: &str, eccn: Option<&str>) -> Self {
        Self {
            status,
            eccn: eccn.map(str::to_string),
            matched_tier: Some(tier.to_string()),
        }
    }

    /// ECCN text for display, `—` when none applies.
    pub fn eccn_display(&self) -> &str {
        self.eccn.as_deref().unwrap_or("—")
    }
}
