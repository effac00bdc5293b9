//! Quality gate identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the eight quality gates evaluated for every assessment.
///
/// The declaration order is the order in which gate results are reported.
///
/// # Examples
///
/// ```
/// use mg_core::GateKind;
///
/// assert_eq!(GateKind::ALL.len(), 8);
/// assert_eq!(GateKind::Coverage.name(), "CodeCoverage");
/// assert_eq!(GateKind::from_name("security"), Some(GateKind::Security));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Line, critical-path, and branch coverage.
    Coverage,
    /// Cyclomatic complexity.
    Complexity,
    /// Security findings by severity.
    Security,
    /// Mapper latency, error rate, and throughput.
    Performance,
    /// Build success, errors, and warnings.
    Compilation,
    /// Architectural rule violations.
    Architecture,
    /// Recovery behaviour of retry policies.
    Resilience,
    /// Memory growth and gen-2 collections.
    Memory,
}

impl GateKind {
    /// All gates in reporting order.
    pub const ALL: [Self; 8] = [
        Self::Coverage,
        Self::Complexity,
        Self::Security,
        Self::Performance,
        Self::Compilation,
        Self::Architecture,
        Self::Resilience,
        Self::Memory,
    ];

    /// Returns the gate's report name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Coverage => "CodeCoverage",
            Self::Complexity => "Complexity",
            Self::Security => "Security",
            Self::Performance => "Performance",
            Self::Compilation => "Compilation",
            Self::Architecture => "Architecture",
            Self::Resilience => "Resilience",
            Self::Memory => "Memory",
        }
    }

    /// Returns a one-line description of what the gate checks.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Coverage => "Validates code coverage meets minimum thresholds",
            Self::Complexity => "Validates cyclomatic complexity stays within acceptable bounds",
            Self::Security => "Validates security best practices and vulnerability absence",
            Self::Performance => "Validates performance metrics meet acceptable thresholds",
            Self::Compilation => "Validates successful compilation with minimal warnings",
            Self::Architecture => "Validates architectural principles and design patterns",
            Self::Resilience => "Validates error handling and recovery mechanisms",
            Self::Memory => "Validates memory usage and leak prevention",
        }
    }

    /// Looks up a gate by report name or serde name, ignoring ASCII case.
    ///
    /// `"coverage"` and `"CodeCoverage"` both resolve to [`GateKind::Coverage`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("coverage") {
            return Some(Self::Coverage);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// Returns the position of this gate in [`GateKind::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
