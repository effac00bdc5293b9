//! Configuration structures for mapgate.
//!
//! - [`QualityGateConfiguration`] - thresholds for the eight quality gates
//! - [`GatePolicies`] - what each gate reports when its input data is absent
//! - [`PerformanceTargets`] - per-mapper latency and error-rate targets
//! - [`Config`] - root configuration combining all settings
//!
//! Every struct is `#[serde(default)]`, so a partial JSON file only needs the
//! values it overrides.

use std::fs;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::GateKind;

/// What a gate reports when the assessment carries no data for it.
///
/// # Examples
///
/// ```
/// use mg_core::MissingDataPolicy;
///
/// assert_eq!(MissingDataPolicy::FailClosed.outcome(), (0.0, false));
/// assert_eq!(MissingDataPolicy::baseline(85.0).outcome(), (85.0, true));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MissingDataPolicy {
    /// Score 0, gate fails.
    FailClosed,
    /// Report the given score and pass.
    Baseline {
        /// Score reported in place of an evaluation, in [0, 100].
        score: f64,
    },
}

impl MissingDataPolicy {
    /// Creates a [`MissingDataPolicy::Baseline`] policy.
    #[inline]
    #[must_use]
    pub const fn baseline(score: f64) -> Self {
        Self::Baseline { score }
    }

    /// Returns the `(score, passed)` pair this policy produces.
    #[inline]
    #[must_use]
    pub const fn outcome(self) -> (f64, bool) {
        match self {
            Self::FailClosed => (0.0, false),
            Self::Baseline { score } => (score, true),
        }
    }
}

/// Per-gate [`MissingDataPolicy`] table.
///
/// Gates whose verdict is meaningless without measurements fail closed. The
/// architecture, resilience, and memory gates report a passing baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatePolicies {
    /// Policy for the coverage gate.
    pub coverage: MissingDataPolicy,
    /// Policy for the complexity gate.
    pub complexity: MissingDataPolicy,
    /// Policy for the security gate.
    pub security: MissingDataPolicy,
    /// Policy for the performance gate.
    pub performance: MissingDataPolicy,
    /// Policy for the compilation gate.
    pub compilation: MissingDataPolicy,
    /// Policy for the architecture gate.
    pub architecture: MissingDataPolicy,
    /// Policy for the resilience gate.
    pub resilience: MissingDataPolicy,
    /// Policy for the memory gate.
    pub memory: MissingDataPolicy,
}

impl Default for GatePolicies {
    fn default() -> Self {
        Self {
            coverage: MissingDataPolicy::FailClosed,
            complexity: MissingDataPolicy::FailClosed,
            security: MissingDataPolicy::FailClosed,
            performance: MissingDataPolicy::FailClosed,
            compilation: MissingDataPolicy::FailClosed,
            architecture: MissingDataPolicy::baseline(85.0),
            resilience: MissingDataPolicy::baseline(80.0),
            memory: MissingDataPolicy::baseline(75.0),
        }
    }
}

impl GatePolicies {
    /// Every gate fails closed.
    #[must_use]
    pub const fn fail_closed() -> Self {
        Self {
            coverage: MissingDataPolicy::FailClosed,
            complexity: MissingDataPolicy::FailClosed,
            security: MissingDataPolicy::FailClosed,
            performance: MissingDataPolicy::FailClosed,
            compilation: MissingDataPolicy::FailClosed,
            architecture: MissingDataPolicy::FailClosed,
            resilience: MissingDataPolicy::FailClosed,
            memory: MissingDataPolicy::FailClosed,
        }
    }

    /// Returns the policy for `kind`.
    #[must_use]
    pub const fn get(&self, kind: GateKind) -> MissingDataPolicy {
        match kind {
            GateKind::Coverage => self.coverage,
            GateKind::Complexity => self.complexity,
            GateKind::Security => self.security,
            GateKind::Performance => self.performance,
            GateKind::Compilation => self.compilation,
            GateKind::Architecture => self.architecture,
            GateKind::Resilience => self.resilience,
            GateKind::Memory => self.memory,
        }
    }

    /// Replaces the policy for `kind`.
    pub fn set(&mut self, kind: GateKind, policy: MissingDataPolicy) {
        let slot = match kind {
            GateKind::Coverage => &mut self.coverage,
            GateKind::Complexity => &mut self.complexity,
            GateKind::Security => &mut self.security,
            GateKind::Performance => &mut self.performance,
            GateKind::Compilation => &mut self.compilation,
            GateKind::Architecture => &mut self.architecture,
            GateKind::Resilience => &mut self.resilience,
            GateKind::Memory => &mut self.memory,
        };
        *slot = policy;
    }
}

/// Thresholds for the eight quality gates.
///
/// Rates and coverage values are fractions in [0, 1].
///
/// # Examples
///
/// ```
/// use mg_core::QualityGateConfiguration;
///
/// let config = QualityGateConfiguration::default();
/// assert!((config.min_overall_coverage - 0.80).abs() < f64::EPSILON);
///
/// let strict = QualityGateConfiguration::strict();
/// assert_eq!(strict.max_high_severity_security_issues, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGateConfiguration {
    /// Minimum overall line coverage.
    pub min_overall_coverage: f64,
    /// Minimum coverage of critical paths.
    pub min_critical_path_coverage: f64,
    /// Minimum branch coverage.
    pub min_branch_coverage: f64,

    /// Maximum share of methods that may exceed the complexity threshold.
    pub max_complexity_violation_rate: f64,
    /// Maximum average cyclomatic complexity.
    pub max_average_complexity: f64,

    /// Maximum number of high-severity security findings. Critical findings always fail.
    pub max_high_severity_security_issues: u32,

    /// Maximum mean of the mappers' average response times, in milliseconds.
    pub max_average_response_time_ms: f64,
    /// Maximum error rate of any single mapper.
    pub max_error_rate: f64,
    /// Minimum throughput of any single mapper, in operations per second.
    pub min_throughput_per_second: f64,

    /// Maximum number of compiler warnings.
    pub max_compilation_warnings: u32,

    /// Maximum number of architectural rule violations.
    pub max_architecture_violations: u32,

    /// Minimum share of failure scenarios a retry policy must recover from.
    pub min_resilience_recovery_rate: f64,

    /// Maximum memory growth over a run, in megabytes.
    pub max_memory_growth_mb: f64,
    /// Maximum number of gen-2 garbage collections over a run.
    pub max_gen2_collections: u32,

    /// Behaviour of each gate when its data is absent.
    pub missing_data: GatePolicies,
}

impl Default for QualityGateConfiguration {
    fn default() -> Self {
        Self {
            min_overall_coverage: 0.80,
            min_critical_path_coverage: 0.90,
            min_branch_coverage: 0.75,
            max_complexity_violation_rate: 0.05,
            max_average_complexity: 8.0,
            max_high_severity_security_issues: 2,
            max_average_response_time_ms: 2.0,
            max_error_rate: 0.01,
            min_throughput_per_second: 500.0,
            max_compilation_warnings: 10,
            max_architecture_violations: 5,
            min_resilience_recovery_rate: 0.95,
            max_memory_growth_mb: 10.0,
            max_gen2_collections: 5,
            missing_data: GatePolicies::default(),
        }
    }
}

impl QualityGateConfiguration {
    /// Tighter thresholds for release branches.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            min_overall_coverage: 0.90,
            min_critical_path_coverage: 0.95,
            min_branch_coverage: 0.85,
            max_complexity_violation_rate: 0.02,
            max_average_complexity: 6.0,
            max_high_severity_security_issues: 0,
            max_average_response_time_ms: 1.0,
            max_error_rate: 0.005,
            min_throughput_per_second: 1000.0,
            max_compilation_warnings: 5,
            max_architecture_violations: 2,
            min_resilience_recovery_rate: 0.99,
            max_memory_growth_mb: 5.0,
            max_gen2_collections: 3,
            missing_data: GatePolicies::default(),
        }
    }

    /// Checks that every threshold is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractions = [
            ("min_overall_coverage", self.min_overall_coverage),
            ("min_critical_path_coverage", self.min_critical_path_coverage),
            ("min_branch_coverage", self.min_branch_coverage),
            ("max_complexity_violation_rate", self.max_complexity_violation_rate),
            ("max_error_rate", self.max_error_rate),
            ("min_resilience_recovery_rate", self.min_resilience_recovery_rate),
        ];
        for (option, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid_option(
                    option,
                    format!("must be within [0, 1], got {value}"),
                ));
            }
        }

        let magnitudes = [
            ("max_average_complexity", self.max_average_complexity),
            ("max_average_response_time_ms", self.max_average_response_time_ms),
            ("min_throughput_per_second", self.min_throughput_per_second),
            ("max_memory_growth_mb", self.max_memory_growth_mb),
        ];
        for (option, value) in magnitudes {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid_option(
                    option,
                    format!("must be a non-negative number, got {value}"),
                ));
            }
        }

        for kind in GateKind::ALL {
            let MissingDataPolicy::Baseline { score } = self.missing_data.get(kind) else {
                continue;
            };
            if !(0.0..=100.0).contains(&score) {
                return Err(ConfigError::invalid_option(
                    format!("missing_data.{}", kind.name()),
                    format!("baseline score must be within [0, 100], got {score}"),
                ));
            }
        }

        Ok(())
    }
}

/// Latency and error-rate targets applied to each registered mapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceTargets {
    /// Target average conversion time, in milliseconds.
    pub target_average_ms: f64,
    /// Maximum acceptable error rate, in [0, 1].
    pub max_error_rate: f64,
}

impl Default for PerformanceTargets {
    fn default() -> Self {
        Self {
            target_average_ms: 1.0,
            max_error_rate: 0.01,
        }
    }
}

/// Root configuration for mapgate.
///
/// # Examples
///
/// ```
/// use mg_core::Config;
///
/// let config = Config::from_json_str(r#"{"gates": {"max_compilation_warnings": 0}}"#).unwrap();
/// assert_eq!(config.gates.max_compilation_warnings, 0);
/// assert!((config.mapping.target_average_ms - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quality gate thresholds.
    pub gates: QualityGateConfiguration,

    /// Mapper performance targets.
    pub mapping: PerformanceTargets,
}

impl Config {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON configuration file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_owned()));
        }
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Checks gate thresholds and mapper targets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gates.validate()?;
        if !self.mapping.target_average_ms.is_finite() || self.mapping.target_average_ms < 0.0 {
            return Err(ConfigError::invalid_option(
                "mapping.target_average_ms",
                "must be a non-negative number",
            ));
        }
        if !(0.0..=1.0).contains(&self.mapping.max_error_rate) {
            return Err(ConfigError::invalid_option(
                "mapping.max_error_rate",
                "must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_gate_configuration_defaults() {
        let config = QualityGateConfiguration::default();
        assert!((config.min_critical_path_coverage - 0.90).abs() < f64::EPSILON);
        assert!((config.min_branch_coverage - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.max_high_severity_security_issues, 2);
        assert!((config.min_throughput_per_second - 500.0).abs() < f64::EPSILON);
        assert_eq!(config.max_compilation_warnings, 10);
        assert_eq!(config.max_gen2_collections, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strict_is_tighter_than_default() {
        let default = QualityGateConfiguration::default();
        let strict = QualityGateConfiguration::strict();
        assert!(strict.min_overall_coverage > default.min_overall_coverage);
        assert!(strict.max_average_response_time_ms < default.max_average_response_time_ms);
        assert!(strict.max_memory_growth_mb < default.max_memory_growth_mb);
        assert!(strict.validate().is_ok());
    }

    #[test]
    fn test_default_missing_data_policies() {
        let policies = GatePolicies::default();
        assert_eq!(policies.get(GateKind::Coverage), MissingDataPolicy::FailClosed);
        assert_eq!(policies.get(GateKind::Compilation), MissingDataPolicy::FailClosed);
        assert_eq!(
            policies.get(GateKind::Architecture),
            MissingDataPolicy::baseline(85.0)
        );
        assert_eq!(policies.get(GateKind::Resilience), MissingDataPolicy::baseline(80.0));
        assert_eq!(policies.get(GateKind::Memory), MissingDataPolicy::baseline(75.0));
    }

    #[test]
    fn test_policy_set_and_get() {
        let mut policies = GatePolicies::fail_closed();
        policies.set(GateKind::Security, MissingDataPolicy::baseline(50.0));
        assert_eq!(policies.get(GateKind::Security), MissingDataPolicy::baseline(50.0));
        assert_eq!(policies.get(GateKind::Memory), MissingDataPolicy::FailClosed);
    }

    #[test]
    fn test_policy_serialization() {
        let json = serde_json::to_string(&MissingDataPolicy::baseline(70.0)).unwrap();
        assert_eq!(json, r#"{"mode":"baseline","score":70.0}"#);
        let parsed: MissingDataPolicy = serde_json::from_str(r#"{"mode":"fail_closed"}"#).unwrap();
        assert_eq!(parsed, MissingDataPolicy::FailClosed);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"gates": {"min_overall_coverage": 0.6, "missing_data": {"memory": {"mode": "fail_closed"}}}}"#;
        let config = Config::from_json_str(json).unwrap();
        assert!((config.gates.min_overall_coverage - 0.6).abs() < f64::EPSILON);
        assert!((config.gates.min_branch_coverage - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.gates.missing_data.memory, MissingDataPolicy::FailClosed);
        assert_eq!(
            config.gates.missing_data.architecture,
            MissingDataPolicy::baseline(85.0)
        );
        assert_eq!(config.mapping, PerformanceTargets::default());
    }

    #[test]
    fn test_config_rejects_out_of_range_values() {
        let err = Config::from_json_str(r#"{"gates": {"max_error_rate": 1.5}}"#).unwrap_err();
        assert!(err.to_string().contains("max_error_rate"));

        let err = Config::from_json_str(
            r#"{"gates": {"missing_data": {"memory": {"mode": "baseline", "score": 120.0}}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Memory"));

        let err = Config::from_json_str(r#"{"mapping": {"target_average_ms": -1.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { .. }));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = Config::from_json_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = Config::load(Utf8Path::new("/definitely/not/here/mapgate.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    fn write_config(dir: &TempDir, contents: &str) -> Utf8PathBuf {
        let path = Utf8Path::from_path(dir.path())
            .expect("Invalid path")
            .join("mapgate.json");
        fs::write(&path, contents).expect("Failed to write config");
        path
    }

    #[test]
    fn test_config_load_from_file() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_config(&dir, r#"{"gates": {"max_gen2_collections": 1}}"#);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.gates.max_gen2_collections, 1);
    }

    #[test]
    fn test_config_load_malformed_file() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_config(&dir, r#"{"gates": {"max_gen2_collections": "#);
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_config_load_rejects_invalid_thresholds() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = write_config(&dir, r#"{"mapping": {"max_error_rate": 2.0}}"#);
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOption { .. }));
    }
}
