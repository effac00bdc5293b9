//! CLI entry point for mapgate.
//!
//! Runs the quality gates over assessment data files and exercises the
//! built-in entity mappers.
//!
//! # Usage
//!
//! ```bash
//! mapgate [OPTIONS] <COMMAND>
//!
//! # Assess one subject (or a JSON array of subjects)
//! mapgate assess --input assessment.json
//!
//! # Strict thresholds, JSON output to a file
//! mapgate assess --input clients.json --preset strict --format json --output results.json
//!
//! # Print the effective configuration
//! mapgate config --preset strict
//!
//! # Exercise the sample mappers and gate their live metrics
//! mapgate demo --iterations 5000
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{WrapErr, eyre};
use mg_core::{Config, QualityGateConfiguration};
use mg_mapping::{MapperPerformanceReport, MapperRegistry};
use mg_models::{
    Company, CostCode, GeneratedCompanyRef, GeneratedCostCode, GeneratedUser, User,
    register_default_mappers,
};
use mg_quality::{
    MapperPerformanceResult, QualityAssessmentData, QualityGateResults, QualityGateValidator,
    QualityMetricsAggregator, QualityMetricsSummary,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Quality gates for type mappers and the clients built on them.
#[derive(Parser)]
#[command(name = "mapgate", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file. Missing keys take their defaults.
    #[arg(short, long, global = true, env = "MAPGATE_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Threshold preset used when no configuration file is given.
    #[arg(long, global = true, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Run the quality gates over assessment data.
    Assess {
        /// Assessment data: one JSON object or an array of objects.
        #[arg(short, long)]
        input: Utf8PathBuf,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Output file (defaults to stdout).
        #[arg(short, long)]
        output: Option<Utf8PathBuf>,

        /// Exit with an error if any subject fails a gate.
        #[arg(long)]
        deny_failures: bool,
    },

    /// Print the effective configuration as JSON.
    Config,

    /// Exercise the sample mappers and gate their live metrics.
    Demo {
        /// Conversions per mapper and direction.
        #[arg(short = 'n', long, default_value_t = 1_000)]
        iterations: usize,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Named threshold sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// Standard thresholds.
    Default,
    /// Release-branch thresholds.
    Strict,
}

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Plain-text report.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Assessment input file contents.
#[derive(Deserialize)]
#[serde(untagged)]
enum AssessmentInput {
    Many(Vec<QualityAssessmentData>),
    One(Box<QualityAssessmentData>),
}

impl AssessmentInput {
    fn into_vec(self) -> Vec<QualityAssessmentData> {
        match self {
            Self::Many(all) => all,
            Self::One(one) => vec![*one],
        }
    }
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default. Logs go
/// to stderr so reports on stdout stay machine-readable.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(level)
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds the [`Config`] from the configuration file or the preset.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    if let Some(path) = &cli.config {
        let config = Config::load(path)
            .wrap_err_with(|| format!("Failed to load configuration from {path}"))?;
        if cli.preset != Preset::Default {
            warn!(path = %path, "Ignoring --preset because a configuration file was given");
        }
        return Ok(config);
    }

    let gates = match cli.preset {
        Preset::Default => QualityGateConfiguration::default(),
        Preset::Strict => QualityGateConfiguration::strict(),
    };
    Ok(Config {
        gates,
        ..Config::default()
    })
}

/// Reads assessment data from `path`.
///
/// # Errors
///
/// Returns an error if the file is missing or is not assessment JSON.
fn load_assessments(path: &Utf8Path) -> color_eyre::Result<Vec<QualityAssessmentData>> {
    if !path.exists() {
        return Err(eyre!("Input file does not exist: {path}"));
    }
    let contents = std::fs::read_to_string(path.as_std_path())
        .wrap_err_with(|| format!("Failed to read {path}"))?;
    parse_assessments(&contents).wrap_err_with(|| format!("Failed to parse {path}"))
}

fn parse_assessments(json: &str) -> color_eyre::Result<Vec<QualityAssessmentData>> {
    let input: AssessmentInput = serde_json::from_str(json)?;
    let assessments = input.into_vec();
    if assessments.is_empty() {
        return Err(eyre!("No assessment data found"));
    }
    Ok(assessments)
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Runs the quality gates for every subject in `input`.
///
/// # Errors
///
/// Returns an error if the input cannot be loaded, the output cannot be
/// written, or `deny_failures` is set and a subject failed.
fn run_assess(
    config: &Config,
    input: &Utf8Path,
    format: OutputFormat,
    output: Option<&Utf8Path>,
    deny_failures: bool,
) -> color_eyre::Result<()> {
    let assessments = load_assessments(input)?;
    info!(input = %input, subjects = assessments.len(), "Starting assessment");

    let validator = QualityGateValidator::new();
    let aggregator = QualityMetricsAggregator::new();
    let results: Vec<QualityGateResults> = assessments
        .iter()
        .map(|data| validator.validate_all_gates(data, &config.gates))
        .collect();
    for result in &results {
        aggregator.add_result(result.clone());
    }
    let summary = (results.len() > 1).then(|| aggregator.generate_summary());

    let content = match format {
        OutputFormat::Text => render_text(&results, summary.as_ref()),
        OutputFormat::Json => render_json(&results, summary.as_ref())?,
    };
    emit(&content, output)?;

    let failing = results.iter().filter(|r| !r.passed_all_gates).count();
    if deny_failures && failing > 0 {
        return Err(eyre!(
            "{failing} of {} subjects failed quality gates",
            results.len()
        ));
    }
    Ok(())
}

/// Prints the effective configuration.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
fn run_config(config: &Config) -> color_eyre::Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    emit(&format!("{content}\n"), None)
}

/// Registers the sample mappers, drives conversions through them, and gates
/// the resulting live metrics.
///
/// # Errors
///
/// Returns an error if a sample record cannot be built or output fails.
fn run_demo(config: &Config, iterations: usize, format: OutputFormat) -> color_eyre::Result<()> {
    info!(iterations, "Running mapper demo");

    let registry = Arc::new(MapperRegistry::new());
    register_default_mappers(&registry);

    let cost_codes = registry.get_mapper::<CostCode, GeneratedCostCode>()?;
    let companies = registry.get_mapper::<Company, GeneratedCompanyRef>()?;
    let users = registry.get_mapper::<User, GeneratedUser>()?;

    let samples = DemoSamples::build()?;
    for i in 0..iterations {
        let cost_code = &samples.cost_codes[i % samples.cost_codes.len()];
        if let Ok(wrapper) = cost_codes.map_to_wrapper(Some(cost_code)) {
            let _ = cost_codes.map_to_generated(Some(&wrapper));
        }

        let company = &samples.companies[i % samples.companies.len()];
        if let Ok(wrapper) = companies.map_to_wrapper(Some(company)) {
            let _ = companies.map_to_generated(Some(&wrapper));
        }

        // Every 250th user carries a relative avatar URL, which the mapper rejects.
        let user = if i % 250 == 249 {
            &samples.broken_user
        } else {
            &samples.users[i % samples.users.len()]
        };
        if let Ok(wrapper) = users.map_to_wrapper(Some(user)) {
            let _ = users.map_to_generated(Some(&wrapper));
        }
    }

    let reports =
        registry.validate_performance(config.mapping.target_average_ms, config.mapping.max_error_rate);
    let data = QualityAssessmentData::new("mapgate-demo")
        .with_performance(MapperPerformanceResult::from_registry(&registry))
        .with_metric("iterations", iterations)
        .with_metric("mappers", registry.len());
    let results = QualityGateValidator::new().validate_all_gates(&data, &config.gates);

    let content = match format {
        OutputFormat::Text => {
            let mut text = render_mapper_reports(&reports);
            text.push('\n');
            text.push_str(&results.generate_report());
            text
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct DemoReport<'a> {
                mappers: &'a [MapperPerformanceReport],
                assessment: &'a QualityGateResults,
            }
            let report = DemoReport {
                mappers: &reports,
                assessment: &results,
            };
            format!("{}\n", serde_json::to_string_pretty(&report)?)
        }
    };
    emit(&content, None)
}

/// Sample generated records for the demo.
struct DemoSamples {
    cost_codes: Vec<GeneratedCostCode>,
    companies: Vec<GeneratedCompanyRef>,
    users: Vec<GeneratedUser>,
    broken_user: GeneratedUser,
}

impl DemoSamples {
    fn build() -> color_eyre::Result<Self> {
        let cost_codes = (1..=8)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": i,
                    "code": format!("01.{i:03}"),
                    "description": format!("Site work phase {i}"),
                    "budget_amount": 12_500.455 * f64::from(i),
                    "actual_amount": format!("{}.10", 9_000 * i),
                    "committed_amount": 11_000,
                    "created_at": "2024-01-15T08:30:00Z",
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let companies = ["Acme Builders", "Northwind Electrical", "Contoso Plumbing"]
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                serde_json::from_value(json!({
                    "name": name,
                    "trade": "subcontractor",
                    "region": i,
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let users = (1..=4)
            .map(|i| {
                serde_json::from_value(json!({
                    "id": 100 + i,
                    "email_address": format!("user{i}@example.com"),
                    "first_name": "Sam",
                    "last_name": format!("Builder{i}"),
                    "is_active": true,
                    "avatar": format!("https://cdn.example.com/avatars/{i}.png"),
                    "mobile_phone": "+1 555 0100",
                    "vendor": { "id": 7, "name": "Acme Builders" },
                    "city": "Denver",
                    "badge_number": i,
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let broken_user = serde_json::from_value(json!({
            "id": 999,
            "email_address": "broken@example.com",
            "avatar": "/avatars/999.png",
        }))?;

        Ok(Self {
            cost_codes,
            companies,
            users,
            broken_user,
        })
    }
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Renders per-subject reports, followed by the executive summary when
/// several subjects were assessed.
fn render_text(results: &[QualityGateResults], summary: Option<&QualityMetricsSummary>) -> String {
    let mut text = results
        .iter()
        .map(QualityGateResults::generate_report)
        .collect::<Vec<_>>()
        .join("\n");
    if let Some(summary) = summary {
        text.push('\n');
        text.push_str(&summary.generate_executive_summary());
    }
    text
}

/// Renders results as JSON: a single result object for one subject, or
/// `{ "results": [...], "summary": {...} }` for several.
fn render_json(
    results: &[QualityGateResults],
    summary: Option<&QualityMetricsSummary>,
) -> color_eyre::Result<String> {
    #[derive(Serialize)]
    struct MultiReport<'a> {
        results: &'a [QualityGateResults],
        summary: &'a QualityMetricsSummary,
    }

    let json = match (results, summary) {
        ([single], None) => serde_json::to_string_pretty(single),
        (_, Some(summary)) => serde_json::to_string_pretty(&MultiReport { results, summary }),
        (_, None) => serde_json::to_string_pretty(results),
    }
    .map_err(|e| eyre!("Failed to serialize JSON: {e}"))?;
    Ok(format!("{json}\n"))
}

/// Renders one line per mapper with its live metrics and validation verdict.
fn render_mapper_reports(reports: &[MapperPerformanceReport]) -> String {
    use std::fmt::Write;

    let mut output = String::from("=== Mapper Performance ===\n");
    for report in reports {
        let status = if report.validation.overall_valid {
            "OK".to_owned()
        } else {
            format!("FAIL ({})", report.validation.failed_checks().join(", "))
        };
        let _ = writeln!(
            output,
            "{:<18} calls: {:>7}  avg: {:>8.4}ms  errors: {:>6.2}%  {status}",
            report.mapper_name,
            report.metrics.total_calls(),
            report.metrics.combined_average_ms(),
            report.metrics.combined_error_rate() * 100.0,
        );
    }
    output
}

/// Writes `content` to `output`, or to stdout.
fn emit(content: &str, output: Option<&Utf8Path>) -> color_eyre::Result<()> {
    if let Some(output_path) = output {
        std::fs::write(output_path.as_std_path(), content)?;
        info!(path = %output_path, "Report written");
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{content}")?;
    }
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Resolve configuration
    let config = build_config(&cli)?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Assess {
            input,
            format,
            output,
            deny_failures,
        } => run_assess(&config, input, *format, output.as_deref(), *deny_failures),
        Commands::Config => run_config(&config),
        Commands::Demo { iterations, format } => run_demo(&config, *iterations, *format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    #[allow(clippy::panic)]
    fn test_parse_assess_arguments() {
        let cli = Cli::parse_from([
            "mapgate", "assess", "--input", "data.json", "--format", "json", "--preset", "strict",
        ]);
        assert_eq!(cli.preset, Preset::Strict);
        match cli.command {
            Commands::Assess { input, format, output, deny_failures } => {
                assert_eq!(input, "data.json");
                assert_eq!(format, OutputFormat::Json);
                assert!(output.is_none());
                assert!(!deny_failures);
            }
            _ => panic!("expected assess"),
        }
    }

    #[test]
    fn test_build_config_from_preset() {
        let cli = Cli::parse_from(["mapgate", "--preset", "strict", "config"]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.gates, QualityGateConfiguration::strict());
    }

    #[test]
    fn test_parse_single_and_many_assessments() {
        let one = parse_assessments(r#"{"subject": "Core"}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].subject, "Core");

        let many = parse_assessments(r#"[{"subject": "Core"}, {"subject": "Projects"}]"#).unwrap();
        assert_eq!(many.len(), 2);

        assert!(parse_assessments("[]").is_err());
        assert!(parse_assessments("42").is_err());
    }

    #[test]
    fn test_demo_samples_convert() {
        let samples = DemoSamples::build().unwrap();
        let registry = MapperRegistry::new();
        register_default_mappers(&registry);

        let users = registry.get_mapper::<User, GeneratedUser>().unwrap();
        assert!(users.map_to_wrapper(Some(&samples.users[0])).is_ok());
        assert!(users.map_to_wrapper(Some(&samples.broken_user)).is_err());

        let cost_codes = registry.get_mapper::<CostCode, GeneratedCostCode>().unwrap();
        let cost_code = cost_codes.map_to_wrapper(Some(&samples.cost_codes[0])).unwrap();
        assert_eq!(cost_code.code, "01.001");
    }

    #[test]
    fn test_render_text_appends_summary_for_many_subjects() {
        let validator = QualityGateValidator::new();
        let config = QualityGateConfiguration::default();
        let aggregator = QualityMetricsAggregator::new();
        let results: Vec<_> = ["Core", "Projects"]
            .into_iter()
            .map(|s| validator.validate_all_gates(&QualityAssessmentData::new(s), &config))
            .collect();
        for r in &results {
            aggregator.add_result(r.clone());
        }

        let text = render_text(&results, Some(&aggregator.generate_summary()));
        assert!(text.contains("=== Quality Assessment Report for Core ==="));
        assert!(text.contains("=== Quality Assessment Report for Projects ==="));
        assert!(text.contains("Subjects Analyzed: 2"));

        let json = render_json(&results[..1], None).unwrap();
        assert!(json.starts_with("{\n  \"subject\": \"Core\""));
    }
}
