//! Nutri CLI - Command-line interface for Nutri Goals
//!
//! Commands:
//! - goals: Compute goal reports for profiles (batch mode)
//! - validate: Validate profiles and report field errors
//! - progress: Weight history statistics and goal projections
//! - analytics: Meal log summaries
//! - doctor: Diagnose configuration and environment
//! - schema: Print input/output schema information

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use nutri_goals::analytics::{daily_nutrition, macro_distribution, summarize, MealLog};
use nutri_goals::config::EngineConfig;
use nutri_goals::encoder::SCHEMA_VERSION;
use nutri_goals::progress::{
    estimate_time_to_goal, projected_goal_date, TimeToGoal, WeightChange, WeightHistory,
    WeightStats,
};
use nutri_goals::types::{GoalType, GoalsPayload};
use nutri_goals::validation::{
    parse_date, validate_profile, validate_profiles, FieldErrors, RawProfileInput,
    WeightEntryInput,
};
use nutri_goals::{ComputeError, GoalsCalculator, ENGINE_VERSION, PRODUCER_NAME};

/// Nutri - Personalised daily calorie and macronutrient goals
#[derive(Parser)]
#[command(name = "nutri")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute nutrition goals from a physical profile", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference date for age and projections (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute goal reports for profiles (batch mode)
    Goals {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,
    },

    /// Validate profiles and report field errors
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Weight history statistics and goal projections
    Progress {
        /// Weight history file (created when recording)
        #[arg(long)]
        history: PathBuf,

        /// Record a new weight (kg) before reporting
        #[arg(long)]
        record: Option<f64>,

        /// Timestamp of the recorded weight (RFC 3339), now by default
        #[arg(long, requires = "record")]
        recorded_at: Option<String>,

        /// Height (cm) used to store the BMI of the recorded weight
        #[arg(long, requires = "record")]
        height: Option<f64>,

        /// Current weight (kg); the latest entry by default
        #[arg(long)]
        current: Option<f64>,

        /// Target weight (kg)
        #[arg(long)]
        target: Option<f64>,

        /// Goal type used for the projected goal date
        #[arg(long, value_enum)]
        goal: Option<GoalType>,
    },

    /// Meal log summaries
    Analytics {
        /// Meal log file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// First day of the range (YYYY-MM-DD); earliest meal by default
        #[arg(long)]
        start: Option<String>,

        /// Last day of the range (YYYY-MM-DD); latest meal by default
        #[arg(long)]
        end: Option<String>,

        /// Report to produce
        #[arg(long, default_value = "summary")]
        view: AnalyticsView,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a weight history file
        #[arg(long)]
        history: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records, or a single record
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum AnalyticsView {
    /// Per-day averages over the range
    Summary,
    /// Totals for each day with meals
    Daily,
    /// Macro totals over the range
    Distribution,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (profile)
    Input,
    /// Output schema (nutri.goals.v1)
    Output,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), NutriCliError> {
    let config = load_config(cli.config.as_deref(), cli.today.as_deref())?;
    tracing::info!(
        policy = config.remainder_policy.as_str(),
        today = %config.today(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Goals {
            input,
            output,
            input_format,
            output_format,
        } => cmd_goals(&config, &input, &output, input_format, output_format),
        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&config, &input, input_format, json),
        Commands::Progress {
            history,
            record,
            recorded_at,
            height,
            current,
            target,
            goal,
        } => cmd_progress(
            &config,
            &history,
            WeightRecord {
                weight: record,
                recorded_at,
                height,
            },
            current,
            target,
            goal,
        ),
        Commands::Analytics {
            input,
            input_format,
            start,
            end,
            view,
        } => cmd_analytics(&input, input_format, start.as_deref(), end.as_deref(), view),
        Commands::Doctor { history, json } => cmd_doctor(&config, history.as_deref(), json),
        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

/// File config, then environment, then `--today`
fn load_config(path: Option<&Path>, today: Option<&str>) -> Result<EngineConfig, NutriCliError> {
    let mut config = match path {
        Some(p) => EngineConfig::from_file(p)?,
        None => EngineConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(text) = today {
        let date = parse_date(text)
            .ok_or_else(|| ComputeError::DateParseError(format!("--today '{text}'")))?;
        config.reference_date = Some(date);
    }
    Ok(config)
}

fn cmd_goals(
    config: &EngineConfig,
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), NutriCliError> {
    let input_data = read_input(input)?;
    let profiles: Vec<RawProfileInput> = parse_records(&input_data, &input_format)?;

    if profiles.is_empty() {
        return Err(NutriCliError::NoRecords);
    }

    let calculator = GoalsCalculator::with_config(config.clone());
    let today = calculator.today();

    let mut reports: Vec<GoalsPayload> = Vec::with_capacity(profiles.len());
    for (index, raw) in profiles.iter().enumerate() {
        let profile = validate_profile(raw, today)
            .map_err(|errors| NutriCliError::InvalidProfile { index, errors })?;
        reports.push(calculator.report(&profile, today)?);
    }
    tracing::info!(count = reports.len(), "goal reports computed");

    let output_data = format_output(&reports, &output_format)?;
    write_output(output, &output_data)
}

fn cmd_validate(
    config: &EngineConfig,
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), NutriCliError> {
    let input_data = read_input(input)?;
    let profiles: Vec<RawProfileInput> = parse_records(&input_data, &input_format)?;

    let failures = validate_profiles(&profiles, config.today());

    let report = ValidationReport {
        total_profiles: profiles.len(),
        valid_profiles: profiles.len() - failures.len(),
        invalid_profiles: failures.len(),
        errors: failures
            .into_iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                errors: r.errors,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total profiles:   {}", report.total_profiles);
        println!("Valid profiles:   {}", report.valid_profiles);
        println!("Invalid profiles: {}", report.invalid_profiles);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for detail in &report.errors {
                println!("  - Profile {}:", detail.index);
                for (field, messages) in detail.errors.iter() {
                    for message in messages {
                        println!("      {field}: {message}");
                    }
                }
            }
        }
    }

    if report.invalid_profiles > 0 {
        Err(NutriCliError::ValidationFailed(report.invalid_profiles))
    } else {
        Ok(())
    }
}

/// Weight reading requested on the command line
struct WeightRecord {
    weight: Option<f64>,
    recorded_at: Option<String>,
    height: Option<f64>,
}

fn cmd_progress(
    config: &EngineConfig,
    history_path: &Path,
    record: WeightRecord,
    current: Option<f64>,
    target: Option<f64>,
    goal: Option<GoalType>,
) -> Result<(), NutriCliError> {
    let mut history = WeightHistory::open(history_path, config.weight_history_limit)?;

    if let Some(weight) = record.weight {
        let mut entry = WeightEntryInput {
            weight: Some(serde_json::Value::from(weight)),
            recorded_at: record.recorded_at,
            data_source: None,
        }
        .validate(Utc::now())
        .map_err(NutriCliError::InvalidWeightEntry)?;
        if let Some(height) = record.height {
            entry = entry.with_height(height);
        }

        history.record(entry);
        history.save(history_path)?;
        tracing::info!(entries = history.len(), "weight recorded");
    }

    let today = config.today();
    let current = current.or_else(|| history.latest().map(|e| e.weight_kg));
    let average_weekly_change = history.average_weekly_change();

    let (time_to_goal, projected) = match (current, target) {
        (Some(c), Some(t)) => (
            estimate_time_to_goal(c, t, average_weekly_change, today),
            goal.and_then(|g| projected_goal_date(c, t, g, today)),
        ),
        _ => (None, None),
    };

    let report = ProgressReport {
        stats: history.stats(current, target, goal),
        entries: history.len(),
        latest_change: history.latest_change(),
        average_weekly_change,
        time_to_goal,
        projected_goal_date: projected,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_analytics(
    input: &Path,
    input_format: InputFormat,
    start: Option<&str>,
    end: Option<&str>,
    view: AnalyticsView,
) -> Result<(), NutriCliError> {
    let input_data = read_input(input)?;
    let meals: Vec<MealLog> = parse_records(&input_data, &input_format)?;

    let first = meals.iter().map(MealLog::date).min();
    let last = meals.iter().map(MealLog::date).max();
    let start = resolve_date(start, first, "--start")?;
    let end = resolve_date(end, last, "--end")?;

    let in_range: Vec<MealLog> = meals
        .into_iter()
        .filter(|m| (start..=end).contains(&m.date()))
        .collect();

    let output = match view {
        AnalyticsView::Summary => serde_json::to_string_pretty(&summarize(&in_range, start, end)?)?,
        AnalyticsView::Daily => serde_json::to_string_pretty(&daily_nutrition(&in_range))?,
        AnalyticsView::Distribution => {
            serde_json::to_string_pretty(&macro_distribution(&in_range))?
        }
    };

    println!("{output}");
    Ok(())
}

fn resolve_date(
    text: Option<&str>,
    fallback: Option<NaiveDate>,
    flag: &str,
) -> Result<NaiveDate, NutriCliError> {
    match text {
        Some(t) => Ok(parse_date(t)
            .ok_or_else(|| ComputeError::DateParseError(format!("{flag} '{t}'")))?),
        None => fallback.ok_or(NutriCliError::NoRecords),
    }
}

fn cmd_doctor(
    config: &EngineConfig,
    history: Option<&Path>,
    json: bool,
) -> Result<(), NutriCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Nutri Goals version {}", ENGINE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Output schema: {}", SCHEMA_VERSION),
    });

    checks.push(match config.validate() {
        Ok(()) => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "remainder_policy={}, weight_history_limit={}, today={}",
                config.remainder_policy.as_str(),
                config.weight_history_limit,
                config.today()
            ),
        },
        Err(e) => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    });

    if let Some(history_path) = history {
        let check = if !history_path.exists() {
            DoctorCheck {
                name: "history".to_string(),
                status: CheckStatus::Warning,
                message: "Weight history file does not exist".to_string(),
            }
        } else {
            match WeightHistory::load(history_path) {
                Ok(h) => DoctorCheck {
                    name: "history".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Weight history valid ({} of {} entries)",
                        h.len(),
                        h.limit()
                    ),
                },
                Err(e) => DoctorCheck {
                    name: "history".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid weight history: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (batch input ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Nutri Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!();
        for check in &report.checks {
            let status = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERROR]",
            };
            println!("{} {}: {}", status, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(NutriCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), NutriCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: profile");
                println!();
                println!("- weight_kg: number, 30-300");
                println!("- height_cm: number, 100-250");
                println!("- birth_date: YYYY-MM-DD, age 13-120");
                println!("- sex (or gender): male | female | other");
                println!("- activity_level: sedentary | lightly_active | moderately_active | very_active | extra_active");
                println!("- goal_type: weight_loss | maintenance | muscle_gain");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: {}", SCHEMA_VERSION);
                println!();
                println!("- schema_version: {}", SCHEMA_VERSION);
                println!("- producer: {{ name, version, instance_id }}");
                println!("- provenance: {{ reference_date, computed_at_utc }}");
                println!("- goals: {{ age, bmr, tdee, daily_calorie_goal, daily_protein_goal,");
                println!("           daily_carbs_goal, daily_fat_goal, current_bmi, bmi_category,");
                println!("           ideal_weight_range {{ min, max }} }}");
                println!("- details: {{ unclamped_calorie_goal, protein_from_ratio_g, protein_floor_g, remaining_kcal }}");
                println!("- flags: calorie_floor_applied | calorie_ceiling_applied | protein_floor_applied | remainder_exhausted");
            }
        }
    }
    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, NutriCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), NutriCliError> {
    if output.to_string_lossy() == "-" {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

fn parse_records<T: DeserializeOwned>(
    data: &str,
    format: &InputFormat,
) -> Result<Vec<T>, NutriCliError> {
    match format {
        InputFormat::Ndjson => {
            let mut records = Vec::new();
            for (line_num, line) in data.lines().enumerate() {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let record = serde_json::from_str(trimmed).map_err(|e| {
                    NutriCliError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
                })?;
                records.push(record);
            }
            Ok(records)
        }
        InputFormat::Json => {
            let value: serde_json::Value = serde_json::from_str(data)?;
            if value.is_array() {
                Ok(serde_json::from_value(value)?)
            } else {
                Ok(vec![serde_json::from_value(value)?])
            }
        }
    }
}

fn format_output<T: Serialize>(records: &[T], format: &OutputFormat) -> Result<String, NutriCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for record in records {
                lines.push(serde_json::to_string(record)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(records)?),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "nutri.profile",
        "description": "Physical profile for nutrition goal calculation",
        "type": "object",
        "required": ["weight_kg", "height_cm", "birth_date", "sex", "activity_level", "goal_type"],
        "properties": {
            "weight_kg": { "type": "number", "minimum": 30, "maximum": 300 },
            "height_cm": { "type": "number", "minimum": 100, "maximum": 250 },
            "birth_date": { "type": "string", "format": "date" },
            "sex": { "type": "string", "enum": ["male", "female", "other"] },
            "activity_level": {
                "type": "string",
                "enum": ["sedentary", "lightly_active", "moderately_active", "very_active", "extra_active"]
            },
            "goal_type": {
                "type": "string",
                "enum": ["weight_loss", "maintenance", "muscle_gain"]
            },
            "target_weight_kg": { "type": "number", "minimum": 30, "maximum": 300 }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Nutrition goals report",
        "type": "object",
        "required": ["schema_version", "producer", "provenance", "goals", "details", "flags"],
        "properties": {
            "schema_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "provenance": {
                "type": "object",
                "properties": {
                    "reference_date": { "type": "string", "format": "date" },
                    "computed_at_utc": { "type": "string", "format": "date-time" }
                }
            },
            "goals": {
                "type": "object",
                "properties": {
                    "age": { "type": "integer" },
                    "bmr": { "type": "integer" },
                    "tdee": { "type": "integer" },
                    "daily_calorie_goal": { "type": "integer", "minimum": 1200, "maximum": 5000 },
                    "daily_protein_goal": { "type": "integer" },
                    "daily_carbs_goal": { "type": "integer" },
                    "daily_fat_goal": { "type": "integer" },
                    "current_bmi": { "type": "number" },
                    "bmi_category": {
                        "type": "string",
                        "enum": ["underweight", "normal", "overweight", "obese"]
                    },
                    "ideal_weight_range": {
                        "type": "object",
                        "properties": {
                            "min": { "type": "number" },
                            "max": { "type": "number" }
                        }
                    }
                }
            },
            "details": { "type": "object" },
            "flags": { "type": "array", "items": { "type": "string" } }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum NutriCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    InvalidProfile { index: usize, errors: FieldErrors },
    InvalidWeightEntry(FieldErrors),
    NoRecords,
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for NutriCliError {
    fn from(e: io::Error) -> Self {
        NutriCliError::Io(e)
    }
}

impl From<ComputeError> for NutriCliError {
    fn from(e: ComputeError) -> Self {
        NutriCliError::Compute(e)
    }
}

impl From<serde_json::Error> for NutriCliError {
    fn from(e: serde_json::Error) -> Self {
        NutriCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<NutriCliError> for CliError {
    fn from(e: NutriCliError) -> Self {
        match e {
            NutriCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            NutriCliError::Compute(ComputeError::InvalidConfig(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Check the --config file and NUTRI_* environment variables".to_string()),
            },
            NutriCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'nutri doctor' to check configuration".to_string()),
            },
            NutriCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            NutriCliError::InvalidProfile { index, errors } => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: format!("Record {}: {}", index, errors),
                hint: Some("Run 'nutri validate' for details".to_string()),
            },
            NutriCliError::InvalidWeightEntry(errors) => CliError {
                code: "INVALID_WEIGHT_ENTRY".to_string(),
                message: format!("Weight entry: {}", errors),
                hint: Some("Weight must be 30-300 kg; --recorded-at takes RFC 3339".to_string()),
            },
            NutriCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            NutriCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} profiles failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            NutriCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            NutriCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_profiles: usize,
    valid_profiles: usize,
    invalid_profiles: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    errors: FieldErrors,
}

#[derive(serde::Serialize)]
struct ProgressReport {
    stats: WeightStats,
    entries: usize,
    latest_change: Option<WeightChange>,
    average_weekly_change: f64,
    time_to_goal: Option<TimeToGoal>,
    projected_goal_date: Option<NaiveDate>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_weight_entry_error_is_not_a_profile_error() {
        let errors = WeightEntryInput {
            weight: Some(serde_json::json!(12)),
            ..Default::default()
        }
        .validate(Utc::now())
        .unwrap_err();

        let cli_error = CliError::from(NutriCliError::InvalidWeightEntry(errors));
        assert_eq!(cli_error.code, "INVALID_WEIGHT_ENTRY");
        assert!(cli_error.message.starts_with("Weight entry: weight:"));
        assert!(!cli_error.message.contains("Record"));
    }
}
