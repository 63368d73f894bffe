use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use time::OffsetDateTime;

use spendlog::config::{self, Settings};
use spendlog::extractor::{ExpenseParser, ExpenseParserBuilder, RemoteExtractor};
use spendlog::glm::GlmClientBuilder;
use spendlog::models::{ExpenseDraft, ExtractedExpense, ExtractionInput, InputType};
use spendlog::ocr::GlmOcr;
use spendlog::{Database, ExpenseService};

/// spendlog - parse free-form spending notes into structured expense records
#[derive(Parser)]
#[command(name = "spendlog")]
#[command(about = "An AI-assisted expense tracker with a deterministic fallback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Parse raw input into an expense candidate
    Parse(ParseCommand),
    /// Add an expense record manually
    Add(AddCommand),
    /// List all tags
    Tags,
    /// Delete raw-input provenance older than the retention window
    Cleanup(CleanupCommand),
}

/// Parse raw input into an expense candidate
#[derive(Parser)]
struct ParseCommand {
    /// The raw text to parse (omit for photo/camera input)
    #[arg(value_name = "TEXT", default_value = "")]
    text: String,

    /// Where the input came from: text, voice, photo or camera
    #[arg(short, long, value_name = "TYPE", default_value = "text")]
    input_type: InputType,

    /// Source locator for photo/camera input (image path or file:// URI)
    #[arg(short, long, value_name = "URI")]
    uri: Option<String>,

    /// Commit the candidate as a record after parsing
    #[arg(short, long)]
    save: bool,
}

/// Add an expense record manually
#[derive(Parser)]
struct AddCommand {
    /// Short description of the expense
    #[arg(value_name = "TITLE")]
    title: String,

    /// Amount spent
    #[arg(value_name = "AMOUNT")]
    amount: f64,

    /// Comma-separated tags to apply to the record
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

/// Delete old raw-input provenance
#[derive(Parser)]
struct CleanupCommand {
    /// Retention window in days (defaults to RAW_RETENTION_DAYS or 30)
    #[arg(short, long, value_name = "DAYS")]
    days: Option<u32>,
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Parse(cmd) => handle_parse(cmd),
        Commands::Add(cmd) => handle_add(cmd),
        Commands::Tags => handle_tags(),
        Commands::Cleanup(cmd) => handle_cleanup(cmd),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors include validation failures like empty content or a missing
/// image URI. Internal errors include database and I/O failures.
fn is_user_error(error: &anyhow::Error) -> bool {
    let error_msg = error.to_string();
    error_msg.contains("cannot be empty")
        || error_msg.contains("must be a positive")
        || error_msg.contains("requires a source URI")
}

/// Builds the extraction pipeline from the environment.
///
/// With no credential configured the parser is fallback-only; that is a
/// normal state, not an error.
fn build_parser(settings: &Settings) -> Result<ExpenseParser> {
    let mut builder = ExpenseParserBuilder::new();

    if settings.has_credential() {
        let client = Arc::new(
            GlmClientBuilder::new()
                .endpoint(settings.endpoint())
                .api_key(settings.api_key())
                .build()
                .context("Failed to create GLM client")?,
        );
        builder = builder
            .remote(RemoteExtractor::new(client.clone(), settings.parse_model()))
            .recognizer(Arc::new(GlmOcr::new(client, settings.ocr_model())));
    }

    Ok(builder.build())
}

fn open_service() -> Result<ExpenseService> {
    let db_path = config::database_path()?;
    ensure_database_directory(&db_path)?;
    let db = Database::open(&db_path).context("Failed to open database")?;
    Ok(ExpenseService::new(db))
}

/// Ensures the parent directory of the database file exists.
fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Handles the parse command: run the pipeline, show the candidate, and
/// optionally commit it.
fn handle_parse(cmd: &ParseCommand) -> Result<()> {
    if cmd.text.trim().is_empty() && !cmd.input_type.is_image() {
        anyhow::bail!("Input text cannot be empty");
    }

    let settings = Settings::from_env();
    let parser = build_parser(&settings)?;

    let input = match &cmd.uri {
        Some(uri) => ExtractionInput::with_source(&cmd.text, cmd.input_type, uri),
        None => ExtractionInput::text(&cmd.text, cmd.input_type),
    };

    let candidate = parser.parse(&input)?;
    print_candidate(&candidate);

    if cmd.save {
        let draft = draft_from_candidate(&candidate, cmd.input_type)?;
        let service = open_service()?;
        let record_id = service.commit_expense(&draft)?;
        println!("Record created (id: {record_id})");
    }

    Ok(())
}

/// Turns a reviewed candidate into a committable draft.
fn draft_from_candidate(
    candidate: &ExtractedExpense,
    input_type: InputType,
) -> Result<ExpenseDraft> {
    let title = candidate
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("Title cannot be empty; re-run without --save and edit"))?;
    let amount = candidate
        .amount
        .ok_or_else(|| anyhow::anyhow!("Amount must be a positive number; none was extracted"))?;

    Ok(ExpenseDraft {
        occurred_at: candidate.occurred_at_epoch_millis().unwrap_or_else(now_millis),
        title,
        amount,
        currency: candidate
            .currency
            .clone()
            .unwrap_or_else(|| "CNY".to_string()),
        tags: candidate.tags.clone(),
        input_type,
        raw_text: candidate.raw_text.clone(),
        raw_uri: candidate.raw_uri.clone(),
    })
}

fn print_candidate(candidate: &ExtractedExpense) {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("title:      {}", show(&candidate.title));
    println!(
        "amount:     {}",
        candidate
            .amount
            .map(|a| format!("{a:.2}"))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("currency:   {}", show(&candidate.currency));
    println!("occurred:   {}", show(&candidate.occurred_at));
    println!(
        "tags:       {}",
        if candidate.tags.is_empty() {
            "-".to_string()
        } else {
            candidate.tags.join(", ")
        }
    );
    println!(
        "confidence: {}",
        candidate
            .confidence
            .map(|c| format!("{c:.2}"))
            .unwrap_or_else(|| "-".to_string())
    );
    println!("evidence:   {}", show(&candidate.evidence));
}

/// Handles the add command by committing a manual record.
fn handle_add(cmd: &AddCommand) -> Result<()> {
    if cmd.title.trim().is_empty() {
        anyhow::bail!("Title cannot be empty");
    }

    let mut draft = ExpenseDraft::new(now_millis(), &cmd.title, cmd.amount);
    if let Some(tags) = &cmd.tags {
        draft.tags = parse_tags(tags);
    }

    let service = open_service()?;
    let record_id = service.commit_expense(&draft)?;

    print!("Record created (id: {record_id})");
    if !draft.tags.is_empty() {
        print!(" with tags: {}", draft.tags.join(", "));
    }
    println!();

    Ok(())
}

fn handle_tags() -> Result<()> {
    let service = open_service()?;
    for tag in service.all_tags()? {
        println!("{}", tag.name());
    }
    Ok(())
}

/// Handles retention cleanup of raw-input provenance.
fn handle_cleanup(cmd: &CleanupCommand) -> Result<()> {
    let settings = Settings::from_env();
    let days = cmd.days.unwrap_or_else(|| settings.raw_retention_days()).max(1);

    let threshold = now_millis() - i64::from(days) * 24 * 60 * 60 * 1000;
    let service = open_service()?;
    let deleted = service.cleanup_raw_inputs_before(threshold)?;

    println!("Deleted {deleted} raw input(s) older than {days} day(s)");
    Ok(())
}

/// Parses comma-separated tags from a string.
///
/// Splits on commas, trims whitespace from each tag, and filters out empty
/// strings.
fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
