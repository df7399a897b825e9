// Declara CLI - reconcile heterogeneous declaration documents headlessly

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use declara_extract_client::{config as service_config, ExtractClient, ServiceConfig};
use declara_io::{ai, detect_format, extract_local, Extraction, IoError};
use declara_recon::fields::{FieldSpec, DECLARATION_FIELDS, GOODS_FIELDS};
use declara_recon::{reconcile, CanonicalRecord, ReconReport};

use exit_codes::{
    EXIT_ERROR, EXIT_EXTRACT_NOT_CONFIGURED, EXIT_SUCCESS, EXIT_UNREADABLE,
    EXIT_UNSUPPORTED_FORMAT,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "dcla")]
#[command(about = "Reconcile uploaded declaration documents into one typed record")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile one document into the canonical record + report (JSON)
    #[command(after_help = "\
Examples:
  dcla reconcile declaration.xlsx
  dcla reconcile declaration.csv --pretty
  dcla reconcile scan.pdf -o record.json
  dcla reconcile export.docx --no-report -q")]
    Reconcile {
        /// Input document (csv/tsv/txt, xlsx/xls, docx, pdf, png/jpg)
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Omit the match report from the output
        #[arg(long)]
        no_report: bool,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Dump the raw extraction an adapter produces (debugging aid)
    #[command(after_help = "\
Examples:
  dcla inspect declaration.xlsx --pretty
  dcla inspect scan.pdf")]
    Inspect {
        /// Input document
        file: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// List the canonical fields and their known label aliases
    Fields {
        /// Limit to one scope
        #[arg(long)]
        scope: Option<ScopeArg>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Extraction-service configuration
    Extract {
        #[command(subcommand)]
        command: ExtractCommands,
    },
}

#[derive(Subcommand)]
enum ExtractCommands {
    /// Save the extraction-service endpoint (and optional token)
    Login {
        /// Service endpoint URL
        #[arg(long)]
        endpoint: String,

        /// Bearer token (omit if the deployment is unauthenticated)
        #[arg(long)]
        token: Option<String>,
    },

    /// Show the effective extraction-service configuration
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ScopeArg {
    Declaration,
    Goods,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn io(message: String) -> Self {
        Self {
            code: EXIT_ERROR,
            message,
            hint: None,
        }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        match &err {
            IoError::UnsupportedFormat(_) => Self {
                code: EXIT_UNSUPPORTED_FORMAT,
                message: err.to_string(),
                hint: Some("supported: csv, tsv, txt, xlsx, xls, docx, pdf, png, jpg".into()),
            },
            IoError::Unreadable { .. } => Self {
                code: EXIT_UNREADABLE,
                message: err.to_string(),
                hint: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Reconcile {
            file,
            out,
            pretty,
            no_report,
            quiet,
        } => cmd_reconcile(&file, out.as_deref(), pretty, no_report, quiet),
        Commands::Inspect { file, pretty, quiet } => cmd_inspect(&file, pretty, quiet),
        Commands::Fields { scope, json } => cmd_fields(scope, json),
        Commands::Extract { command } => match command {
            ExtractCommands::Login { endpoint, token } => cmd_extract_login(endpoint, token),
            ExtractCommands::Status => cmd_extract_status(),
        },
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}

// ---------------------------------------------------------------------------
// Extraction (shared by reconcile/inspect)
// ---------------------------------------------------------------------------

fn load_extraction(file: &Path, quiet: bool) -> Result<Extraction, CliError> {
    let format = detect_format(file)?;

    if format.is_remote() {
        let client = ExtractClient::from_saved_config().map_err(|e| CliError {
            code: EXIT_EXTRACT_NOT_CONFIGURED,
            message: e.to_string(),
            hint: Some("dcla extract login --endpoint <url> [--token <token>]".into()),
        })?;
        if !quiet {
            eprintln!(
                "Sending {} to extraction service at {}...",
                file.display(),
                client.endpoint()
            );
        }
        Ok(ai::extract_remote(&client, file, format)?)
    } else {
        Ok(extract_local(file, format)?)
    }
}

// ---------------------------------------------------------------------------
// reconcile
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ReconcileOutput<'a> {
    record: &'a CanonicalRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a ReconReport>,
}

fn cmd_reconcile(
    file: &Path,
    out: Option<&Path>,
    pretty: bool,
    no_report: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let extraction = load_extraction(file, quiet)?;

    // Degraded-parse and service-failure notes are warnings the operator
    // should see even in quiet mode.
    for note in &extraction.notes {
        eprintln!("warning: {}", note);
    }

    let (record, mut report) = reconcile(&extraction.raw);
    report.notes.extend(extraction.notes.iter().cloned());

    if !quiet {
        eprintln!("{}", report.summary());
    }

    let output = ReconcileOutput {
        record: &record,
        report: (!no_report).then_some(&report),
    };
    write_json(&output, out, pretty, quiet)
}

// ---------------------------------------------------------------------------
// inspect
// ---------------------------------------------------------------------------

fn cmd_inspect(file: &Path, pretty: bool, quiet: bool) -> Result<(), CliError> {
    let extraction = load_extraction(file, quiet)?;

    if !quiet {
        eprintln!(
            "{} top-level pairs, {} goods entries",
            extraction.raw.pairs.len(),
            extraction.raw.goods.len()
        );
    }

    let output = serde_json::json!({
        "raw": extraction.raw,
        "notes": extraction.notes,
    });
    write_json(&output, None, pretty, quiet)
}

// ---------------------------------------------------------------------------
// fields
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct FieldRow {
    name: &'static str,
    scope: &'static str,
    r#type: &'static str,
    aliases: Vec<&'static str>,
}

fn field_rows<F: Copy>(
    table: &'static [FieldSpec<F>],
    scope: &'static str,
    name: fn(F) -> &'static str,
) -> Vec<FieldRow> {
    table
        .iter()
        .map(|s| FieldRow {
            name: name(s.field),
            scope,
            r#type: s.ty.as_str(),
            aliases: s.aliases.to_vec(),
        })
        .collect()
}

fn cmd_fields(scope: Option<ScopeArg>, json: bool) -> Result<(), CliError> {
    let mut rows = Vec::new();
    if scope != Some(ScopeArg::Goods) {
        rows.extend(field_rows(DECLARATION_FIELDS, "declaration", |f| f.as_str()));
    }
    if scope != Some(ScopeArg::Declaration) {
        rows.extend(field_rows(GOODS_FIELDS, "goods", |f| f.as_str()));
    }

    if json {
        return write_json(&rows, None, true, true);
    }

    for row in rows {
        println!(
            "{:<22} {:<12} {:<8} {}",
            row.name,
            row.scope,
            row.r#type,
            row.aliases.join(", ")
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// extract login / status
// ---------------------------------------------------------------------------

fn cmd_extract_login(endpoint: String, token: Option<String>) -> Result<(), CliError> {
    let config = ServiceConfig::new(endpoint, token);
    service_config::save_config(&config).map_err(CliError::io)?;
    println!("Extraction service configured: {}", config.endpoint);
    Ok(())
}

fn cmd_extract_status() -> Result<(), CliError> {
    match service_config::load_config() {
        Some(config) => {
            let from_env = std::env::var(service_config::ENV_ENDPOINT)
                .map(|v| !v.trim().is_empty())
                .unwrap_or(false);
            println!("endpoint: {}", config.endpoint);
            println!("token:    {}", if config.token.is_some() { "set" } else { "not set" });
            println!("source:   {}", if from_env { "environment" } else { "config file" });
        }
        None => {
            println!("not configured");
            println!("run: dcla extract login --endpoint <url> [--token <token>]");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helper
// ---------------------------------------------------------------------------

fn write_json<T: serde::Serialize>(
    value: &T,
    out: Option<&Path>,
    pretty: bool,
    quiet: bool,
) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| CliError::io(format!("JSON serialization error: {}", e)))?;

    match out {
        Some(path) => {
            std::fs::write(path, json.as_bytes())
                .map_err(|e| CliError::io(format!("cannot write {}: {}", path.display(), e)))?;
            if !quiet {
                eprintln!("Wrote {}", path.display());
            }
        }
        None => println!("{}", json),
    }
    Ok(())
}
