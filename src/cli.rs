use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};
use crate::commands::analyze::AnalyzeOptions;
use crate::commands::export::ExportTargets;
use crate::rx::model::Language;

#[derive(Parser)]
#[command(name = "rxcheck")]
#[command(about = "Medication interaction analysis backed by a generative model")]
#[command(version)]
struct Cli {
    /// Print the command report as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a medication regimen
    Analyze(AnalyzeArgs),
    /// Inspect saved analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Export a saved analysis
    Export {
        /// History item id
        id: String,
        #[command(flatten)]
        targets: ExportArgs,
    },
    /// Manage the API credential
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },
    /// Show resolved paths, config and credential state
    Status,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Re-run a saved analysis; other flags edit its inputs
    #[arg(long, value_name = "ID")]
    from: Option<String>,
    /// Medication name (repeatable)
    #[arg(long = "med", required_unless_present = "from")]
    medications: Vec<String>,
    /// Remove a medication from the saved regimen (repeatable)
    #[arg(long = "drop", requires = "from")]
    drop: Vec<String>,
    /// Pre-existing conditions
    #[arg(long, required_unless_present = "from")]
    conditions: Option<String>,
    /// Other substances (alcohol, supplements, ...)
    #[arg(long)]
    substances: Option<String>,
    /// Pharmacogenetic findings
    #[arg(long)]
    pharmacogenetics: Option<String>,
    /// Date of birth (DD-MM-YYYY)
    #[arg(long)]
    dob: Option<String>,
    /// Output language (es or en)
    #[arg(long, value_parser = parse_language)]
    lang: Option<Language>,
    #[command(flatten)]
    exports: ExportArgs,
}

#[derive(Args)]
struct ExportArgs {
    /// Write a CSV export to this path
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write a PDF export to this path
    #[arg(long)]
    pdf: Option<PathBuf>,
}

impl From<ExportArgs> for ExportTargets {
    fn from(args: ExportArgs) -> Self {
        Self {
            csv: args.csv,
            pdf: args.pdf,
        }
    }
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved analyses, most recent first
    List,
    /// Show one saved analysis
    Show { id: String },
    /// Delete all saved analyses
    Clear,
}

#[derive(Subcommand)]
enum CredentialAction {
    /// Store the API key
    Set { key: String },
    /// Remove the stored API key
    Clear,
    /// Show whether a key is configured
    Status,
}

fn parse_language(raw: &str) -> Result<Language, String> {
    Language::parse(raw).ok_or_else(|| format!("unsupported language `{raw}` (use es or en)"))
}

fn print_report(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if let Some(body) = report.body.as_deref() {
        println!("{body}");
    }
    for detail in &report.details {
        println!("{detail}");
    }
    for issue in &report.issues {
        eprintln!("issue: {issue}");
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::logging::init();

    let report = match cli.command {
        Command::Analyze(args) => commands::analyze::run(&AnalyzeOptions {
            from: args.from,
            medications: args.medications,
            drop: args.drop,
            conditions: args.conditions,
            substances: args.substances,
            pharmacogenetics: args.pharmacogenetics,
            date_of_birth: args.dob,
            language: args.lang,
            exports: args.exports.into(),
        })?,
        Command::History { action } => match action {
            HistoryAction::List => commands::history::list()?,
            HistoryAction::Show { id } => commands::history::show(&id)?,
            HistoryAction::Clear => commands::history::clear()?,
        },
        Command::Export { id, targets } => commands::export::run(&id, &targets.into())?,
        Command::Credential { action } => match action {
            CredentialAction::Set { key } => commands::credential::set(&key)?,
            CredentialAction::Clear => commands::credential::clear()?,
            CredentialAction::Status => commands::credential::status()?,
        },
        Command::Status => commands::status::run()?,
    };

    print_report(&report, cli.json)?;
    if !report.ok {
        std::process::exit(2);
    }
    Ok(())
}
