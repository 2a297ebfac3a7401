//! Settle-up CLI
//!
//! Reads a trip document and prints balances, transfers and the cost table
//! summary.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use trip_settlement::{
    Config, CostRange, CostSummary, SettlementEngine, SettlementReport, TripDocument,
};

const COST_LABEL_WIDTH: usize = 18;

#[derive(Debug, Parser)]
#[command(
    name = "settle",
    version,
    about = "Compute who pays whom for a shared trip expense ledger."
)]
struct Cli {
    /// Trip document (JSON) with `members`, `expenses` and optional `costs`.
    document: PathBuf,

    /// TOML config file (default: TRIP_SETTLEMENT_* environment variables).
    #[arg(long, env = "TRIP_SETTLEMENT_CONFIG")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Emit logs as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Output {
    report: SettlementReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    costs: Option<CostSummary>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:?}", e);
            let invalid_input = e
                .downcast_ref::<trip_settlement::Error>()
                .is_some_and(trip_settlement::Error::is_invalid_input);
            ExitCode::from(if invalid_input { 2 } else { 1 })
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::from_env().context("reading TRIP_SETTLEMENT_* environment")?,
    };
    let engine = SettlementEngine::new(config)?;

    let document = TripDocument::from_file(&cli.document)
        .with_context(|| format!("reading trip document {}", cli.document.display()))?;
    info!(
        members = document.members.len(),
        expenses = document.expenses.len(),
        "Loaded trip document"
    );

    let ledger = document.to_ledger(engine.config().member_policy)?;
    let report = engine.settle(&ledger)?;
    let costs = document
        .costs
        .as_ref()
        .map(|costs| engine.summarize_costs(costs, ledger.members().len()))
        .transpose()?;

    let output = Output { report, costs };
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Text => print_text(&output),
    }

    Ok(())
}

fn print_text(output: &Output) {
    let report = &output.report;
    let width = report
        .positions
        .iter()
        .map(|p| p.member.as_str().chars().count())
        .max()
        .unwrap_or(0);

    println!("BALANCES");
    for position in &report.positions {
        println!(
            "  {:<width$}  paid {:>10}  net {:>+10}",
            position.member.as_str(),
            position.total_paid,
            position.net_position.round_dp(0),
        );
    }

    println!();
    println!("TRANSFERS");
    if report.transfers.is_empty() {
        println!("  (everyone is settled)");
    }
    for transfer in &report.transfers {
        println!(
            "  {:<width$} -> {:<width$}  {:>10}",
            transfer.from.as_str(),
            transfer.to.as_str(),
            transfer.amount,
        );
    }

    println!();
    println!(
        "{} expenses, {} spent, {} transferred",
        report.stats.expense_count, report.stats.total_spent, report.stats.transfer_total
    );

    if let Some(costs) = &output.costs {
        println!();
        println!("COSTS");
        print_cost_row("shared total", &costs.shared_total);
        print_cost_row(&format!("per person ({})", costs.people), &costs.per_person);
        if costs.individual_total.max > Decimal::ZERO {
            print_cost_row("individual", &costs.individual_total);
        }
    }
}

fn print_cost_row(label: &str, amount: &CostRange) {
    println!("{}", cost_row(label, amount));
}

fn cost_row(label: &str, amount: &CostRange) -> String {
    format!("  {:<width$}  {}", label, amount, width = COST_LABEL_WIDTH)
}
