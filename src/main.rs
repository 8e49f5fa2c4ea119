mod attestation;
mod cli;
mod compliance;
mod config;
mod demo;
mod error;
mod export;
mod storage;
mod utils;

use attestation::{AttestationService, ReminderSink};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use colored::*;
use compliance::ComplianceSummary;
use config::Config;
use std::str::FromStr;
use storage::{AttestationStatus, ClaimFilter, ClaimWithAttestation, Database};
use tracing::{error, info};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("payer_compliance_scrub=debug,info")
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Init => initialize(&config, &cli.config),

        Commands::Demo { rows, output } => {
            info!("Generating {} demo claims", rows);
            write_demo_csv(rows, &output)
        }

        Commands::Check {
            input,
            output,
            verbose,
        } => {
            info!("Running compliance checks on {}", input);
            check_claims(&input, output.as_deref(), verbose)
        }

        Commands::Ingest { input } => {
            info!("Ingesting claims from {}", input);
            ingest_claims(&config, &input)
        }

        Commands::List {
            provider,
            status,
            issue,
            format,
        } => list_claims(&config, provider, status, issue, &format),

        Commands::Sign { claim_id, name } => sign_claim(&config, &claim_id, &name),

        Commands::Verify { claim_id } => verify_claim(&config, &claim_id),

        Commands::Reset { claim_id, yes } => reset_claim(&config, &claim_id, yes),

        Commands::Remind {
            threshold_hours,
            dry_run,
        } => {
            let threshold = threshold_hours.unwrap_or(config.reminders.threshold_hours);
            send_reminders(&config, threshold, dry_run)
        }

        Commands::Stats { format } => show_stats(&config, &format),

        Commands::Export { input, output } => {
            let output = output.unwrap_or_else(|| config.export.zip_filename.clone());
            export_attestations(&config, input.as_deref(), &output)
        }

        Commands::Cleanup => cleanup(&config),
    };

    if let Err(e) = result {
        error!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn initialize(config: &Config, config_path: &str) -> error::Result<()> {
    println!("{}", "Initializing Payer Compliance Scrub...".green());

    let _db = Database::new(&config.database.path)?;
    println!("{}", "✓ Database initialized".green());

    let starter_path = format!("{}.toml", config_path);
    if !std::path::Path::new(&starter_path).exists() {
        if let Some(parent) = std::path::Path::new(&starter_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&starter_path, Config::starter_toml())?;
        println!("{}", format!("✓ Wrote starter config to {}", starter_path).green());
    }

    println!("\n{}", "Configuration:".cyan());
    println!("  Database:           {}", config.database.path);
    println!("  Reminder threshold: {} hours", config.reminders.threshold_hours);
    println!("  CSV export:         {}", config.export.csv_filename);
    println!("  ZIP export:         {}", config.export.zip_filename);

    println!("\n{}", "Ready to use! Try running:".cyan());
    println!("  {} to create sample data", "compliance-scrub demo".yellow());
    println!("  {} to run the rules", "compliance-scrub check sample_claims.csv".yellow());
    println!("  {} to start tracking attestations", "compliance-scrub ingest sample_claims.csv".yellow());
    Ok(())
}

fn write_demo_csv(rows: usize, output: &str) -> error::Result<()> {
    let claims = demo::generate_demo_claims(rows);
    let bytes = export::claims_csv_bytes(&claims)?;
    std::fs::write(output, bytes)?;
    println!(
        "{}",
        format!("✓ Wrote {} demo claims to {}", claims.len(), output).green()
    );
    Ok(())
}

fn load_claims_csv(input: &str) -> error::Result<Vec<compliance::Claim>> {
    let file = std::fs::File::open(input)?;
    export::read_claims(file)
}

fn check_claims(input: &str, output: Option<&str>, verbose: bool) -> error::Result<()> {
    let claims = load_claims_csv(input)?;
    let batch = compliance::apply_checks(&claims)?;

    let summary = ComplianceSummary::from_batch(&batch);
    summary.print_summary();

    if verbose {
        let flagged: Vec<_> = batch.iter().filter(|e| e.is_flagged()).collect();
        if !flagged.is_empty() {
            println!("\n{}", "Flagged Claims:".yellow());
            utils::print_table_border(110);
            utils::print_table_row(&["ClaimID", "Provider", "Issues"], &[10, 38, 58]);
            utils::print_table_border(110);
            for record in flagged {
                utils::print_table_row(
                    &[
                        &record.claim.claim_id,
                        &utils::truncate(&record.claim.provider, 38),
                        &utils::truncate(&record.issues_text(), 58),
                    ],
                    &[10, 38, 58],
                );
            }
            utils::print_table_border(110);
        }
    }

    if let Some(path) = output {
        let bytes = export::cleaned_csv_bytes(&batch)?;
        std::fs::write(path, bytes)?;
        println!("{}", format!("✓ Wrote augmented batch to {}", path).green());
    }

    Ok(())
}

fn ingest_claims(config: &Config, input: &str) -> error::Result<()> {
    let claims = load_claims_csv(input)?;

    let db = Database::new(&config.database.path)?;
    let mut service = AttestationService::new(db);
    let batch = service.ingest_batch(&claims)?;

    let summary = ComplianceSummary::from_batch(&batch);
    summary.print_summary();
    println!(
        "{}",
        format!(
            "✓ {} flagged claims tracked for attestation",
            summary.flagged_claims
        )
        .green()
    );
    Ok(())
}

fn parse_filter(
    provider: Option<String>,
    status: Option<String>,
    issue: Option<String>,
) -> error::Result<ClaimFilter> {
    let status = match status {
        Some(s) => Some(AttestationStatus::from_str(&s)?),
        None => None,
    };
    Ok(ClaimFilter {
        provider,
        status,
        issue_substring: issue,
    })
}

fn list_claims(
    config: &Config,
    provider: Option<String>,
    status: Option<String>,
    issue: Option<String>,
    format: &str,
) -> error::Result<()> {
    let db = Database::new(&config.database.path)?;
    let rows = db.list_claims(&parse_filter(provider, status, issue)?)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("{}", "No tracked claims match the filter".yellow());
        return Ok(());
    }

    println!("{}", "=== Tracked Claims ===".cyan().bold());
    utils::print_table_border(120);
    utils::print_table_row(
        &["ClaimID", "Provider", "Status", "Signed By", "Issues"],
        &[10, 32, 10, 20, 40],
    );
    utils::print_table_border(120);
    for row in &rows {
        utils::print_table_row(
            &[
                &row.claim_id,
                &utils::truncate(&row.provider, 32),
                &utils::format_status(row.status),
                row.signed_name.as_deref().unwrap_or("-"),
                &utils::truncate(&row.issues, 40),
            ],
            &[10, 32, 10, 20, 40],
        );
    }
    utils::print_table_border(120);
    println!("{} claims", rows.len());
    Ok(())
}

fn sign_claim(config: &Config, claim_id: &str, name: &str) -> error::Result<()> {
    let db = Database::new(&config.database.path)?;
    let service = AttestationService::new(db);
    service.sign(claim_id, name, None)?;
    println!(
        "{}",
        format!("✓ Attestation for {} signed by {}", claim_id, name).green()
    );
    Ok(())
}

fn verify_claim(config: &Config, claim_id: &str) -> error::Result<()> {
    let db = Database::new(&config.database.path)?;
    let service = AttestationService::new(db);
    service.verify(claim_id, None)?;
    println!("{}", format!("✓ Attestation for {} verified", claim_id).green());
    Ok(())
}

fn reset_claim(config: &Config, claim_id: &str, yes: bool) -> error::Result<()> {
    if !yes
        && !utils::confirm_action(&format!(
            "Reset attestation for {} back to Pending?",
            claim_id
        ))
    {
        println!("Cancelled");
        return Ok(());
    }

    let db = Database::new(&config.database.path)?;
    let service = AttestationService::new(db);
    service.reset(claim_id)?;
    println!("{}", format!("✓ Attestation for {} reset to Pending", claim_id).yellow());
    Ok(())
}

/// Reminder sink for interactive runs: one console line per claim.
struct ConsoleReminderSink;

impl ReminderSink for ConsoleReminderSink {
    fn remind(&self, record: &ClaimWithAttestation) {
        println!(
            "  {} {} ({}) pending since {}",
            "→".cyan(),
            record.claim_id,
            utils::truncate(&record.provider, 32),
            utils::format_timestamp(&record.created_at)
        );
    }
}

fn send_reminders(config: &Config, threshold_hours: i64, dry_run: bool) -> error::Result<()> {
    let db = Database::new(&config.database.path)?;
    let service = AttestationService::new(db);
    let now = Utc::now();

    if dry_run {
        let pending = service.db().list_claims(&ClaimFilter {
            status: Some(AttestationStatus::Pending),
            ..Default::default()
        })?;
        let due: Vec<_> = pending
            .iter()
            .filter(|r| attestation::reminders::is_reminder_due(r, now, threshold_hours))
            .collect();

        println!("{}", "DRY RUN: no reminders will be recorded".yellow());
        for record in &due {
            ConsoleReminderSink.remind(record);
        }
        println!("{} attestations due for reminder", due.len());
        return Ok(());
    }

    let reminded = service.compute_reminders(now, threshold_hours, &ConsoleReminderSink)?;
    println!(
        "{}",
        format!("✓ Reminded {} pending attestations", reminded).green()
    );
    Ok(())
}

fn show_stats(config: &Config, format: &str) -> error::Result<()> {
    let db = Database::new(&config.database.path)?;
    let stats = db.attestation_stats()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "=== Attestation Statistics ===".cyan().bold());
    println!("  Pending:   {}", stats.pending.to_string().yellow());
    println!("  Signed:    {}", stats.signed.to_string().cyan());
    println!("  Verified:  {}", stats.verified.to_string().green());
    println!("  Total:     {}", stats.total());
    Ok(())
}

fn export_attestations(
    config: &Config,
    input: Option<&str>,
    output: &str,
) -> error::Result<()> {
    let forms: Vec<export::AttestationForm> = match input {
        Some(path) => {
            let claims = load_claims_csv(path)?;
            let batch = compliance::apply_checks(&claims)?;
            batch.iter().map(export::AttestationForm::from).collect()
        }
        None => {
            let db = Database::new(&config.database.path)?;
            let rows = db.list_claims(&ClaimFilter::default())?;
            rows.iter().map(export::AttestationForm::from).collect()
        }
    };

    let bytes = export::zip_attestations(&forms)?;
    std::fs::write(output, &bytes)?;
    println!(
        "{}",
        format!("✓ Wrote attestation bundle to {} ({} bytes)", output, bytes.len()).green()
    );
    Ok(())
}

fn cleanup(config: &Config) -> error::Result<()> {
    let db = Database::new(&config.database.path)?;
    let removed = db.cleanup_duplicate_attestations()?;
    if removed == 0 {
        println!("{}", "No duplicate attestation rows found".green());
    } else {
        println!(
            "{}",
            format!("✓ Removed {} duplicate attestation rows", removed).yellow()
        );
    }
    Ok(())
}
