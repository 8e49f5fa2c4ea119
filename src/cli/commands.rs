use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "compliance-scrub")]
#[command(about = "Claims compliance checking and provider attestation tracking")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/default")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database and configuration
    Init,

    /// Generate a synthetic sample claims CSV
    Demo {
        /// Number of claims to generate
        #[arg(short, long, default_value = "50")]
        rows: usize,

        /// Output CSV path
        #[arg(short, long, default_value = "sample_claims.csv")]
        output: String,
    },

    /// Run compliance checks over a claims CSV (no persistence)
    Check {
        /// Input claims CSV
        input: String,

        /// Write the augmented batch to this CSV path
        #[arg(short, long)]
        output: Option<String>,

        /// Show every flagged claim
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run compliance checks and persist flagged claims for attestation
    Ingest {
        /// Input claims CSV
        input: String,
    },

    /// List tracked claims with their attestation state
    List {
        /// Filter by provider substring
        #[arg(short, long)]
        provider: Option<String>,

        /// Filter by attestation status (Pending, Signed, Verified)
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by issue text substring
        #[arg(short, long)]
        issue: Option<String>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Record a provider signature on a pending attestation
    Sign {
        /// Claim ID to sign
        claim_id: String,

        /// Name of the signing provider
        #[arg(short, long)]
        name: String,
    },

    /// Mark a signed attestation as verified
    Verify {
        /// Claim ID to verify
        claim_id: String,
    },

    /// Reset an attestation back to Pending
    Reset {
        /// Claim ID to reset
        claim_id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Send reminders for stale pending attestations
    Remind {
        /// Override the reminder threshold in hours
        #[arg(long)]
        threshold_hours: Option<i64>,

        /// List due reminders without recording them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show attestation statistics
    Stats {
        /// Output format: table or json
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Package attestation PDFs and an audit summary into a ZIP
    Export {
        /// Evaluate this claims CSV instead of the tracked claims
        #[arg(short, long)]
        input: Option<String>,

        /// Output ZIP path (defaults to the configured filename)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Compact duplicate attestation rows
    Cleanup,
}
