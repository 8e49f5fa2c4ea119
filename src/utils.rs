use colored::Colorize;

/// Strip a provider name down to filename-safe characters: alphanumerics,
/// spaces, hyphens and underscores survive, trailing whitespace is trimmed,
/// then spaces become underscores.
pub fn sanitize_provider(provider: &str) -> String {
    provider
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .replace(' ', "_")
}

/// Filename for one claim's attestation PDF.
pub fn attestation_pdf_filename(claim_id: &str, provider: &str) -> String {
    format!("Claim_{}_{}.pdf", claim_id, sanitize_provider(provider))
}

/// Format an RFC 3339 timestamp for table display, passing through values
/// that do not parse.
pub fn format_timestamp(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Truncate long cell text for table display.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Render an attestation status cell with color.
pub fn format_status(status: Option<crate::storage::models::AttestationStatus>) -> String {
    use crate::storage::models::AttestationStatus;
    match status {
        Some(AttestationStatus::Pending) => "Pending".yellow().to_string(),
        Some(AttestationStatus::Signed) => "Signed".cyan().to_string(),
        Some(AttestationStatus::Verified) => "Verified".green().to_string(),
        None => "-".to_string(),
    }
}

/// Prompt user for yes/no confirmation
pub fn confirm_action(prompt: &str) -> bool {
    use std::io::{self, Write};

    print!("{} (y/N): ", prompt);
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print a formatted table border
pub fn print_table_border(width: usize) {
    println!("{}", "=".repeat(width));
}

/// Print a table row with columns
pub fn print_table_row(columns: &[&str], widths: &[usize]) {
    let mut row = String::new();
    for (i, col) in columns.iter().enumerate() {
        if i < widths.len() {
            row.push_str(&format!("{:<width$}  ", col, width = widths[i]));
        }
    }
    println!("{}", row.trim_end());
}
