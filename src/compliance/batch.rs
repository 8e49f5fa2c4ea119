use crate::{
    compliance::rules::check_claim,
    compliance::types::{Claim, EvaluatedClaim},
    error::{Result, ScrubError},
};
use tracing::info;

/// Run the rule evaluator across an ordered batch of claims.
///
/// Input order is preserved and the source slice is never mutated, so
/// callers can keep original and processed views side by side. An empty
/// batch is a caller error (re-upload needed), not a silent no-op.
pub fn apply_checks(claims: &[Claim]) -> Result<Vec<EvaluatedClaim>> {
    if claims.is_empty() {
        return Err(ScrubError::Validation(
            "cannot process empty batch".to_string(),
        ));
    }

    let evaluated: Vec<EvaluatedClaim> = claims
        .iter()
        .map(|claim| EvaluatedClaim {
            claim: claim.clone(),
            issues: check_claim(claim),
        })
        .collect();

    let flagged = evaluated.iter().filter(|e| e.is_flagged()).count();
    info!(
        "Processed {} claims, {} flagged",
        evaluated.len(),
        flagged
    );

    Ok(evaluated)
}

/// Summary of one compliance run.
#[derive(Debug, Default, serde::Serialize)]
pub struct ComplianceSummary {
    pub total_claims: usize,
    pub flagged_claims: usize,
    pub clean_claims: usize,
    pub compliance_rate: f64,
}

impl ComplianceSummary {
    pub fn from_batch(batch: &[EvaluatedClaim]) -> Self {
        let total_claims = batch.len();
        let flagged_claims = batch.iter().filter(|e| e.is_flagged()).count();
        let clean_claims = total_claims - flagged_claims;
        let compliance_rate = if total_claims == 0 {
            0.0
        } else {
            clean_claims as f64 / total_claims as f64 * 100.0
        };

        Self {
            total_claims,
            flagged_claims,
            clean_claims,
            compliance_rate,
        }
    }

    /// Print a formatted summary to console
    pub fn print_summary(&self) {
        println!("\n=== Compliance Check Summary ===");
        println!("Total Claims:    {}", self.total_claims);
        println!("Flagged:         {} ✗", self.flagged_claims);
        println!("Clean:           {} ✓", self.clean_claims);
        println!("Compliance Rate: {:.1}%", self.compliance_rate);
        println!("================================");
    }
}
