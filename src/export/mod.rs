pub mod archive;
pub mod csv;
pub mod pdf;

pub use archive::zip_attestations;
pub use csv::{claims_csv_bytes, cleaned_csv_bytes, read_claims};
pub use pdf::make_attestation_pdf;

use crate::compliance::types::EvaluatedClaim;
use crate::storage::models::{AttestationStatus, ClaimWithAttestation};

/// Input to the attestation artifact generators.
///
/// Both export sources flow through this one shape: a freshly evaluated
/// batch (no attestation state yet) and the deduplicated dashboard view
/// (which carries signature and reminder state).
#[derive(Debug, Clone)]
pub struct AttestationForm {
    pub claim_id: String,
    pub patient_id: String,
    pub provider: String,
    pub icd10: String,
    pub proc_code: String,
    pub service_date: String,
    pub issues: Vec<String>,
    pub status: Option<AttestationStatus>,
    pub signed_name: Option<String>,
    pub signed_at: Option<String>,
    pub verified_at: Option<String>,
    pub last_reminder_at: Option<String>,
}

impl From<&EvaluatedClaim> for AttestationForm {
    fn from(record: &EvaluatedClaim) -> Self {
        Self {
            claim_id: record.claim.claim_id.clone(),
            patient_id: record.claim.patient_id.clone(),
            provider: record.claim.provider.clone(),
            icd10: record.claim.icd10.clone(),
            proc_code: record.claim.proc_code.clone(),
            service_date: record.claim.service_date.clone(),
            issues: record.issues.iter().map(|i| i.to_string()).collect(),
            status: None,
            signed_name: None,
            signed_at: None,
            verified_at: None,
            last_reminder_at: None,
        }
    }
}

impl From<&ClaimWithAttestation> for AttestationForm {
    fn from(row: &ClaimWithAttestation) -> Self {
        Self {
            claim_id: row.claim_id.clone(),
            patient_id: row.patient_id.clone(),
            provider: row.provider.clone(),
            icd10: row.icd10.clone(),
            proc_code: row.proc_code.clone(),
            service_date: row.service_date.clone(),
            issues: row.issue_list(),
            status: row.status,
            signed_name: row.signed_name.clone(),
            signed_at: row.signed_at.clone(),
            verified_at: row.verified_at.clone(),
            last_reminder_at: row.last_reminder_at.clone(),
        }
    }
}
