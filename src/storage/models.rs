use crate::error::ScrubError;
use serde::{Deserialize, Serialize};

/// Attestation lifecycle: Pending (initial) -> Signed -> Verified (terminal).
///
/// The store itself does not forbid backward transitions; callers only
/// exercise the forward path, plus a manual reset to Pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttestationStatus {
    Pending,
    Signed,
    Verified,
}

impl std::fmt::Display for AttestationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttestationStatus::Pending => write!(f, "Pending"),
            AttestationStatus::Signed => write!(f, "Signed"),
            AttestationStatus::Verified => write!(f, "Verified"),
        }
    }
}

impl std::str::FromStr for AttestationStatus {
    type Err = ScrubError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(AttestationStatus::Pending),
            "Signed" => Ok(AttestationStatus::Signed),
            "Verified" => Ok(AttestationStatus::Verified),
            other => Err(ScrubError::InvalidStatus(other.to_string())),
        }
    }
}

/// One row of the deduplicated claim + attestation view: a flagged claim
/// snapshot joined to its most-recent attestation record.
///
/// Timestamps stay in their persisted RFC 3339 text form. Historical rows
/// can carry values this process never wrote, and the reminder path needs
/// to degrade an unparseable `last_reminder_at` to "never reminded" rather
/// than fail the whole read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimWithAttestation {
    pub claim_id: String,
    pub patient_id: String,
    pub provider: String,
    pub icd10: String,
    pub proc_code: String,
    pub doc_status: String,
    pub service_date: String,
    pub issues: String,
    pub status: Option<AttestationStatus>,
    pub signed_name: Option<String>,
    pub signed_at: Option<String>,
    pub verified_at: Option<String>,
    pub last_reminder_at: Option<String>,
    pub created_at: String,
}

impl ClaimWithAttestation {
    /// Issue labels split back out of the persisted semicolon-joined text.
    pub fn issue_list(&self) -> Vec<String> {
        self.issues
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

/// Optional predicates for `Database::list_claims`.
#[derive(Debug, Default, Clone)]
pub struct ClaimFilter {
    pub provider: Option<String>,
    pub status: Option<AttestationStatus>,
    pub issue_substring: Option<String>,
}

/// Per-status counts over the deduplicated attestation view.
#[derive(Debug, Default, Clone, Serialize)]
pub struct AttestationStats {
    pub pending: usize,
    pub signed: usize,
    pub verified: usize,
}

impl AttestationStats {
    pub fn total(&self) -> usize {
        self.pending + self.signed + self.verified
    }
}
