use serde::{Deserialize, Serialize};

/// One billed healthcare service record under compliance review.
///
/// Claims are immutable once read. Absent fields are carried as empty
/// strings, never `None` - blank CSV cells and missing columns must behave
/// identically under the whitespace-trim rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: String,
    pub patient_id: String,
    pub provider: String,
    pub icd10: String,
    pub proc_code: String,
    pub doc_status: String,
    pub service_date: String,
}

/// A named compliance-rule violation attached to a claim.
///
/// The variants form the fixed issue vocabulary; `Display` renders the
/// canonical label text that is persisted and exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceIssue {
    MissingDocumentation,
    MismatchedDocumentation,
    HighAuditRiskDiagnosis,
    UnattachedHighCostProcedure,
}

impl std::fmt::Display for ComplianceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceIssue::MissingDocumentation => write!(f, "Missing documentation"),
            ComplianceIssue::MismatchedDocumentation => write!(f, "Mismatched documentation"),
            ComplianceIssue::HighAuditRiskDiagnosis => write!(f, "High-audit-risk diagnosis"),
            ComplianceIssue::UnattachedHighCostProcedure => {
                write!(f, "High-cost procedure requires attached documentation")
            }
        }
    }
}

/// A claim augmented with its evaluated issue list, in discovery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedClaim {
    pub claim: Claim,
    pub issues: Vec<ComplianceIssue>,
}

impl EvaluatedClaim {
    pub fn is_flagged(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Issue labels joined for persistence and CSV export.
    pub fn issues_text(&self) -> String {
        self.issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
