pub mod batch;
pub mod rules;
pub mod types;

pub use batch::{apply_checks, ComplianceSummary};
pub use rules::check_claim;
pub use types::{Claim, ComplianceIssue, EvaluatedClaim};
