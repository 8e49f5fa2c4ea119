use crate::compliance::types::{Claim, ComplianceIssue};

/// Procedure codes that require attached documentation.
pub const HIGH_COST_PROCEDURES: &[&str] = &["J9355", "J1940"];

/// ICD-10 prefixes that draw payer audit attention.
pub const HIGH_AUDIT_RISK_PREFIXES: &[&str] = &["I50", "C50"];

/// Evaluate one claim against the compliance rule set.
///
/// Pure and infallible: malformed or missing fields degrade to a non-match
/// for the affected rule. Issues are returned in rule-declaration order,
/// which downstream exports and tests rely on.
pub fn check_claim(claim: &Claim) -> Vec<ComplianceIssue> {
    let mut issues = Vec::new();

    // Rule 1: documentation status blank after trimming
    if claim.doc_status.trim().is_empty() {
        issues.push(ComplianceIssue::MissingDocumentation);
    }

    // Rule 2: high-cost procedures need "Attached", not "Complete"
    if claim.doc_status == "Complete" && is_high_cost(&claim.proc_code) {
        issues.push(ComplianceIssue::MismatchedDocumentation);
    }

    // Rule 3: high-audit-risk diagnosis prefix, any suffix
    if HIGH_AUDIT_RISK_PREFIXES
        .iter()
        .any(|p| claim.icd10.starts_with(p))
    {
        issues.push(ComplianceIssue::HighAuditRiskDiagnosis);
    }

    // Rule 4: high-cost procedure without attached documentation
    if is_high_cost(&claim.proc_code) && claim.doc_status != "Attached" {
        issues.push(ComplianceIssue::UnattachedHighCostProcedure);
    }

    issues
}

fn is_high_cost(proc_code: &str) -> bool {
    HIGH_COST_PROCEDURES.iter().any(|c| *c == proc_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(icd10: &str, proc_code: &str, doc_status: &str) -> Claim {
        Claim {
            claim_id: "CLM0001".to_string(),
            patient_id: "PAT0001".to_string(),
            provider: "Dr. Sarah Johnson - Cardiology".to_string(),
            icd10: icd10.to_string(),
            proc_code: proc_code.to_string(),
            doc_status: doc_status.to_string(),
            service_date: "2024-03-15".to_string(),
        }
    }

    #[test]
    fn test_clean_claim_has_no_issues() {
        assert!(check_claim(&claim("Z51.11", "J9355", "Attached")).is_empty());
        assert!(check_claim(&claim("E11.9", "99213", "Complete")).is_empty());
    }

    #[test]
    fn test_missing_documentation() {
        assert_eq!(
            check_claim(&claim("Z51.11", "99213", "")),
            vec![ComplianceIssue::MissingDocumentation]
        );
        // whitespace-only trims to empty
        assert_eq!(
            check_claim(&claim("Z51.11", "99213", "   ")),
            vec![ComplianceIssue::MissingDocumentation]
        );
    }

    #[test]
    fn test_mismatched_documentation() {
        let issues = check_claim(&claim("L70.9", "J1940", "Complete"));
        assert_eq!(
            issues,
            vec![
                ComplianceIssue::MismatchedDocumentation,
                ComplianceIssue::UnattachedHighCostProcedure,
            ]
        );
        // "Complete" on a normal procedure is fine
        assert!(check_claim(&claim("L70.9", "99215", "Complete")).is_empty());
    }

    #[test]
    fn test_high_audit_risk_diagnosis_prefixes() {
        for code in ["I50", "I50.9", "C50", "C50.911"] {
            let issues = check_claim(&claim(code, "99213", "Complete"));
            assert_eq!(issues, vec![ComplianceIssue::HighAuditRiskDiagnosis]);
        }
        assert!(check_claim(&claim("I51.9", "99213", "Complete")).is_empty());
    }

    #[test]
    fn test_high_cost_requires_attached() {
        for status in ["Pending", "Review", "complete"] {
            let issues = check_claim(&claim("Z51.11", "J9355", status));
            assert_eq!(issues, vec![ComplianceIssue::UnattachedHighCostProcedure]);
        }
    }

    #[test]
    fn test_issue_ordering_is_rule_declaration_order() {
        let issues = check_claim(&claim("I50.9", "J9355", ""));
        assert_eq!(
            issues,
            vec![
                ComplianceIssue::MissingDocumentation,
                ComplianceIssue::HighAuditRiskDiagnosis,
                ComplianceIssue::UnattachedHighCostProcedure,
            ]
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let c = claim("C50.911", "J1940", "Complete");
        assert_eq!(check_claim(&c), check_claim(&c));
    }

    #[test]
    fn test_canonical_labels() {
        assert_eq!(
            ComplianceIssue::MissingDocumentation.to_string(),
            "Missing documentation"
        );
        assert_eq!(
            ComplianceIssue::UnattachedHighCostProcedure.to_string(),
            "High-cost procedure requires attached documentation"
        );
    }
}
