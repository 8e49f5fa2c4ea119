use crate::compliance::types::Claim;
use rand::{rngs::StdRng, Rng, SeedableRng};

const PROVIDERS: &[&str] = &[
    "Dr. Sarah Johnson - Cardiology",
    "Dr. Michael Chen - Orthopedics",
    "Dr. Emily Rodriguez - Internal Medicine",
    "Dr. James Wilson - Dermatology",
    "Dr. Lisa Thompson - Pediatrics",
    "Dr. Robert Martinez - Family Practice",
];

// Mix of routine visits and the high-cost J-codes the rules key on
const PROC_CODES: &[&str] = &[
    "99213", "99214", "99215", "99202", "99203", "99204", "J9355", "J1940",
];

// Includes the high-audit-risk I50/C50 prefixes
const ICD10_CODES: &[&str] = &[
    "Z51.11", "E11.9", "M25.561", "L70.9", "I50.9", "C50.911", "J44.1", "N39.0",
];

const DOC_STATUSES: &[&str] = &["Complete", "Attached", "Pending", "", "Review"];

/// Generate a deterministic synthetic claims batch.
///
/// Seeded so that demo runs and tests see the same data; the code pools
/// are weighted to flag roughly half of the claims.
pub fn generate_demo_claims(rows: usize) -> Vec<Claim> {
    let mut rng = StdRng::seed_from_u64(42);

    (0..rows)
        .map(|i| {
            let pick = |pool: &[&str], rng: &mut StdRng| -> String {
                pool[rng.gen_range(0..pool.len())].to_string()
            };

            Claim {
                claim_id: format!("CLM{:04}", i + 1),
                patient_id: format!("PAT{:04}", i + 1),
                provider: pick(PROVIDERS, &mut rng),
                icd10: pick(ICD10_CODES, &mut rng),
                proc_code: pick(PROC_CODES, &mut rng),
                doc_status: pick(DOC_STATUSES, &mut rng),
                service_date: format!(
                    "2024-{:02}-{:02}",
                    rng.gen_range(1..=12),
                    rng.gen_range(1..=28)
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::apply_checks;

    #[test]
    fn test_deterministic_output() {
        assert_eq!(generate_demo_claims(20), generate_demo_claims(20));
    }

    #[test]
    fn test_row_count_and_unique_ids() {
        let claims = generate_demo_claims(50);
        assert_eq!(claims.len(), 50);
        let mut ids: Vec<_> = claims.iter().map(|c| c.claim_id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_demo_batch_exercises_the_rules() {
        let claims = generate_demo_claims(50);
        let batch = apply_checks(&claims).unwrap();
        let flagged = batch.iter().filter(|e| e.is_flagged()).count();
        assert!(flagged > 0);
        assert!(flagged < claims.len());
    }
}
