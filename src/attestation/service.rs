use crate::{
    attestation::reminders::{is_reminder_due, ReminderSink},
    compliance::{apply_checks, Claim, EvaluatedClaim},
    error::{Result, ScrubError},
    storage::{
        models::{AttestationStatus, ClaimFilter},
        Database,
    },
};
use chrono::{DateTime, Utc};
use tracing::info;

/// Orchestrates the compliance pipeline into the attestation store and
/// exposes the workflow mutations the presentation layer calls.
pub struct AttestationService {
    db: Database,
}

impl AttestationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Evaluate a raw batch and persist every flagged claim. Returns the
    /// augmented batch for display; persistence failures abort the whole
    /// ingestion.
    pub fn ingest_batch(&mut self, claims: &[Claim]) -> Result<Vec<EvaluatedClaim>> {
        let batch = apply_checks(claims)?;
        let written = self.db.upsert_flagged_claims(&batch)?;
        info!("Ingested batch: {} claims, {} flagged", batch.len(), written);
        Ok(batch)
    }

    /// Pending -> Signed. The signer name is required here, not at the
    /// data layer.
    pub fn sign(
        &self,
        claim_id: &str,
        signer: &str,
        when: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if signer.trim().is_empty() {
            return Err(ScrubError::Validation(
                "signer name is required to sign an attestation".to_string(),
            ));
        }
        self.db
            .set_attestation_status(claim_id, AttestationStatus::Signed, Some(signer), when)
    }

    /// Signed -> Verified (terminal).
    pub fn verify(&self, claim_id: &str, when: Option<DateTime<Utc>>) -> Result<()> {
        self.db
            .set_attestation_status(claim_id, AttestationStatus::Verified, None, when)
    }

    /// Manual reset back to Pending. Not part of the normal forward flow.
    pub fn reset(&self, claim_id: &str) -> Result<()> {
        self.db
            .set_attestation_status(claim_id, AttestationStatus::Pending, None, None)
    }

    /// Remind every Pending attestation whose last reminder is absent,
    /// unparseable, or older than the threshold. Each reminded claim is
    /// stamped with `as_of`. Returns the count reminded.
    pub fn compute_reminders(
        &self,
        as_of: DateTime<Utc>,
        threshold_hours: i64,
        sink: &dyn ReminderSink,
    ) -> Result<usize> {
        let pending = self.db.list_claims(&ClaimFilter {
            status: Some(AttestationStatus::Pending),
            ..Default::default()
        })?;

        let mut reminded = 0usize;
        for record in &pending {
            if !is_reminder_due(record, as_of, threshold_hours) {
                continue;
            }
            sink.remind(record);
            self.db.mark_reminded(&record.claim_id, Some(as_of))?;
            reminded += 1;
        }

        info!(
            "Reminders: {} of {} pending attestations reminded",
            reminded,
            pending.len()
        );
        Ok(reminded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::cell::RefCell;

    struct CollectingSink {
        reminded: RefCell<Vec<String>>,
    }

    impl CollectingSink {
        fn new() -> Self {
            Self {
                reminded: RefCell::new(Vec::new()),
            }
        }
    }

    impl ReminderSink for CollectingSink {
        fn remind(&self, record: &crate::storage::models::ClaimWithAttestation) {
            self.reminded.borrow_mut().push(record.claim_id.clone());
        }
    }

    fn claim(id: &str, icd10: &str, proc_code: &str, doc_status: &str) -> Claim {
        Claim {
            claim_id: id.to_string(),
            patient_id: format!("PAT-{}", id),
            provider: "Dr. Michael Chen - Orthopedics".to_string(),
            icd10: icd10.to_string(),
            proc_code: proc_code.to_string(),
            doc_status: doc_status.to_string(),
            service_date: "2024-02-11".to_string(),
        }
    }

    fn service_with_flagged_claims() -> AttestationService {
        let db = Database::open_in_memory().unwrap();
        let mut service = AttestationService::new(db);
        service
            .ingest_batch(&[
                claim("CLM0001", "I50.9", "J9355", ""),
                claim("CLM0002", "C50.911", "99213", "Complete"),
                claim("CLM0003", "Z51.11", "99213", "Complete"), // clean
            ])
            .unwrap();
        service
    }

    #[test]
    fn test_ingest_round_trip_single_pending_per_claim() {
        let mut service = service_with_flagged_claims();

        // Ingesting the same batch again must not add attestations
        service
            .ingest_batch(&[claim("CLM0001", "I50.9", "J9355", "")])
            .unwrap();

        let stats = service.db().attestation_stats().unwrap();
        assert_eq!(stats.total(), 2);
        assert_eq!(stats.pending, 2);
    }

    #[test]
    fn test_sign_requires_name() {
        let service = service_with_flagged_claims();
        let err = service.sign("CLM0001", "   ", None).unwrap_err();
        assert!(matches!(err, ScrubError::Validation(_)));

        service.sign("CLM0001", "Dr. Michael Chen", None).unwrap();
        service.verify("CLM0001", None).unwrap();

        let stats = service.db().attestation_stats().unwrap();
        assert_eq!(stats.verified, 1);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn test_reset_returns_to_pending() {
        let service = service_with_flagged_claims();
        service.sign("CLM0001", "Dr. Michael Chen", None).unwrap();
        service.reset("CLM0001").unwrap();
        assert_eq!(service.db().attestation_stats().unwrap().pending, 2);
    }

    #[test]
    fn test_compute_reminders_threshold_cases() {
        let service = service_with_flagged_claims();
        let now = Utc::now();

        // CLM0001 reminded 72h ago -> due again; CLM0002 10h ago -> not due
        service
            .db()
            .mark_reminded("CLM0001", Some(now - Duration::hours(72)))
            .unwrap();
        service
            .db()
            .mark_reminded("CLM0002", Some(now - Duration::hours(10)))
            .unwrap();

        let sink = CollectingSink::new();
        let count = service.compute_reminders(now, 48, &sink).unwrap();
        assert_eq!(count, 1);
        assert_eq!(*sink.reminded.borrow(), vec!["CLM0001".to_string()]);

        // Reminder stamp refreshed, so an immediate second run does nothing
        let count = service.compute_reminders(now, 48, &sink).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_reminders_skip_signed_claims() {
        let service = service_with_flagged_claims();
        service.sign("CLM0001", "Dr. Michael Chen", None).unwrap();

        let sink = CollectingSink::new();
        let count = service.compute_reminders(Utc::now(), 48, &sink).unwrap();
        assert_eq!(count, 1);
        assert_eq!(*sink.reminded.borrow(), vec!["CLM0002".to_string()]);
    }

    #[test]
    fn test_never_reminded_is_always_selected() {
        let service = service_with_flagged_claims();
        // the default logging sink is enough when only the count matters
        let count = service
            .compute_reminders(Utc::now(), 48, &crate::attestation::LogReminderSink)
            .unwrap();
        assert_eq!(count, 2);
    }
}
