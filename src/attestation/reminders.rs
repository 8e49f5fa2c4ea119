use crate::storage::models::ClaimWithAttestation;
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// Destination for reminder side effects. External notification transports
/// are out of scope; implementations decide what "sending" means.
pub trait ReminderSink {
    fn remind(&self, record: &ClaimWithAttestation);
}

/// Default sink: a structured-logging hook, no external delivery.
pub struct LogReminderSink;

impl ReminderSink for LogReminderSink {
    fn remind(&self, record: &ClaimWithAttestation) {
        info!(
            "Reminder: claim {} ({}) awaiting attestation since {}",
            record.claim_id, record.provider, record.created_at
        );
    }
}

/// Whether a Pending record is due for a reminder.
///
/// Eligible when no reminder was ever recorded, or the last one is older
/// than the threshold. An unparseable stored timestamp counts as never
/// reminded, so a corrupt row can only over-remind, not go silent.
pub fn is_reminder_due(
    record: &ClaimWithAttestation,
    as_of: DateTime<Utc>,
    threshold_hours: i64,
) -> bool {
    let cutoff = as_of - Duration::hours(threshold_hours);

    match record.last_reminder_at.as_deref() {
        None => true,
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(last) => last.with_timezone(&Utc) < cutoff,
            Err(_) => {
                warn!(
                    "Unparseable last_reminder_at {:?} for claim {}, treating as never reminded",
                    raw, record.claim_id
                );
                true
            }
        },
    }
}
