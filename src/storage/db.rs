use crate::{
    compliance::types::EvaluatedClaim,
    error::{Result, ScrubError},
    storage::models::{AttestationStats, AttestationStatus, ClaimFilter, ClaimWithAttestation},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use tracing::{debug, info};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS claims (
                id TEXT PRIMARY KEY,
                patient_id TEXT,
                provider TEXT,
                icd10 TEXT,
                proc_code TEXT,
                doc_status TEXT,
                service_date TEXT,
                issues TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS attestations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                claim_id TEXT NOT NULL,
                status TEXT NOT NULL CHECK(status IN ('Pending', 'Signed', 'Verified')),
                signed_name TEXT NULL,
                signed_at TEXT NULL,
                verified_at TEXT NULL,
                last_reminder_at TEXT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (claim_id) REFERENCES claims (id)
            )",
            [],
        )?;

        // Indexes for the status filter and the per-claim dedup scan
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_attestations_claim ON attestations(claim_id)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_attestations_status ON attestations(status)",
            [],
        )?;

        Ok(())
    }

    /// Persist every flagged claim in the batch inside one transaction.
    ///
    /// The claim snapshot is replaced on conflict; the attestation is only
    /// inserted when the claim has never been tracked, so re-flagging does
    /// not reset attestation progress. Clean records and records with a
    /// blank claim id are skipped. Any failure rolls back the whole call.
    pub fn upsert_flagged_claims(&mut self, batch: &[EvaluatedClaim]) -> Result<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut written = 0usize;

        for record in batch.iter().filter(|r| r.is_flagged()) {
            let claim = &record.claim;
            if claim.claim_id.is_empty() {
                continue;
            }

            tx.execute(
                "INSERT OR REPLACE INTO claims
                 (id, patient_id, provider, icd10, proc_code, doc_status, service_date, issues, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    claim.claim_id,
                    claim.patient_id,
                    claim.provider,
                    claim.icd10,
                    claim.proc_code,
                    claim.doc_status,
                    claim.service_date,
                    record.issues_text(),
                    now,
                ],
            )?;

            // First-seen semantics: not safe against concurrent writers on
            // the same claim_id; cleanup_duplicate_attestations compensates.
            tx.execute(
                "INSERT INTO attestations (claim_id, status, created_at)
                 SELECT ?1, 'Pending', ?2
                 WHERE NOT EXISTS (SELECT 1 FROM attestations WHERE claim_id = ?1)",
                params![claim.claim_id, now],
            )?;

            written += 1;
        }

        tx.commit()?;
        debug!("Upserted {} flagged claims", written);
        Ok(written)
    }

    /// Claims joined to their most-recent attestation row.
    ///
    /// The window-function dedup is the authoritative read path: a claim
    /// may have accumulated several attestation rows, and only the latest
    /// one counts.
    pub fn list_claims(&self, filter: &ClaimFilter) -> Result<Vec<ClaimWithAttestation>> {
        let mut query = String::from(
            "SELECT
                c.id,
                c.patient_id,
                c.provider,
                c.icd10,
                c.proc_code,
                c.doc_status,
                c.service_date,
                c.issues,
                a.status,
                a.signed_name,
                a.signed_at,
                a.verified_at,
                a.last_reminder_at,
                c.created_at
            FROM claims c
            LEFT JOIN (
                SELECT claim_id, status, signed_name, signed_at, verified_at, last_reminder_at,
                       ROW_NUMBER() OVER (PARTITION BY claim_id ORDER BY created_at DESC, id DESC) as rn
                FROM attestations
            ) a ON c.id = a.claim_id AND a.rn = 1",
        );

        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(provider) = &filter.provider {
            conditions.push("c.provider LIKE ?");
            params.push(format!("%{}%", provider));
        }
        if let Some(status) = &filter.status {
            conditions.push("a.status = ?");
            params.push(status.to_string());
        }
        if let Some(issue) = &filter.issue_substring {
            conditions.push("c.issues LIKE ?");
            params.push(format!("%{}%", issue));
        }

        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY c.created_at DESC, c.id DESC");

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Ok(ClaimWithAttestation {
                    claim_id: row.get(0)?,
                    patient_id: row.get(1)?,
                    provider: row.get(2)?,
                    icd10: row.get(3)?,
                    proc_code: row.get(4)?,
                    doc_status: row.get(5)?,
                    service_date: row.get(6)?,
                    issues: row.get(7)?,
                    status: row
                        .get::<_, Option<String>>(8)?
                        .and_then(|s| AttestationStatus::from_str(&s).ok()),
                    signed_name: row.get(9)?,
                    signed_at: row.get(10)?,
                    verified_at: row.get(11)?,
                    last_reminder_at: row.get(12)?,
                    created_at: row.get(13)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Update attestation status for every physical row of a claim.
    ///
    /// `Signed` records the signer and timestamp, `Verified` the
    /// verification timestamp, `Pending` only the status (manual reset).
    /// Forward-only ordering is a caller contract, not enforced here.
    pub fn set_attestation_status(
        &self,
        claim_id: &str,
        status: AttestationStatus,
        signed_name: Option<&str>,
        when: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let when = when.unwrap_or_else(Utc::now).to_rfc3339();

        let updated = match status {
            AttestationStatus::Signed => self.conn.execute(
                "UPDATE attestations
                 SET status = ?1, signed_name = ?2, signed_at = ?3
                 WHERE claim_id = ?4",
                params![status.to_string(), signed_name, when, claim_id],
            )?,
            AttestationStatus::Verified => self.conn.execute(
                "UPDATE attestations
                 SET status = ?1, verified_at = ?2
                 WHERE claim_id = ?3",
                params![status.to_string(), when, claim_id],
            )?,
            AttestationStatus::Pending => self.conn.execute(
                "UPDATE attestations SET status = ?1 WHERE claim_id = ?2",
                params![status.to_string(), claim_id],
            )?,
        };

        if updated == 0 {
            return Err(ScrubError::ClaimNotFound(claim_id.to_string()));
        }

        info!("Attestation for {} set to {}", claim_id, status);
        Ok(())
    }

    /// Record that a reminder went out. Independent of status.
    pub fn mark_reminded(&self, claim_id: &str, when: Option<DateTime<Utc>>) -> Result<()> {
        let when = when.unwrap_or_else(Utc::now).to_rfc3339();

        let updated = self.conn.execute(
            "UPDATE attestations SET last_reminder_at = ?1 WHERE claim_id = ?2",
            params![when, claim_id],
        )?;

        if updated == 0 {
            return Err(ScrubError::ClaimNotFound(claim_id.to_string()));
        }
        Ok(())
    }

    /// Per-status counts over the deduplicated view. Raw row counts would
    /// double-count claims with duplicate historical rows.
    pub fn attestation_stats(&self) -> Result<AttestationStats> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*)
             FROM (
                 SELECT claim_id, status,
                        ROW_NUMBER() OVER (PARTITION BY claim_id ORDER BY created_at DESC, id DESC) as rn
                 FROM attestations
             ) deduped
             WHERE rn = 1
             GROUP BY status",
        )?;

        let mut stats = AttestationStats::default();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            match AttestationStatus::from_str(&status) {
                Ok(AttestationStatus::Pending) => stats.pending = count as usize,
                Ok(AttestationStatus::Signed) => stats.signed = count as usize,
                Ok(AttestationStatus::Verified) => stats.verified = count as usize,
                Err(_) => {}
            }
        }

        Ok(stats)
    }

    /// Delete all but the most-recently-created attestation row per claim.
    ///
    /// Duplicates appear when concurrent ingesters race the
    /// insert-if-none-exists check, or when rows are inserted directly.
    /// The dedup read path already tolerates them; this compacts them.
    /// Returns the number of rows removed.
    pub fn cleanup_duplicate_attestations(&self) -> Result<usize> {
        let duplicates: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) - COUNT(DISTINCT claim_id) FROM attestations",
                [],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);

        if duplicates == 0 {
            return Ok(0);
        }

        let deleted = self.conn.execute(
            "DELETE FROM attestations
             WHERE id NOT IN (
                 SELECT id FROM (
                     SELECT id,
                            ROW_NUMBER() OVER (PARTITION BY claim_id ORDER BY created_at DESC, id DESC) as rn
                     FROM attestations
                 ) ranked
                 WHERE rn = 1
             )",
            [],
        )?;

        info!("Removed {} duplicate attestation rows", deleted);
        Ok(deleted)
    }
}
