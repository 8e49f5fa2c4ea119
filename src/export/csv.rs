use crate::{
    compliance::types::{Claim, EvaluatedClaim},
    error::{Result, ScrubError},
};
use std::io::Read;

/// Expected claim CSV header, in canonical column order.
pub const CLAIM_COLUMNS: &[&str] = &[
    "ClaimID",
    "PatientID",
    "ICD10",
    "ProcCode",
    "Provider",
    "DocStatus",
    "ServiceDate",
];

/// Read a claims CSV, preserving blank cells as empty strings.
///
/// A missing column degrades to the empty string for every row so that
/// the whitespace-trim rule sees absent and blank identically.
pub fn read_claims<R: Read>(reader: R) -> Result<Vec<Claim>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let index_of = |name: &str| headers.iter().position(|h| h == name);

    let columns: Vec<Option<usize>> = CLAIM_COLUMNS.iter().map(|c| index_of(c)).collect();
    let field = |record: &csv::StringRecord, col: usize| -> String {
        columns[col]
            .and_then(|i| record.get(i))
            .unwrap_or("")
            .to_string()
    };

    let mut claims = Vec::new();
    for record in rdr.records() {
        let record = record?;
        claims.push(Claim {
            claim_id: field(&record, 0),
            patient_id: field(&record, 1),
            icd10: field(&record, 2),
            proc_code: field(&record, 3),
            provider: field(&record, 4),
            doc_status: field(&record, 5),
            service_date: field(&record, 6),
        });
    }

    Ok(claims)
}

/// Export the augmented batch: canonical columns plus a semicolon-joined
/// `Issues` column, no ordinal index column.
pub fn cleaned_csv_bytes(batch: &[EvaluatedClaim]) -> Result<Vec<u8>> {
    if batch.is_empty() {
        return Err(ScrubError::Validation(
            "cannot export an empty batch".to_string(),
        ));
    }

    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header: Vec<&str> = CLAIM_COLUMNS.to_vec();
    header.push("Issues");
    wtr.write_record(&header)?;

    for record in batch {
        let claim = &record.claim;
        wtr.write_record([
            claim.claim_id.as_str(),
            claim.patient_id.as_str(),
            claim.icd10.as_str(),
            claim.proc_code.as_str(),
            claim.provider.as_str(),
            claim.doc_status.as_str(),
            claim.service_date.as_str(),
            record.issues_text().as_str(),
        ])?;
    }

    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("CSV buffer error: {}", e).into())
}

/// Plain claims CSV without the issues column (demo data output).
pub fn claims_csv_bytes(claims: &[Claim]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(CLAIM_COLUMNS)?;

    for claim in claims {
        wtr.write_record([
            claim.claim_id.as_str(),
            claim.patient_id.as_str(),
            claim.icd10.as_str(),
            claim.proc_code.as_str(),
            claim.provider.as_str(),
            claim.doc_status.as_str(),
            claim.service_date.as_str(),
        ])?;
    }

    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("CSV buffer error: {}", e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::apply_checks;

    const SAMPLE: &str = "\
ClaimID,PatientID,ICD10,ProcCode,Provider,DocStatus,ServiceDate
CLM0001,PAT0001,I50.9,J9355,Dr. Sarah Johnson - Cardiology,,2024-03-15
CLM0002,PAT0002,Z51.11,99213,Dr. Michael Chen - Orthopedics,Complete,2024-03-16
";

    #[test]
    fn test_read_preserves_blank_cells() {
        let claims = read_claims(SAMPLE.as_bytes()).unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].claim_id, "CLM0001");
        assert_eq!(claims[0].doc_status, "");
        assert_eq!(claims[1].doc_status, "Complete");
    }

    #[test]
    fn test_read_missing_column_degrades_to_empty() {
        let csv = "ClaimID,Provider\nCLM0001,Dr. A\n";
        let claims = read_claims(csv.as_bytes()).unwrap();
        assert_eq!(claims[0].claim_id, "CLM0001");
        assert_eq!(claims[0].doc_status, "");
        assert_eq!(claims[0].icd10, "");
    }

    #[test]
    fn test_cleaned_csv_shape() {
        let claims = read_claims(SAMPLE.as_bytes()).unwrap();
        let batch = apply_checks(&claims).unwrap();
        let bytes = cleaned_csv_bytes(&batch).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ClaimID,PatientID,ICD10,ProcCode,Provider,DocStatus,ServiceDate,Issues"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("CLM0001,"));
        assert!(first.contains("Missing documentation; High-audit-risk diagnosis"));
        // second claim is clean, issues cell empty
        let second = lines.next().unwrap();
        assert!(second.starts_with("CLM0002,"));
        assert!(second.ends_with(","));
    }

    #[test]
    fn test_cleaned_csv_rejects_empty_batch() {
        let err = cleaned_csv_bytes(&[]).unwrap_err();
        assert!(matches!(err, ScrubError::Validation(_)));
    }

    #[test]
    fn test_claims_round_trip() {
        let claims = read_claims(SAMPLE.as_bytes()).unwrap();
        let bytes = claims_csv_bytes(&claims).unwrap();
        let reread = read_claims(bytes.as_slice()).unwrap();
        assert_eq!(claims, reread);
    }
}
