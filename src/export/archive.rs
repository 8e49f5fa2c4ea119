use crate::{
    error::{Result, ScrubError},
    export::{pdf::make_attestation_pdf, AttestationForm},
    storage::models::AttestationStatus,
    utils,
};
use std::io::{Cursor, Write};
use tracing::{info, warn};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

const NO_FLAGGED_README: &str = "No flagged claims found.\n\n\
All claims in the dataset passed compliance checks and do not require provider \
attestations.\n\n\
DEMO ONLY - This tool is for demonstration purposes only. Do not use with real PHI data.\n";

/// Bundle one attestation PDF per flagged claim plus an audit-summary CSV.
///
/// A record whose PDF generation fails is logged and skipped; the archive
/// still contains every record that succeeded. When nothing is flagged the
/// archive holds a README placeholder instead.
pub fn zip_attestations(forms: &[AttestationForm]) -> Result<Vec<u8>> {
    if forms.is_empty() {
        return Err(ScrubError::Validation(
            "cannot export an empty batch".to_string(),
        ));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut audit_rows: Vec<[String; 7]> = Vec::new();

    for form in forms.iter().filter(|f| !f.issues.is_empty()) {
        let pdf_bytes = match make_attestation_pdf(form) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping attestation PDF for {}: {}", form.claim_id, e);
                continue;
            }
        };

        let filename = utils::attestation_pdf_filename(&form.claim_id, &form.provider);
        zip.start_file(filename, options)?;
        zip.write_all(&pdf_bytes)?;

        let status = form.status.unwrap_or(AttestationStatus::Pending);
        audit_rows.push([
            form.claim_id.clone(),
            form.provider.clone(),
            form.issues.join("; "),
            status.to_string(),
            form.signed_at.clone().unwrap_or_default(),
            form.verified_at.clone().unwrap_or_default(),
            form.last_reminder_at.clone().unwrap_or_default(),
        ]);
    }

    if audit_rows.is_empty() {
        zip.start_file("README.txt", options)?;
        zip.write_all(NO_FLAGGED_README.as_bytes())?;
    } else {
        zip.start_file("audit_summary.csv", options)?;
        zip.write_all(&audit_summary_csv(&audit_rows)?)?;
    }

    info!("Packaged {} attestation PDFs", audit_rows.len());
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn audit_summary_csv(rows: &[[String; 7]]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "ClaimID",
        "Provider",
        "Issues",
        "Status",
        "SignedAt",
        "VerifiedAt",
        "LastReminderAt",
    ])?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("CSV buffer error: {}", e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::apply_checks;
    use crate::compliance::types::Claim;
    use std::io::Read;

    fn forms() -> Vec<AttestationForm> {
        let claims = vec![
            Claim {
                claim_id: "CLM0001".to_string(),
                patient_id: "PAT0001".to_string(),
                provider: "Dr. Sarah Johnson - Cardiology".to_string(),
                icd10: "I50.9".to_string(),
                proc_code: "J9355".to_string(),
                doc_status: String::new(),
                service_date: "2024-03-15".to_string(),
            },
            Claim {
                claim_id: "CLM0002".to_string(),
                patient_id: "PAT0002".to_string(),
                provider: "Dr. Michael Chen - Orthopedics".to_string(),
                icd10: "Z51.11".to_string(),
                proc_code: "99213".to_string(),
                doc_status: "Complete".to_string(),
                service_date: "2024-03-16".to_string(),
            },
        ];
        apply_checks(&claims)
            .unwrap()
            .iter()
            .map(AttestationForm::from)
            .collect()
    }

    fn file_names(bytes: &[u8]) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        archive.file_names().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_zip_contains_pdf_and_audit_summary() {
        let bytes = zip_attestations(&forms()).unwrap();
        let names = file_names(&bytes);

        assert_eq!(names.len(), 2);
        assert!(names.contains(&"Claim_CLM0001_Dr_Sarah_Johnson_-_Cardiology.pdf".to_string()));
        assert!(names.contains(&"audit_summary.csv".to_string()));
    }

    #[test]
    fn test_audit_summary_rows() {
        let bytes = zip_attestations(&forms()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut summary = String::new();
        archive
            .by_name("audit_summary.csv")
            .unwrap()
            .read_to_string(&mut summary)
            .unwrap();

        let mut lines = summary.lines();
        assert_eq!(
            lines.next().unwrap(),
            "ClaimID,Provider,Issues,Status,SignedAt,VerifiedAt,LastReminderAt"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("CLM0001,"));
        assert!(row.contains("Pending"));
        // only the flagged claim appears
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_no_flagged_claims_yields_readme() {
        let clean: Vec<AttestationForm> = forms()
            .into_iter()
            .filter(|f| f.claim_id == "CLM0002")
            .collect();
        let bytes = zip_attestations(&clean).unwrap();
        let names = file_names(&bytes);
        assert_eq!(names, vec!["README.txt".to_string()]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = zip_attestations(&[]).unwrap_err();
        assert!(matches!(err, ScrubError::Validation(_)));
    }
}
