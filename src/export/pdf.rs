use crate::{
    error::{Result, ScrubError},
    export::AttestationForm,
};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

// US Letter
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 25.4;
const LINE_MM: f32 = 6.0;
const WRAP_COLUMNS: usize = 88;

const ATTESTATION_TEXT: &str = "I attest that the documentation provided is accurate and \
complete for the services billed. I understand that falsification or omission may result \
in penalties under applicable law.";

/// Generate one provider attestation form as PDF bytes.
///
/// Layout follows the original audit-preparation form: title, claim
/// details, numbered issue list, attestation statement, signature block.
/// A signed record renders its electronic signature line instead of the
/// blank one.
pub fn make_attestation_pdf(form: &AttestationForm) -> Result<Vec<u8>> {
    let claim_id = if form.claim_id.is_empty() {
        "UNKNOWN"
    } else {
        form.claim_id.as_str()
    };
    let provider = if form.provider.is_empty() {
        "Unknown Provider"
    } else {
        form.provider.as_str()
    };

    let (doc, page, layer) = PdfDocument::new(
        "Provider Attestation - CMS Audit Preparation",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ScrubError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ScrubError::Pdf(e.to_string()))?;

    let mut page = PageCursor::new(&doc, doc.get_page(page).get_layer(layer));

    page.heading(&bold, 16.0, "Provider Attestation - CMS Audit Preparation");
    page.blank();

    page.heading(&bold, 13.0, "Claim Information");
    page.labeled(&regular, "Claim ID:", claim_id);
    page.labeled(&regular, "Provider:", provider);
    page.labeled(&regular, "Patient ID:", &form.patient_id);
    page.labeled(&regular, "Service Date:", &form.service_date);
    page.labeled(&regular, "ICD-10:", &form.icd10);
    page.labeled(&regular, "ProcCode:", &form.proc_code);
    page.blank();

    if !form.issues.is_empty() {
        page.heading(&bold, 13.0, "Compliance Issues Identified");
        for (i, issue) in form.issues.iter().enumerate() {
            page.paragraph(&regular, &format!("{}. {}", i + 1, issue));
        }
        page.blank();
    }

    page.heading(&bold, 13.0, "Provider Attestation");
    page.paragraph(&regular, ATTESTATION_TEXT);
    page.blank();

    match (&form.signed_name, &form.signed_at) {
        (Some(name), Some(signed_at)) if !name.is_empty() => {
            page.paragraph(
                &regular,
                "Provider Signature (electronic): ______________________",
            );
            page.paragraph(&regular, &format!("Name: {}    Date: {}", name, signed_at));
        }
        _ => {
            page.paragraph(&regular, "Provider Signature: _________________________");
            page.paragraph(&regular, "Date: ___________");
        }
    }

    page.blank();
    page.paragraph(&regular, "Confidential - Demonstration Use Only");

    doc.save_to_bytes().map_err(|e| ScrubError::Pdf(e.to_string()))
}

/// Tracks the vertical write position, adding pages as text runs past the
/// bottom margin.
struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl<'a> PageCursor<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn advance(&mut self, by: f32) {
        if self.y - by < MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        } else {
            self.y -= by;
        }
    }

    fn line(&mut self, font: &IndirectFontRef, size: f32, text: &str) {
        self.advance(LINE_MM);
        self.layer
            .use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
    }

    fn heading(&mut self, font: &IndirectFontRef, size: f32, text: &str) {
        self.advance(2.0);
        self.line(font, size, text);
        self.advance(2.0);
    }

    fn labeled(&mut self, font: &IndirectFontRef, label: &str, value: &str) {
        self.advance(LINE_MM);
        self.layer
            .use_text(label, 11.0, Mm(MARGIN_MM), Mm(self.y), font);
        self.layer
            .use_text(value, 11.0, Mm(MARGIN_MM + 40.0), Mm(self.y), font);
    }

    fn paragraph(&mut self, font: &IndirectFontRef, text: &str) {
        for line in wrap_text(text, WRAP_COLUMNS) {
            self.line(font, 11.0, &line);
        }
    }

    fn blank(&mut self) {
        self.advance(LINE_MM);
    }
}

/// Greedy word wrap. Builtin PDF fonts carry no shaping here, so a plain
/// column budget is enough for these forms.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(issues: Vec<&str>) -> AttestationForm {
        AttestationForm {
            claim_id: "CLM0007".to_string(),
            patient_id: "PAT0007".to_string(),
            provider: "Dr. Emily Rodriguez - Internal Medicine".to_string(),
            icd10: "I50.9".to_string(),
            proc_code: "J9355".to_string(),
            service_date: "2024-01-30".to_string(),
            issues: issues.into_iter().map(|s| s.to_string()).collect(),
            status: None,
            signed_name: None,
            signed_at: None,
            verified_at: None,
            last_reminder_at: None,
        }
    }

    #[test]
    fn test_pdf_bytes_have_header() {
        let bytes = make_attestation_pdf(&form(vec!["Missing documentation"])).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_signed_form_generates() {
        let mut f = form(vec!["High-audit-risk diagnosis"]);
        f.signed_name = Some("Dr. Emily Rodriguez".to_string());
        f.signed_at = Some("2024-02-01T09:30:00+00:00".to_string());
        let bytes = make_attestation_pdf(&f).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_many_issues_overflow_to_second_page() {
        let issues: Vec<String> = (0..80).map(|i| format!("Issue number {}", i)).collect();
        let mut f = form(vec![]);
        f.issues = issues;
        let bytes = make_attestation_pdf(&f).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_wrap_text_respects_column_budget() {
        let lines = wrap_text(ATTESTATION_TEXT, 40);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 40));
    }
}
