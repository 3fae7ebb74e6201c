//! Report export — PDF and CSV renditions of a completed assessment.
//!
//! Two artifacts per case:
//! 1. PDF report — printable one-page summary for the patient file
//! 2. CSV extract — fixed-column single-record row for registry spreadsheets
//!
//! Both renditions are pure functions of the record, the imaging notes, and
//! the assessment result; writing to disk is a separate step so embedders can
//! pick the destination. PDF generation via `printpdf`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::info;

use crate::assessment::AssessmentResult;
use crate::imaging::ImagingSet;
use crate::models::{Modality, PatientRecord};

/// Fixed footer on every PDF report.
const DISCLAIMER: &str =
    "AI-generated screening aid. Not a diagnosis. Review by a qualified oncologist is required.";

/// Errors from rendering or writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Could not render the PDF report: {detail}")]
    Pdf { detail: String },

    #[error("Could not write the export file: {0}")]
    Io(#[from] std::io::Error),
}

// ─── CSV Extract ──────────────────────────────────────────────────────────────

/// Column order of the CSV extract. Registry imports match on these names,
/// so spelling and order are fixed.
const CSV_COLUMNS: [&str; 14] = [
    "Patient ID",
    "UHID",
    "Age",
    "Gender",
    "Location",
    "Risk Level",
    "Summary",
    "Findings",
    "Recommendations",
    "General Notes",
    "CT Notes",
    "X-Ray Notes",
    "Ultrasound Notes",
    "Date",
];

/// Render the CSV extract: one header row plus one data row.
///
/// Every field is quoted and embedded quotes are doubled, so free-text fields
/// may contain commas, quotes, and line breaks. List fields (findings,
/// recommendations) are joined with `"; "`.
pub fn render_csv(
    record: &PatientRecord,
    imaging: &ImagingSet,
    result: &AssessmentResult,
    generated_at: &DateTime<Local>,
) -> String {
    let values = [
        record.patient_id.clone(),
        record.uhid.clone(),
        record.age.clone(),
        record.gender.map(|g| g.to_string()).unwrap_or_default(),
        record.location.clone(),
        result.risk_level.to_string(),
        result.summary.clone(),
        result.findings.join("; "),
        result.recommendations.join("; "),
        record.notes.clone(),
        imaging.note(Modality::CtScan).to_string(),
        imaging.note(Modality::Xray).to_string(),
        imaging.note(Modality::Ultrasound).to_string(),
        generated_at.format("%Y-%m-%d").to_string(),
    ];

    let header = CSV_COLUMNS
        .iter()
        .map(|column| csv_field(column))
        .collect::<Vec<_>>()
        .join(",");
    let row = values
        .iter()
        .map(|value| csv_field(value))
        .collect::<Vec<_>>()
        .join(",");
    format!("{header}\n{row}\n")
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

// ─── PDF Report ───────────────────────────────────────────────────────────────

use printpdf::*;
use std::io::BufWriter;

/// Render the printable PDF report.
///
/// Single A4 page: demographics, the risk level, the narrative sections of
/// the result, then any operator notes and the disclaimer footer.
pub fn render_pdf(
    record: &PatientRecord,
    imaging: &ImagingSet,
    result: &AssessmentResult,
    generated_at: &DateTime<Local>,
) -> Result<Vec<u8>, ExportError> {
    let (doc, page1, layer1) = PdfDocument::new(
        "Myeloma Guard Screening Report",
        Mm(210.0),
        Mm(297.0),
        "Layer 1",
    );
    let layer = doc.get_page(page1).get_layer(layer1);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf {
            detail: format!("font error: {e}"),
        })?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf {
            detail: format!("font error: {e}"),
        })?;
    let courier = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| ExportError::Pdf {
            detail: format!("font error: {e}"),
        })?;

    let mut y = Mm(280.0);

    layer.use_text("MYELOMA GUARD SCREENING REPORT", 14.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M")),
        9.0,
        Mm(20.0),
        y,
        &font,
    );
    y -= Mm(10.0);

    layer.use_text("PATIENT", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    let gender = record.gender.map(|g| g.as_str()).unwrap_or("");
    layer.use_text(
        format!("{} yrs, {}", record.age, gender),
        9.0,
        Mm(25.0),
        y,
        &font,
    );
    y -= Mm(4.5);
    if !record.patient_id.is_empty() {
        layer.use_text(
            format!("Patient ID: {}", record.patient_id),
            9.0,
            Mm(25.0),
            y,
            &font,
        );
        y -= Mm(4.5);
    }
    if !record.uhid.is_empty() {
        layer.use_text(format!("UHID: {}", record.uhid), 9.0, Mm(25.0), y, &font);
        y -= Mm(4.5);
    }
    layer.use_text(
        format!("Location: {}", record.location),
        9.0,
        Mm(25.0),
        y,
        &font,
    );
    y -= Mm(4.5);
    if record.is_pregnant {
        layer.use_text("Pregnancy Status: PREGNANT", 9.0, Mm(25.0), y, &bold);
        y -= Mm(4.5);
    }
    y -= Mm(5.0);

    layer.use_text(
        format!("RISK LEVEL: {}", result.risk_level.as_str().to_uppercase()),
        12.0,
        Mm(20.0),
        y,
        &bold,
    );
    y -= Mm(9.0);

    layer.use_text("SUMMARY", 11.0, Mm(20.0), y, &bold);
    y -= Mm(6.0);
    for line in wrap_text(&result.summary, 95) {
        layer.use_text(&line, 9.0, Mm(25.0), y, &font);
        y -= Mm(4.5);
    }
    y -= Mm(5.0);

    if !result.findings.is_empty() {
        layer.use_text("KEY FINDINGS", 11.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for finding in &result.findings {
            for line in wrap_text(&format!("- {finding}"), 90) {
                layer.use_text(&line, 9.0, Mm(25.0), y, &font);
                y -= Mm(4.5);
            }
        }
        y -= Mm(5.0);
    }

    if !result.recommendations.is_empty() {
        layer.use_text("RECOMMENDATIONS", 11.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for (i, rec) in result.recommendations.iter().enumerate() {
            for line in wrap_text(&format!("{}. {rec}", i + 1), 90) {
                layer.use_text(&line, 9.0, Mm(25.0), y, &font);
                y -= Mm(4.5);
            }
        }
        y -= Mm(5.0);
    }

    let notes = note_lines(record, imaging);
    if !notes.is_empty() {
        layer.use_text("NOTES", 11.0, Mm(20.0), y, &bold);
        y -= Mm(6.0);
        for note in &notes {
            for line in wrap_text(note, 100) {
                layer.use_text(&line, 8.0, Mm(25.0), y, &courier);
                y -= Mm(4.0);
            }
        }
        y -= Mm(5.0);
    }

    y -= Mm(4.0);
    for line in wrap_text(DISCLAIMER, 105) {
        layer.use_text(&line, 7.0, Mm(20.0), y, &font);
        y -= Mm(3.5);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(|e| ExportError::Pdf {
        detail: format!("save error: {e}"),
    })?;
    buf.into_inner().map_err(|e| ExportError::Pdf {
        detail: format!("buffer error: {e}"),
    })
}

/// Non-empty operator notes in report order: the general note first, then
/// one line per annotated modality.
fn note_lines(record: &PatientRecord, imaging: &ImagingSet) -> Vec<String> {
    let mut lines = Vec::new();
    if !record.notes.trim().is_empty() {
        lines.push(format!("General: {}", record.notes.trim()));
    }
    for modality in Modality::ALL {
        let note = imaging.note(modality).trim();
        if !note.is_empty() {
            lines.push(format!("{} {}", modality.note_label(), note));
        }
    }
    lines
}

/// Word-wrap to roughly `max_chars` per line. Words longer than the limit
/// land on their own line rather than being split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

// ─── Files ────────────────────────────────────────────────────────────────────

/// Build the export filename: case identifier (patient ID, else UHID, else
/// `case`), generation timestamp, extension. Identifier characters outside
/// `[A-Za-z0-9_-]` become `-` so the name is safe on every filesystem.
pub fn export_filename(
    record: &PatientRecord,
    generated_at: &DateTime<Local>,
    extension: &str,
) -> String {
    let raw = if !record.patient_id.is_empty() {
        record.patient_id.as_str()
    } else if !record.uhid.is_empty() {
        record.uhid.as_str()
    } else {
        "case"
    };
    let id: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!(
        "myeloma-report-{id}-{}.{extension}",
        generated_at.format("%Y%m%d-%H%M%S")
    )
}

/// Write `bytes` into `dir` under `filename`, creating the directory if
/// needed. Returns the full path written.
pub fn write_export(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Render and write both artifacts into `dir` (typically
/// `config::default_export_dir`). Returns the PDF and CSV paths.
pub fn export_report(
    record: &PatientRecord,
    imaging: &ImagingSet,
    result: &AssessmentResult,
    dir: &Path,
) -> Result<(PathBuf, PathBuf), ExportError> {
    let generated_at = Local::now();
    let pdf = render_pdf(record, imaging, result, &generated_at)?;
    let pdf_path = write_export(dir, &export_filename(record, &generated_at, "pdf"), &pdf)?;
    let csv = render_csv(record, imaging, result, &generated_at);
    let csv_path = write_export(
        dir,
        &export_filename(record, &generated_at, "csv"),
        csv.as_bytes(),
    )?;
    info!(pdf = %pdf_path.display(), csv = %csv_path.display(), "report exported");
    Ok((pdf_path, csv_path))
}
