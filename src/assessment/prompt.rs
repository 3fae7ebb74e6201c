//! Prompt assembly for the full case assessment and the X-ray quick review.

use crate::imaging::ImagingSet;
use crate::models::{Gender, Modality, PatientRecord, Severity};

use super::types::{AssessmentRequest, LabeledImage};

const CAPABILITY_DIRECTIVES: &str = r#"You are "Myeloma Guard", an expert AI oncology assistant at Tenwek Hospital in Bomet County, Kenya.
Multiple Myeloma is rampant in this region (specifically Bomet East).

**Role & Capability:**
You are powered by advanced computer vision capabilities. You must simulate the analytical rigor of state-of-the-art **Python medical imaging libraries** (such as MONAI, PyTorch, SimpleITK, and OpenCV) to interpret the provided scans.

Apply "radiomics-like" feature extraction logic:
1. **Texture Analysis:** Detect heterogeneity in bone marrow.
2. **Edge Detection:** Identify "punched-out" lytic lesions with sharp borders.
3. **Density Segmentation:** Assess osteopenia (reduced bone density) in vertebrae and long bones."#;

const DISEASE_MARKERS: &str = r#"**Specific Disease Markers to Watch For (CRAB & Local Indicators):**
1. Respiratory issues (Pneumonia/Blood clots/Blood stains in sputum).
2. M-protein spikes (SPEP test).
3. Bone issues: Fractures without injury, lytic lesions, osteoporosis, weak neck vertebrae.
4. Knee joint pain/swelling.
5. Anemia (Low blood levels)."#;

const CONTRAINDICATION_WARNINGS: &str = r#"**Treatment Contraindications & Warnings (CRITICAL):**
1. **Pregnancy:** If the patient is PREGNANT, explicitly advise the oncologist **NOT** to start standard chemotherapy.
2. **Kidney Failure:** If the patient has Renal Insufficiency / High Creatinine, explicitly advise **AGAINST** starting standard chemotherapy without first stabilizing renal function or adjusting protocols."#;

const TASK_DIRECTIVES: &str = r#"**Task:**
Analyze the provided information and provided images to assess the likelihood of Multiple Myeloma.

**Imaging Interpretation Instructions (Simulating Python Library Analysis):**
- **CT Scan:** Scan for lytic lesions (focal low-density areas) and cortical destruction.
- **X-Ray:** Detect lucent "punched-out" lesions, endosteal scalloping, and generalized osteopenia.
- **Ultrasound:** Analyze for soft tissue masses (plasmacytomas) or renal echogenicity changes.

Return a valid JSON object with the following structure:
{
  "riskLevel": "Low" | "Moderate" | "High" | "Critical",
  "summary": "A concise executive summary for the oncologist (2-3 sentences).",
  "findings": ["List of key supporting clinical findings derived from symptoms, lab data, AND image interpretation."],
  "recommendations": ["List of specific next steps. INCLUDE WARNINGS ABOUT CHEMO IF PREGNANT OR KIDNEY FAILURE IS DETECTED."]
}"#;

/// Standalone prompt for the single-image X-ray review.
pub const XRAY_REVIEW_PROMPT: &str = r#"You are an expert radiologist assistant at Tenwek Hospital.
Analyze this X-Ray image specifically for signs of Multiple Myeloma using advanced computer vision simulation.

**Methodology:**
Simulate the output of a **Python-based lesion detection algorithm**.
1. Scan for **"Punched-out" lytic lesions** (radiolucent spots) in skull, long bones, or pelvis.
2. Evaluate **Bone Density (Osteopenia)**: Look for cortical thinning.
3. Identify **Pathological fractures**: Compression fractures in vertebrae.

Provide a concise clinical summary of findings (max 3-4 sentences).
If no obvious signs are present, state "No specific radiological evidence of myeloma lesions detected in this view."
If the image is not an X-Ray or is unreadable, please state that."#;

fn patient_context(record: &PatientRecord) -> String {
    let mut lines = vec!["**Patient Context:**".to_string()];
    if !record.patient_id.is_empty() {
        lines.push(format!("- Patient ID: {}", record.patient_id));
    }
    if !record.uhid.is_empty() {
        lines.push(format!("- UHID: {}", record.uhid));
    }
    lines.push(format!("- Age: {}", record.age));
    lines.push(format!(
        "- Gender: {}",
        record.gender.map(|g| g.as_str()).unwrap_or("")
    ));
    // Pregnancy is only surfaced for female patients; the stored flag is
    // ignored otherwise.
    if record.gender == Some(Gender::Female) {
        let status = if record.is_pregnant {
            "PREGNANT"
        } else {
            "Not Pregnant"
        };
        lines.push(format!("- Pregnancy Status: {status}"));
    }
    lines.push(format!(
        "- Location: {} (High risk zone if Bomet East)",
        record.location
    ));
    lines.join("\n")
}

fn medical_history(record: &PatientRecord) -> String {
    let history = &record.medical_history;
    let mut lines = vec!["**Past Medical History:**".to_string()];
    if history.prior_bone_issues != Severity::None {
        lines.push(format!(
            "- Prior Bone Issues (Fractures/Osteoporosis): {}",
            history.prior_bone_issues
        ));
    }
    if history.prior_kidney_issues != Severity::None {
        lines.push(format!(
            "- History of Kidney Disease: {}",
            history.prior_kidney_issues
        ));
    }
    if history.history_of_mgus {
        lines.push("- History of Monoclonal Gammopathy (MGUS)".to_string());
    }
    if !history.other.is_empty() {
        lines.push(format!("- Other History: {}", history.other));
    }
    if history.is_unremarkable() {
        lines.push("- No significant history reported".to_string());
    }
    lines.join("\n")
}

fn reported_symptoms(record: &PatientRecord) -> String {
    let mut lines = vec!["**Reported Symptoms:**".to_string()];
    for phrase in record.symptoms.active_phrases() {
        lines.push(format!("- {phrase}"));
    }
    lines.join("\n")
}

fn lab_indicators(record: &PatientRecord) -> String {
    let labs = &record.lab_results;
    let mut lines = vec!["**Lab/Clinical Indicators:**".to_string()];
    if labs.m_protein_present {
        let level = if labs.m_protein_value > 0.0 {
            format!(": Level {} g/dL", labs.m_protein_value)
        } else {
            String::new()
        };
        lines.push(format!("- M-Protein Present (SPEP){level}"));
    }
    if labs.anemia {
        lines.push("- anemia".to_string());
    }
    if labs.hypercalcemia {
        lines.push("- hypercalcemia".to_string());
    }
    if labs.kidney_issues {
        lines.push("- renal insufficiency / high creatinine (kidney failure)".to_string());
    }
    lines.join("\n")
}

fn bone_marrow(record: &PatientRecord) -> String {
    let biopsy = &record.bone_marrow_biopsy;
    let detected = if biopsy.abnormal_plasma_cells {
        "YES"
    } else {
        "No"
    };
    format!(
        "**Bone Marrow Biopsy (BMA):**\n- Plasma Cell Percentage: {}%\n- Abnormal/Clonal Plasma Cells Detected: {detected}",
        biopsy.plasma_cell_percentage
    )
}

/// Fold the general intake notes, the per-modality image notes, and any stored
/// X-ray review into one block. Reads only; the stored values stay untouched.
fn additional_notes(record: &PatientRecord, imaging: &ImagingSet) -> String {
    let mut lines = vec!["**Additional Notes:**".to_string()];
    if !record.notes.is_empty() {
        lines.push(record.notes.clone());
    }
    for modality in Modality::ALL {
        let note = imaging.note(modality);
        if !note.is_empty() {
            lines.push(format!("{} {note}", modality.note_label()));
        }
    }
    if let Some(finding) = imaging.xray_finding() {
        lines.push(format!("Prior X-Ray AI finding: {finding}"));
    }
    lines.join("\n")
}

/// Assemble the full assessment prompt. Deterministic: the same record and
/// imaging always produce the same text.
pub fn build_prompt(record: &PatientRecord, imaging: &ImagingSet) -> String {
    [
        CAPABILITY_DIRECTIVES.to_string(),
        patient_context(record),
        medical_history(record),
        reported_symptoms(record),
        lab_indicators(record),
        bone_marrow(record),
        additional_notes(record, imaging),
        DISEASE_MARKERS.to_string(),
        CONTRAINDICATION_WARNINGS.to_string(),
        TASK_DIRECTIVES.to_string(),
    ]
    .join("\n\n")
}

/// Build the submission-ready request: the prompt plus every attached image in
/// fixed modality order.
pub fn build_assessment_request(record: &PatientRecord, imaging: &ImagingSet) -> AssessmentRequest {
    let images = imaging
        .attachments()
        .map(|(modality, image)| LabeledImage {
            modality,
            image: image.clone(),
        })
        .collect();
    AssessmentRequest {
        prompt: build_prompt(record, imaging),
        images,
    }
}
