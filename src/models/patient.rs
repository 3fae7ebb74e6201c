//! Patient record — the canonical in-memory representation of one intake case.
//!
//! The record lives for a single session, owned by the workflow controller.
//! Edits are copy-on-write: every `with_*` helper returns a new record, so a
//! holder of an earlier value never observes a partial update.

use serde::{Deserialize, Serialize};

use super::enums::{Gender, Severity};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub prior_bone_issues: Severity,
    pub prior_kidney_issues: Severity,
    /// Monoclonal Gammopathy of Undetermined Significance
    pub history_of_mgus: bool,
    pub other: String,
}

impl MedicalHistory {
    /// True when nothing beyond the defaults has been reported.
    pub fn is_unremarkable(&self) -> bool {
        self.prior_bone_issues == Severity::None
            && self.prior_kidney_issues == Severity::None
            && !self.history_of_mgus
            && self.other.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Symptoms {
    pub pneumonia_like: bool,
    pub blood_in_sputum: bool,
    pub bone_pain: bool,
    pub joint_swelling: bool,
    pub unexplained_fractures: bool,
    pub fatigue: bool,
    pub weight_loss: bool,
}

impl Symptoms {
    /// Display phrases for the active symptoms, in declaration order.
    pub fn active_phrases(&self) -> Vec<&'static str> {
        let flags = [
            (self.pneumonia_like, "pneumonia like"),
            (self.blood_in_sputum, "blood in sputum"),
            (self.bone_pain, "bone pain"),
            (self.joint_swelling, "joint swelling"),
            (self.unexplained_fractures, "unexplained fractures"),
            (self.fatigue, "fatigue"),
            (self.weight_loss, "weight loss"),
        ];
        flags.into_iter().filter(|(v, _)| *v).map(|(_, s)| s).collect()
    }
}

/// Banding of the serum M-protein level (g/dL) used on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MSpikeBand {
    NormalOrMgus,
    Intermediate,
    HighActive,
}

impl MSpikeBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            MSpikeBand::NormalOrMgus => "Low (Normal/MGUS range)",
            MSpikeBand::Intermediate => "Intermediate",
            MSpikeBand::HighActive => "High (Active Myeloma range)",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabResults {
    /// Serum protein electrophoresis showed a monoclonal spike.
    pub m_protein_present: bool,
    /// M-protein level in g/dL. Only meaningful when `m_protein_present`.
    pub m_protein_value: f64,
    pub anemia: bool,
    pub hypercalcemia: bool,
    pub kidney_issues: bool,
}

impl LabResults {
    /// Display phrases for the active lab flags, in declaration order.
    pub fn active_flags(&self) -> Vec<&'static str> {
        let flags = [
            (self.m_protein_present, "m protein present"),
            (self.anemia, "anemia"),
            (self.hypercalcemia, "hypercalcemia"),
            (self.kidney_issues, "kidney issues"),
        ];
        flags.into_iter().filter(|(v, _)| *v).map(|(_, s)| s).collect()
    }

    /// Clinical band for the current M-protein level.
    pub fn m_spike_band(&self) -> MSpikeBand {
        if self.m_protein_value < 1.5 {
            MSpikeBand::NormalOrMgus
        } else if self.m_protein_value < 3.0 {
            MSpikeBand::Intermediate
        } else {
            MSpikeBand::HighActive
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneMarrowBiopsy {
    /// Plasma cell share of the aspirate, 0–100.
    pub plasma_cell_percentage: u8,
    pub abnormal_plasma_cells: bool,
}

/// One patient case as entered on the intake form.
///
/// Free-text fields use the empty string for "not provided" (they are bound
/// to text inputs); `gender` is `None` until the operator picks a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: String,
    pub uhid: String,
    /// Raw text of the age input. Validated as an integer in [0,120].
    pub age: String,
    pub gender: Option<Gender>,
    pub location: String,
    /// Meaningful only when `gender` is `Some(Female)`.
    pub is_pregnant: bool,
    pub medical_history: MedicalHistory,
    pub symptoms: Symptoms,
    pub lab_results: LabResults,
    pub bone_marrow_biopsy: BoneMarrowBiopsy,
    pub notes: String,
}

impl PatientRecord {
    pub fn with_patient_id(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = patient_id.into();
        self
    }

    pub fn with_uhid(mut self, uhid: impl Into<String>) -> Self {
        self.uhid = uhid.into();
        self
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = age.into();
        self
    }

    pub fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_pregnancy(mut self, is_pregnant: bool) -> Self {
        self.is_pregnant = is_pregnant;
        self
    }

    pub fn with_history(mut self, history: MedicalHistory) -> Self {
        self.medical_history = history;
        self
    }

    pub fn with_symptoms(mut self, symptoms: Symptoms) -> Self {
        self.symptoms = symptoms;
        self
    }

    pub fn with_lab_results(mut self, labs: LabResults) -> Self {
        self.lab_results = labs;
        self
    }

    pub fn with_biopsy(mut self, biopsy: BoneMarrowBiopsy) -> Self {
        self.bone_marrow_biopsy = biopsy;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whether the stated location falls in the region's high-prevalence zone.
    pub fn in_high_prevalence_area(&self) -> bool {
        self.location.to_lowercase().contains("bomet")
    }
}
