//! Workflow controller — drives one intake case from entry to report.
//!
//! **Why this exists**: the intake form, the confirmation gate, the analysis
//! call, and the report all read and mutate the same case. Scattering that
//! state across an embedding UI invites partial updates and stuck screens.
//! This controller owns the case outright and exposes a small set of
//! operations whose preconditions are checked here, once.
//!
//! **Design**: an [`IntakeWorkflow`] holds the patient record, the imaging
//! set, and the latest result behind a three-step state machine
//! (Intake → Analyzing → Report). Record edits are whole-value swaps built
//! with the record's `with_*` helpers, so an observer never sees a half-edited
//! case. A failed analysis lands back in Intake with everything the operator
//! entered still in place; only `reset` discards a case.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{info, warn};

use crate::assessment::{
    build_assessment_request, review_image, submit_assessment, AssessmentError, AssessmentResult,
    GenerativeClient,
};
use crate::imaging::{ImageData, ImagingSet};
use crate::models::{Modality, PatientRecord, Severity};
use crate::validation;

/// Fallback finding stored when the X-ray quick review fails. The main
/// workflow is unaffected; the text goes where the review would have gone.
pub const XRAY_REVIEW_FAILED: &str = "Failed to analyze X-Ray.";

/// Steps of one intake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Intake,
    Analyzing,
    Report,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Intake => "intake",
            WorkflowState::Analyzing => "analyzing",
            WorkflowState::Report => "report",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Please complete the basic patient demographics.")]
    ValidationFailed,

    #[error("An assessment is already in progress.")]
    AnalysisInProgress,

    #[error("Cannot reset while an assessment is in progress.")]
    Busy,

    #[error("Confirm the patient data before starting the analysis.")]
    NotConfirmed,

    #[error("Cannot {action} during the {state} step.")]
    InvalidState {
        action: &'static str,
        state: WorkflowState,
    },

    #[error("No X-Ray image is attached.")]
    NoXrayAttached,

    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}

/// Digest of the entered case, shown for review before the analysis starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationSummary {
    /// "61 yrs, Male"
    pub patient_line: String,
    pub patient_id: Option<String>,
    pub uhid: Option<String>,
    pub is_pregnant: bool,
    pub location: String,
    pub high_prevalence_area: bool,
    pub active_symptoms: Vec<&'static str>,
    pub abnormal_findings: Vec<String>,
    pub has_ct_scan: bool,
    pub has_xray: bool,
    pub has_ultrasound: bool,
}

impl ConfirmationSummary {
    fn from_case(record: &PatientRecord, imaging: &ImagingSet) -> Self {
        let gender = record.gender.map(|g| g.as_str()).unwrap_or("");
        let history = &record.medical_history;
        let labs = &record.lab_results;
        let biopsy = &record.bone_marrow_biopsy;

        let mut abnormal_findings = Vec::new();
        if history.prior_bone_issues != Severity::None {
            abnormal_findings.push(format!(
                "History: {} Bone Issues",
                history.prior_bone_issues
            ));
        }
        if history.prior_kidney_issues != Severity::None {
            abnormal_findings.push(format!(
                "History: {} Kidney Issues",
                history.prior_kidney_issues
            ));
        }
        for flag in labs.active_flags() {
            abnormal_findings.push(flag.to_string());
        }
        if labs.m_protein_present {
            abnormal_findings.push(format!("M-Protein Level: {} g/dL", labs.m_protein_value));
        }
        if biopsy.plasma_cell_percentage > 0 {
            abnormal_findings.push(format!(
                "BMA Plasma Cells: {}%",
                biopsy.plasma_cell_percentage
            ));
        }

        Self {
            patient_line: format!("{} yrs, {gender}", record.age),
            patient_id: (!record.patient_id.is_empty()).then(|| record.patient_id.clone()),
            uhid: (!record.uhid.is_empty()).then(|| record.uhid.clone()),
            is_pregnant: record.is_pregnant,
            location: record.location.clone(),
            high_prevalence_area: record.in_high_prevalence_area(),
            active_symptoms: record.symptoms.active_phrases(),
            abnormal_findings,
            has_ct_scan: imaging.has(Modality::CtScan),
            has_xray: imaging.has(Modality::Xray),
            has_ultrasound: imaging.has(Modality::Ultrasound),
        }
    }
}

/// Controller for one intake case.
///
/// All mutating operations require `&mut self`; an in-flight analysis holds
/// the borrow, so the embedder must drive `confirm_and_analyze` to completion
/// before issuing further operations.
pub struct IntakeWorkflow<C> {
    client: C,
    state: WorkflowState,
    record: PatientRecord,
    imaging: ImagingSet,
    result: Option<AssessmentResult>,
    banner_error: Option<String>,
    field_errors: BTreeMap<&'static str, String>,
    awaiting_confirmation: bool,
}

impl<C: GenerativeClient> IntakeWorkflow<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: WorkflowState::Intake,
            record: PatientRecord::default(),
            imaging: ImagingSet::new(),
            result: None,
            banner_error: None,
            field_errors: BTreeMap::new(),
            awaiting_confirmation: false,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn record(&self) -> &PatientRecord {
        &self.record
    }

    pub fn imaging(&self) -> &ImagingSet {
        &self.imaging
    }

    pub fn result(&self) -> Option<&AssessmentResult> {
        self.result.as_ref()
    }

    /// Case-level error message, if the last operation failed.
    pub fn banner_error(&self) -> Option<&str> {
        self.banner_error.as_deref()
    }

    /// Per-field validation messages from the last rejected analysis request.
    pub fn field_errors(&self) -> &BTreeMap<&'static str, String> {
        &self.field_errors
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation
    }

    /// Replace the patient record with an edited copy.
    ///
    /// A field's validation message is dropped as soon as the edit supplies
    /// that field; messages for still-missing fields stay up.
    pub fn update_record(&mut self, record: PatientRecord) -> Result<(), WorkflowError> {
        self.ensure_intake("edit the record")?;
        self.awaiting_confirmation = false;
        self.record = record;
        let record = &self.record;
        self.field_errors
            .retain(|field, _| !validation::field_is_present(record, field));
        Ok(())
    }

    pub fn attach_image(
        &mut self,
        modality: Modality,
        image: ImageData,
    ) -> Result<(), WorkflowError> {
        self.ensure_intake("attach an image")?;
        self.awaiting_confirmation = false;
        self.imaging.attach(modality, image);
        Ok(())
    }

    pub fn clear_image(&mut self, modality: Modality) -> Result<(), WorkflowError> {
        self.ensure_intake("clear an image")?;
        self.awaiting_confirmation = false;
        self.imaging.clear(modality);
        Ok(())
    }

    pub fn set_image_note(
        &mut self,
        modality: Modality,
        note: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        self.ensure_intake("edit an image note")?;
        self.awaiting_confirmation = false;
        self.imaging.set_note(modality, note);
        Ok(())
    }

    /// Validate the case and open the confirmation gate.
    ///
    /// On success the returned summary is what the operator reviews; the gate
    /// stays open until the case is edited, cancelled, or confirmed.
    pub fn request_analysis(&mut self) -> Result<ConfirmationSummary, WorkflowError> {
        match self.state {
            WorkflowState::Analyzing => return Err(WorkflowError::AnalysisInProgress),
            WorkflowState::Report => {
                return Err(WorkflowError::InvalidState {
                    action: "start an analysis",
                    state: self.state,
                })
            }
            WorkflowState::Intake => {}
        }

        let errors = validation::validate(&self.record);
        if !errors.is_empty() {
            self.field_errors = errors;
            self.banner_error = Some(WorkflowError::ValidationFailed.to_string());
            return Err(WorkflowError::ValidationFailed);
        }

        self.field_errors.clear();
        self.banner_error = None;
        self.awaiting_confirmation = true;
        Ok(ConfirmationSummary::from_case(&self.record, &self.imaging))
    }

    /// Close the confirmation gate without analyzing.
    pub fn cancel_confirmation(&mut self) {
        self.awaiting_confirmation = false;
    }

    /// Run the confirmed analysis.
    ///
    /// Success lands in Report with the result stored. Any failure lands back
    /// in Intake with the record and imaging untouched and the error text in
    /// the banner.
    pub async fn confirm_and_analyze(&mut self) -> Result<(), WorkflowError> {
        match self.state {
            WorkflowState::Analyzing => return Err(WorkflowError::AnalysisInProgress),
            WorkflowState::Report => {
                return Err(WorkflowError::InvalidState {
                    action: "start an analysis",
                    state: self.state,
                })
            }
            WorkflowState::Intake => {}
        }
        if !self.awaiting_confirmation {
            return Err(WorkflowError::NotConfirmed);
        }

        self.awaiting_confirmation = false;
        self.banner_error = None;
        self.state = WorkflowState::Analyzing;
        info!(images = self.imaging.attached_count(), "analysis started");

        let request = build_assessment_request(&self.record, &self.imaging);
        match submit_assessment(&self.client, &request).await {
            Ok(result) => {
                info!(risk_level = %result.risk_level, "analysis finished");
                self.result = Some(result);
                self.state = WorkflowState::Report;
                Ok(())
            }
            Err(e) => {
                warn!(error = ?e, "analysis failed, returning to intake");
                self.banner_error = Some(e.to_string());
                self.state = WorkflowState::Intake;
                Err(WorkflowError::Assessment(e))
            }
        }
    }

    /// Discard the case and start a fresh one. The client is kept.
    pub fn reset(&mut self) -> Result<(), WorkflowError> {
        if self.state == WorkflowState::Analyzing {
            return Err(WorkflowError::Busy);
        }
        self.record = PatientRecord::default();
        self.imaging.clear_all();
        self.result = None;
        self.banner_error = None;
        self.field_errors.clear();
        self.awaiting_confirmation = false;
        self.state = WorkflowState::Intake;
        info!("workflow reset");
        Ok(())
    }

    /// Quick review of the attached X-ray, independent of the main analysis.
    ///
    /// The review text is stored as the imaging set's X-ray finding and also
    /// returned. A failed review stores [`XRAY_REVIEW_FAILED`] instead of
    /// surfacing the error; the main workflow state never changes.
    pub async fn review_xray(&mut self) -> Result<String, WorkflowError> {
        self.ensure_intake("review the X-Ray")?;
        let image = self
            .imaging
            .image(Modality::Xray)
            .cloned()
            .ok_or(WorkflowError::NoXrayAttached)?;

        self.awaiting_confirmation = false;
        let finding = match review_image(&self.client, &image).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = ?e, "X-ray quick review failed");
                XRAY_REVIEW_FAILED.to_string()
            }
        };
        self.imaging.set_xray_finding(finding.clone());
        Ok(finding)
    }

    /// Append the stored X-ray finding to the X-ray note. No-op when no
    /// finding is stored.
    pub fn apply_xray_finding_to_note(&mut self) -> Result<(), WorkflowError> {
        self.ensure_intake("edit an image note")?;
        let Some(finding) = self.imaging.xray_finding().map(str::to_string) else {
            return Ok(());
        };
        self.awaiting_confirmation = false;
        let current = self.imaging.note(Modality::Xray);
        let note = if current.is_empty() {
            finding
        } else {
            format!("{current}\n{finding}")
        };
        self.imaging.set_note(Modality::Xray, note);
        Ok(())
    }

    fn ensure_intake(&self, action: &'static str) -> Result<(), WorkflowError> {
        if self.state != WorkflowState::Intake {
            return Err(WorkflowError::InvalidState {
                action,
                state: self.state,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::gemini::{FailingGenerativeClient, MockGenerativeClient};
    use crate::assessment::types::{GenerationOptions, RequestPart};
    use crate::models::{Gender, LabResults, RiskLevel};
    use std::time::Duration;

    const VALID_REPLY: &str = r#"{
  "riskLevel": "High",
  "summary": "Multiple CRAB criteria present.",
  "findings": ["Bone pain", "Anemia"],
  "recommendations": ["Refer to oncology"]
}"#;

    /// Client whose reply never arrives.
    struct PendingClient;

    impl GenerativeClient for PendingClient {
        fn generate(
            &self,
            _parts: &[RequestPart],
            _options: &GenerationOptions,
        ) -> impl std::future::Future<Output = Result<String, AssessmentError>> + Send {
            std::future::pending()
        }
    }

    fn valid_record() -> PatientRecord {
        PatientRecord::default()
            .with_age("61")
            .with_gender(Some(Gender::Male))
            .with_location("Bomet East")
    }

    #[test]
    fn new_workflow_starts_clean_at_intake() {
        let workflow = IntakeWorkflow::new(MockGenerativeClient::new(""));
        assert_eq!(workflow.state(), WorkflowState::Intake);
        assert_eq!(workflow.record(), &PatientRecord::default());
        assert!(workflow.imaging().is_empty());
        assert!(workflow.result().is_none());
        assert!(workflow.banner_error().is_none());
        assert!(workflow.field_errors().is_empty());
        assert!(!workflow.is_awaiting_confirmation());
    }

    #[test]
    fn request_analysis_rejects_incomplete_demographics() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        let err = workflow.request_analysis().unwrap_err();

        assert!(matches!(err, WorkflowError::ValidationFailed));
        assert_eq!(
            workflow.banner_error(),
            Some("Please complete the basic patient demographics.")
        );
        assert_eq!(workflow.field_errors().len(), 3);
        assert_eq!(
            workflow.field_errors().get("age").map(String::as_str),
            Some("Age is required.")
        );
        assert_eq!(workflow.state(), WorkflowState::Intake);
        assert!(!workflow.is_awaiting_confirmation());
    }

    #[test]
    fn field_errors_drop_as_fields_are_supplied() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        workflow.request_analysis().unwrap_err();
        assert_eq!(workflow.field_errors().len(), 3);

        let record = workflow.record().clone().with_age("45");
        workflow.update_record(record).unwrap();
        assert!(!workflow.field_errors().contains_key("age"));
        assert!(workflow.field_errors().contains_key("gender"));
        assert!(workflow.field_errors().contains_key("location"));

        let record = workflow
            .record()
            .clone()
            .with_gender(Some(Gender::Female))
            .with_location("Kericho");
        workflow.update_record(record).unwrap();
        assert!(workflow.field_errors().is_empty());
    }

    #[test]
    fn request_analysis_summarizes_the_case() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        let record = valid_record()
            .with_patient_id("P-104")
            .with_lab_results(LabResults {
                m_protein_present: true,
                m_protein_value: 2.1,
                anemia: true,
                ..Default::default()
            });
        workflow.update_record(record).unwrap();
        workflow
            .attach_image(Modality::Xray, ImageData::capture(b"x", "image/png"))
            .unwrap();

        let summary = workflow.request_analysis().unwrap();
        assert_eq!(summary.patient_line, "61 yrs, Male");
        assert_eq!(summary.patient_id.as_deref(), Some("P-104"));
        assert_eq!(summary.uhid, None);
        assert!(summary.high_prevalence_area);
        assert!(summary
            .abnormal_findings
            .contains(&"M-Protein Level: 2.1 g/dL".to_string()));
        assert!(summary.abnormal_findings.contains(&"anemia".to_string()));
        assert!(summary.has_xray);
        assert!(!summary.has_ct_scan);
        assert!(workflow.is_awaiting_confirmation());
        assert!(workflow.banner_error().is_none());
    }

    #[tokio::test]
    async fn confirm_requires_an_open_gate() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        workflow.update_record(valid_record()).unwrap();

        let err = workflow.confirm_and_analyze().await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotConfirmed));
        assert_eq!(workflow.state(), WorkflowState::Intake);
    }

    #[tokio::test]
    async fn editing_closes_the_confirmation_gate() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        workflow.update_record(valid_record()).unwrap();
        workflow.request_analysis().unwrap();
        assert!(workflow.is_awaiting_confirmation());

        workflow
            .update_record(workflow.record().clone().with_age("62"))
            .unwrap();
        assert!(!workflow.is_awaiting_confirmation());

        let err = workflow.confirm_and_analyze().await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotConfirmed));
    }

    #[test]
    fn cancel_closes_the_confirmation_gate() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        workflow.update_record(valid_record()).unwrap();
        workflow.request_analysis().unwrap();

        workflow.cancel_confirmation();
        assert!(!workflow.is_awaiting_confirmation());
        assert_eq!(workflow.state(), WorkflowState::Intake);
    }

    #[tokio::test]
    async fn confirmed_analysis_lands_in_report() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        workflow.update_record(valid_record()).unwrap();
        workflow.request_analysis().unwrap();
        workflow.confirm_and_analyze().await.unwrap();

        assert_eq!(workflow.state(), WorkflowState::Report);
        let result = workflow.result().unwrap();
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.raw_response, VALID_REPLY);
        assert!(workflow.banner_error().is_none());
        assert_eq!(workflow.record(), &valid_record());
    }

    #[tokio::test]
    async fn failed_analysis_returns_to_intake_with_case_intact() {
        let mut workflow = IntakeWorkflow::new(FailingGenerativeClient::new("socket closed"));
        let record = valid_record().with_notes("night sweats");
        workflow.update_record(record.clone()).unwrap();
        workflow
            .attach_image(Modality::CtScan, ImageData::capture(b"ct", "image/png"))
            .unwrap();
        let imaging_before = workflow.imaging().clone();

        workflow.request_analysis().unwrap();
        let err = workflow.confirm_and_analyze().await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Assessment(AssessmentError::Unavailable { .. })
        ));
        assert_eq!(workflow.state(), WorkflowState::Intake);
        assert_eq!(
            workflow.banner_error(),
            Some("Failed to analyze patient data. Please try again.")
        );
        assert_eq!(workflow.record(), &record);
        assert_eq!(workflow.imaging(), &imaging_before);
        assert!(workflow.result().is_none());
    }

    #[tokio::test]
    async fn malformed_reply_shows_the_same_banner() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new("no json here"));
        workflow.update_record(valid_record()).unwrap();
        workflow.request_analysis().unwrap();

        let err = workflow.confirm_and_analyze().await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Assessment(AssessmentError::MalformedResponse { .. })
        ));
        assert_eq!(
            workflow.banner_error(),
            Some("Failed to analyze patient data. Please try again.")
        );
        assert_eq!(workflow.state(), WorkflowState::Intake);
    }

    #[tokio::test]
    async fn report_state_rejects_edits_and_new_requests() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        workflow.update_record(valid_record()).unwrap();
        workflow.request_analysis().unwrap();
        workflow.confirm_and_analyze().await.unwrap();

        assert!(matches!(
            workflow.update_record(valid_record()),
            Err(WorkflowError::InvalidState { state: WorkflowState::Report, .. })
        ));
        assert!(matches!(
            workflow.attach_image(Modality::Xray, ImageData::capture(b"x", "image/png")),
            Err(WorkflowError::InvalidState { .. })
        ));
        assert!(matches!(
            workflow.request_analysis(),
            Err(WorkflowError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        workflow.update_record(valid_record()).unwrap();
        workflow
            .attach_image(Modality::Xray, ImageData::capture(b"x", "image/png"))
            .unwrap();
        workflow.set_image_note(Modality::Xray, "low dose").unwrap();
        workflow.request_analysis().unwrap();
        workflow.confirm_and_analyze().await.unwrap();
        assert_eq!(workflow.state(), WorkflowState::Report);

        workflow.reset().unwrap();
        assert_eq!(workflow.state(), WorkflowState::Intake);
        assert_eq!(workflow.record(), &PatientRecord::default());
        assert!(workflow.imaging().is_empty());
        assert!(workflow.result().is_none());
        assert!(workflow.banner_error().is_none());
        assert!(workflow.field_errors().is_empty());
    }

    #[test]
    fn reset_from_intake_discards_partial_entry() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new(VALID_REPLY));
        workflow
            .update_record(PatientRecord::default().with_age("30"))
            .unwrap();
        workflow.request_analysis().unwrap_err();

        workflow.reset().unwrap();
        assert_eq!(workflow.record(), &PatientRecord::default());
        assert!(workflow.banner_error().is_none());
        assert!(workflow.field_errors().is_empty());
    }

    #[tokio::test]
    async fn in_flight_analysis_blocks_other_operations() {
        let mut workflow = IntakeWorkflow::new(PendingClient);
        workflow.update_record(valid_record()).unwrap();
        workflow.request_analysis().unwrap();

        {
            let analyze = workflow.confirm_and_analyze();
            tokio::pin!(analyze);
            let poll = tokio::time::timeout(Duration::from_millis(10), analyze.as_mut()).await;
            assert!(poll.is_err(), "analysis should still be pending");
        }

        assert_eq!(workflow.state(), WorkflowState::Analyzing);
        assert!(matches!(
            workflow.request_analysis(),
            Err(WorkflowError::AnalysisInProgress)
        ));
        assert!(matches!(workflow.reset(), Err(WorkflowError::Busy)));
        assert!(matches!(
            workflow.update_record(valid_record()),
            Err(WorkflowError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn review_xray_requires_an_attachment() {
        let mut workflow = IntakeWorkflow::new(MockGenerativeClient::new("finding"));
        let err = workflow.review_xray().await.unwrap_err();
        assert!(matches!(err, WorkflowError::NoXrayAttached));
    }

    #[tokio::test]
    async fn review_xray_stores_the_finding() {
        let client = MockGenerativeClient::new("Punched-out lesions in the skull.");
        let mut workflow = IntakeWorkflow::new(client);
        workflow
            .attach_image(Modality::Xray, ImageData::capture(b"x", "image/png"))
            .unwrap();

        let finding = workflow.review_xray().await.unwrap();
        assert_eq!(finding, "Punched-out lesions in the skull.");
        assert_eq!(
            workflow.imaging().xray_finding(),
            Some("Punched-out lesions in the skull.")
        );
        assert_eq!(workflow.state(), WorkflowState::Intake);
        assert!(workflow.result().is_none());
    }

    #[tokio::test]
    async fn failed_review_stores_the_fallback_text() {
        let mut workflow = IntakeWorkflow::new(FailingGenerativeClient::new("dns failure"));
        workflow
            .attach_image(Modality::Xray, ImageData::capture(b"x", "image/png"))
            .unwrap();

        let finding = workflow.review_xray().await.unwrap();
        assert_eq!(finding, XRAY_REVIEW_FAILED);
        assert_eq!(workflow.imaging().xray_finding(), Some(XRAY_REVIEW_FAILED));
        assert!(workflow.banner_error().is_none());
        assert_eq!(workflow.state(), WorkflowState::Intake);
    }

    #[tokio::test]
    async fn apply_finding_appends_to_the_note() {
        let client = MockGenerativeClient::new("Osteopenia noted.");
        let mut workflow = IntakeWorkflow::new(client);
        workflow
            .attach_image(Modality::Xray, ImageData::capture(b"x", "image/png"))
            .unwrap();

        workflow.apply_xray_finding_to_note().unwrap();
        assert_eq!(workflow.imaging().note(Modality::Xray), "");

        workflow.review_xray().await.unwrap();
        workflow.apply_xray_finding_to_note().unwrap();
        assert_eq!(workflow.imaging().note(Modality::Xray), "Osteopenia noted.");

        workflow.set_image_note(Modality::Xray, "portable film").unwrap();
        workflow.apply_xray_finding_to_note().unwrap();
        assert_eq!(
            workflow.imaging().note(Modality::Xray),
            "portable film\nOsteopenia noted."
        );
    }
}
