//! Diagnostic image capture and per-modality attachment state.
//!
//! Capture is encode-only: the file becomes a base64 payload plus a MIME
//! type, with no resizing, format conversion, or content inspection. The
//! `ImagingSet` mirrors the three upload slots on the intake screen (CT,
//! X-ray, ultrasound), each with an operator note, plus the standalone
//! AI finding the X-ray review can produce.

use std::path::Path;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Modality;

/// Errors from capturing an image file.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Could not read image file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a recognized image file")]
    NotAnImage { path: String },
}

/// A captured diagnostic image ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Base64-encoded file contents (standard alphabet, padded).
    pub payload: String,
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
}

impl ImageData {
    /// Encode bytes the caller already holds (file picker, clipboard).
    pub fn capture(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            payload: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Read an image file from disk, guessing the MIME type from the
    /// extension.
    ///
    /// Accepts `image/*` only — the same filter the intake form's picker
    /// advertises. No size or content checks beyond that.
    pub fn capture_file(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let mime = match mime_guess::from_path(path).first() {
            Some(m) if m.type_() == mime_guess::mime::IMAGE => m,
            _ => {
                return Err(CaptureError::NotAnImage {
                    path: path.display().to_string(),
                })
            }
        };

        let bytes = std::fs::read(path).map_err(|source| CaptureError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self::capture(&bytes, mime.essence_str()))
    }
}

/// One upload slot: the captured image (if any) and the operator's note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AttachmentSlot {
    image: Option<ImageData>,
    note: String,
}

/// The three modality slots of one intake session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagingSet {
    ct_scan: AttachmentSlot,
    xray: AttachmentSlot,
    ultrasound: AttachmentSlot,
    /// AI finding from the standalone X-ray review. Describes the attached
    /// X-ray, so it is dropped whenever that image is cleared or replaced.
    xray_finding: Option<String>,
}

impl ImagingSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, modality: Modality) -> &AttachmentSlot {
        match modality {
            Modality::CtScan => &self.ct_scan,
            Modality::Xray => &self.xray,
            Modality::Ultrasound => &self.ultrasound,
        }
    }

    fn slot_mut(&mut self, modality: Modality) -> &mut AttachmentSlot {
        match modality {
            Modality::CtScan => &mut self.ct_scan,
            Modality::Xray => &mut self.xray,
            Modality::Ultrasound => &mut self.ultrasound,
        }
    }

    /// Store a captured image in the modality's slot, replacing any previous
    /// one.
    pub fn attach(&mut self, modality: Modality, image: ImageData) {
        if modality == Modality::Xray {
            self.xray_finding = None;
        }
        self.slot_mut(modality).image = Some(image);
    }

    /// Remove the modality's image. The operator note survives; the X-ray
    /// finding does not.
    pub fn clear(&mut self, modality: Modality) {
        if modality == Modality::Xray {
            self.xray_finding = None;
        }
        self.slot_mut(modality).image = None;
    }

    pub fn has(&self, modality: Modality) -> bool {
        self.slot(modality).image.is_some()
    }

    pub fn image(&self, modality: Modality) -> Option<&ImageData> {
        self.slot(modality).image.as_ref()
    }

    pub fn note(&self, modality: Modality) -> &str {
        &self.slot(modality).note
    }

    pub fn set_note(&mut self, modality: Modality, note: impl Into<String>) {
        self.slot_mut(modality).note = note.into();
    }

    pub fn xray_finding(&self) -> Option<&str> {
        self.xray_finding.as_deref()
    }

    pub fn set_xray_finding(&mut self, finding: impl Into<String>) {
        self.xray_finding = Some(finding.into());
    }

    pub fn attached_count(&self) -> usize {
        Modality::ALL.iter().filter(|m| self.has(**m)).count()
    }

    /// Attached images in submission order (CT, X-ray, ultrasound).
    pub fn attachments(&self) -> impl Iterator<Item = (Modality, &ImageData)> {
        Modality::ALL
            .iter()
            .filter_map(|m| self.image(*m).map(|img| (*m, img)))
    }

    /// True when no image, note, or finding is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drop all images, notes, and the X-ray finding (workflow reset).
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_uses_standard_base64() {
        let image = ImageData::capture(b"hello", "image/png");
        assert_eq!(image.payload, "aGVsbG8=");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn capture_file_guesses_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"fake png bytes").unwrap();

        let image = ImageData::capture_file(&path).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(
            image.payload,
            base64::engine::general_purpose::STANDARD.encode(b"fake png bytes")
        );
    }

    #[test]
    fn capture_file_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"not an image").unwrap();

        let err = ImageData::capture_file(&path).unwrap_err();
        assert!(matches!(err, CaptureError::NotAnImage { .. }));
    }

    #[test]
    fn capture_file_reports_unreadable_paths() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageData::capture_file(dir.path().join("missing.jpg")).unwrap_err();
        assert!(matches!(err, CaptureError::Unreadable { .. }));
    }

    #[test]
    fn attach_and_clear_one_slot() {
        let mut set = ImagingSet::new();
        assert!(!set.has(Modality::CtScan));

        set.attach(Modality::CtScan, ImageData::capture(b"ct", "image/png"));
        assert!(set.has(Modality::CtScan));
        assert_eq!(set.attached_count(), 1);

        set.clear(Modality::CtScan);
        assert!(!set.has(Modality::CtScan));
        assert_eq!(set.attached_count(), 0);
    }

    #[test]
    fn notes_survive_clearing_the_image() {
        let mut set = ImagingSet::new();
        set.attach(Modality::Ultrasound, ImageData::capture(b"us", "image/png"));
        set.set_note(Modality::Ultrasound, "renal echo texture queried");

        set.clear(Modality::Ultrasound);
        assert_eq!(set.note(Modality::Ultrasound), "renal echo texture queried");
    }

    #[test]
    fn xray_finding_dropped_with_its_image() {
        let mut set = ImagingSet::new();
        set.attach(Modality::Xray, ImageData::capture(b"x1", "image/jpeg"));
        set.set_xray_finding("Lytic lesion suspected in left femur.");

        set.clear(Modality::Xray);
        assert_eq!(set.xray_finding(), None);

        set.attach(Modality::Xray, ImageData::capture(b"x2", "image/jpeg"));
        set.set_xray_finding("stale");
        set.attach(Modality::Xray, ImageData::capture(b"x3", "image/jpeg"));
        assert_eq!(set.xray_finding(), None, "replacing the image drops the finding");
    }

    #[test]
    fn attachments_iterate_in_submission_order() {
        let mut set = ImagingSet::new();
        set.attach(Modality::Ultrasound, ImageData::capture(b"us", "image/png"));
        set.attach(Modality::CtScan, ImageData::capture(b"ct", "image/png"));

        let order: Vec<Modality> = set.attachments().map(|(m, _)| m).collect();
        assert_eq!(order, vec![Modality::CtScan, Modality::Ultrasound]);
    }

    #[test]
    fn clear_all_restores_the_empty_set() {
        let mut set = ImagingSet::new();
        set.attach(Modality::Xray, ImageData::capture(b"x", "image/png"));
        set.set_note(Modality::CtScan, "prior scan from referral");
        set.set_xray_finding("finding");
        assert!(!set.is_empty());

        set.clear_all();
        assert!(set.is_empty());
        assert_eq!(set, ImagingSet::default());
    }
}
