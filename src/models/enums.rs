use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + Display + std::str::FromStr pattern.
///
/// Variant order is meaningful: the derived `Ord` gives the ordinal enums
/// (`Severity`, `RiskLevel`) their clinical ordering.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
});

str_enum!(Severity {
    None => "None",
    Mild => "Mild",
    Moderate => "Moderate",
    Severe => "Severe",
});

impl Default for Severity {
    fn default() -> Self {
        Severity::None
    }
}

str_enum!(RiskLevel {
    Low => "Low",
    Moderate => "Moderate",
    High => "High",
    Critical => "Critical",
});

str_enum!(Modality {
    CtScan => "CT Scan",
    Xray => "X-Ray",
    Ultrasound => "Ultrasound",
});

impl Modality {
    /// Submission order for attached images: CT first, then X-ray, then
    /// ultrasound.
    pub const ALL: [Modality; 3] = [Modality::CtScan, Modality::Xray, Modality::Ultrasound];

    /// Fixed label preceding this modality's image in the outgoing request.
    /// Slot numbers are per-modality and never renumbered when a slot is empty.
    pub fn attachment_label(&self) -> &'static str {
        match self {
            Modality::CtScan => "Attached Image 1: CT Scan",
            Modality::Xray => "Attached Image 2: X-Ray",
            Modality::Ultrasound => "Attached Image 3: Ultrasound",
        }
    }

    /// Prefix used when a per-modality note is folded into the outgoing notes.
    pub fn note_label(&self) -> &'static str {
        match self {
            Modality::CtScan => "CT Scan note:",
            Modality::Xray => "X-Ray note:",
            Modality::Ultrasound => "Ultrasound note:",
        }
    }
}
