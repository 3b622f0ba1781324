//! The persisted die description document
//!
//! A small JSON file ("Die Description File", conventionally `.ddf`) that
//! records the marked region and slice offsets so a marking session can be
//! resumed later. Bounds are stored already canonicalized; slice arrays are
//! written in whatever order the session currently stores them, which is not
//! necessarily sorted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The `fileType` value every description document must carry
pub const FILE_TYPE: &str = "Die Description File";

/// Highest document version this reader understands
pub const MAX_VERSION: i64 = 1;

/// Errors specific to reading a description document
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// The document is not valid JSON or is structurally wrong
    #[error("malformed description document: {0}")]
    Json(#[from] serde_json::Error),

    /// The `fileType` field is missing the expected marker string
    #[error("not a die description file (fileType {found:?})")]
    InvalidFileType {
        /// The value actually present
        found: String,
    },

    /// The document version is zero, negative, or newer than this reader
    #[error("unsupported description version {found} (accepted: 1..={MAX_VERSION})")]
    UnsupportedVersion {
        /// The version actually present
        found: i64,
    },

    /// More boundary points than a quad can hold
    #[error("romBounds holds {count} points, at most 4 allowed")]
    MalformedBounds {
        /// Number of entries actually present
        count: usize,
    },
}

/// On-disk shape of a die description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DieDescription {
    /// Format marker, always [`FILE_TYPE`]
    pub file_type: String,
    /// Format version, 1 for everything this crate writes
    pub version: i64,
    /// Boundary corners as `[x, y]` pairs, canonical order
    pub rom_bounds: Vec<[f64; 2]>,
    /// Horizontal-axis slice offsets, stored order
    pub horizontal_slices: Vec<f64>,
    /// Vertical-axis slice offsets, stored order
    pub vertical_slices: Vec<f64>,
}

impl DieDescription {
    /// Create an empty version-1 document
    pub fn new() -> Self {
        Self {
            file_type: FILE_TYPE.to_string(),
            version: MAX_VERSION,
            rom_bounds: Vec::new(),
            horizontal_slices: Vec::new(),
            vertical_slices: Vec::new(),
        }
    }

    /// Parse and validate a document from JSON text
    pub fn from_json(text: &str) -> Result<Self, DescriptionError> {
        let doc: Self = serde_json::from_str(text)?;
        doc.validate()?;
        Ok(doc)
    }

    /// Serialize to indented JSON, matching what the format has always used
    pub fn to_json_pretty(&self) -> Result<String, DescriptionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the format marker and version gate
    pub fn validate(&self) -> Result<(), DescriptionError> {
        if self.file_type != FILE_TYPE {
            return Err(DescriptionError::InvalidFileType {
                found: self.file_type.clone(),
            });
        }
        if self.version <= 0 || self.version > MAX_VERSION {
            return Err(DescriptionError::UnsupportedVersion {
                found: self.version,
            });
        }
        if self.rom_bounds.len() > 4 {
            return Err(DescriptionError::MalformedBounds {
                count: self.rom_bounds.len(),
            });
        }
        Ok(())
    }
}

impl Default for DieDescription {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut doc = DieDescription::new();
        doc.rom_bounds = vec![[0.0, 0.0], [10.0, 0.5], [10.0, 10.0], [0.0, 9.5]];
        doc.horizontal_slices = vec![0.5, 0.25]; // deliberately unsorted
        doc.vertical_slices = vec![0.75];

        let text = doc.to_json_pretty().unwrap();
        let parsed = DieDescription::from_json(&text).unwrap();
        assert_eq!(parsed, doc);
        // Stored order survives the trip untouched
        assert_eq!(parsed.horizontal_slices, vec![0.5, 0.25]);
    }

    #[test]
    fn test_field_names_match_format() {
        let doc = DieDescription::new();
        let text = doc.to_json_pretty().unwrap();
        assert!(text.contains("\"fileType\""));
        assert!(text.contains("\"romBounds\""));
        assert!(text.contains("\"horizontalSlices\""));
        assert!(text.contains("\"verticalSlices\""));
    }

    #[test]
    fn test_wrong_file_type_rejected() {
        let text = r#"{
            "fileType": "Something Else",
            "version": 1,
            "romBounds": [],
            "horizontalSlices": [],
            "verticalSlices": []
        }"#;
        assert!(matches!(
            DieDescription::from_json(text),
            Err(DescriptionError::InvalidFileType { .. })
        ));
    }

    #[test]
    fn test_version_gate() {
        for bad in [0, -1, 2] {
            let text = format!(
                r#"{{
                    "fileType": "Die Description File",
                    "version": {bad},
                    "romBounds": [],
                    "horizontalSlices": [],
                    "verticalSlices": []
                }}"#
            );
            assert!(matches!(
                DieDescription::from_json(&text),
                Err(DescriptionError::UnsupportedVersion { .. })
            ));
        }
    }

    #[test]
    fn test_too_many_bounds_rejected() {
        let mut doc = DieDescription::new();
        doc.rom_bounds = vec![[0.0, 0.0]; 5];
        assert!(matches!(
            doc.validate(),
            Err(DescriptionError::MalformedBounds { count: 5 })
        ));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            DieDescription::from_json("{not json"),
            Err(DescriptionError::Json(_))
        ));
    }
}
