//! Processing request payloads

use serde::{Deserialize, Serialize};

use crate::domain::job::{GarmentType, JobType};

/// Options for a try-on submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TryOnOptions {
    /// Keep the model photo's original background in the rendered result
    pub preserve_background: bool,
    /// Let the backend rescale the garment to fit the model
    pub adjust_size: bool,
    /// Hint for where the garment sits on the body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub garment_type: Option<GarmentType>,
}

impl Default for TryOnOptions {
    fn default() -> Self {
        Self {
            preserve_background: false,
            adjust_size: true,
            garment_type: None,
        }
    }
}

/// Options for a try-off submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TryOffOptions {
    /// Extract every detected garment rather than the most confident one
    pub extract_all: bool,
    /// Garment classifications the extraction should keep
    pub garment_types: Vec<GarmentType>,
    /// Image format for the extracted garment files
    pub output_format: String,
}

impl Default for TryOffOptions {
    fn default() -> Self {
        Self {
            extract_all: true,
            garment_types: vec![GarmentType::Upper, GarmentType::Lower, GarmentType::Full],
            output_format: "png".to_string(),
        }
    }
}

/// An image supplied by the caller, transmitted as a multipart file part
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// Original file name, used for the multipart part and format checks
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Lowercased file extension, if the name carries one
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// A caller-constructed submission, one variant per job type
#[derive(Debug, Clone)]
pub enum ProcessingRequest {
    TryOn {
        model_image: ImagePayload,
        garment_image: ImagePayload,
        options: Option<TryOnOptions>,
    },
    TryOff {
        model_image: ImagePayload,
        options: Option<TryOffOptions>,
    },
}

impl ProcessingRequest {
    /// The job type this request submits
    pub fn job_type(&self) -> JobType {
        match self {
            Self::TryOn { .. } => JobType::TryOn,
            Self::TryOff { .. } => JobType::TryOff,
        }
    }

    /// All image payloads carried by the request
    pub fn images(&self) -> Vec<&ImagePayload> {
        match self {
            Self::TryOn {
                model_image,
                garment_image,
                ..
            } => vec![model_image, garment_image],
            Self::TryOff { model_image, .. } => vec![model_image],
        }
    }
}
