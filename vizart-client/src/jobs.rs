//! Job-related API endpoints
//!
//! Submission (multipart upload), status reads, result retrieval, and
//! cancellation against the Vizart backend.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::VizartClient;
use crate::error::{ClientError, Result};
use vizart_core::dto::job::{CancelResponse, JobSnapshot, ResultEnvelope, StatusEnvelope, SubmitResponse};
use vizart_core::dto::request::{ImagePayload, TryOffOptions, TryOnOptions};
use vizart_core::domain::job::JobStatus;

/// Upload cap enforced before transmit, matching the backend's limit
const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Image formats the backend accepts
const ALLOWED_EXTENSIONS: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
];

impl VizartClient {
    // =============================================================================
    // Submission
    // =============================================================================

    /// Submit a try-on job (put a garment on a model)
    ///
    /// # Arguments
    /// * `model_image` - Photo of the model
    /// * `garment_image` - Photo of the garment to fit
    /// * `options` - Optional processing options
    ///
    /// # Returns
    /// The backend-assigned job id
    pub async fn submit_try_on(
        &self,
        model_image: ImagePayload,
        garment_image: ImagePayload,
        options: Option<TryOnOptions>,
    ) -> Result<String> {
        validate_image("model_image", &model_image)?;
        validate_image("garment_image", &garment_image)?;

        let mut form = Form::new()
            .part("model_image", image_part(model_image)?)
            .part("garment_image", image_part(garment_image)?);

        if let Some(options) = options {
            form = form.text("options", encode_options(&options)?);
        }

        let url = format!("{}/api/v1/processing/try-on", self.base_url);
        let response = self.client.post(&url).multipart(form).send().await?;

        let submitted: SubmitResponse = self.handle_response(response).await?;
        debug!(
            "Submitted try-on job {} (estimated time: {})",
            submitted.job_id,
            submitted.estimated_time.as_deref().unwrap_or("unknown")
        );

        Ok(submitted.job_id)
    }

    /// Submit a try-off job (extract garments from a model photo)
    ///
    /// # Arguments
    /// * `model_image` - Photo of the model wearing the garments
    /// * `options` - Optional extraction options
    ///
    /// # Returns
    /// The backend-assigned job id
    pub async fn submit_try_off(
        &self,
        model_image: ImagePayload,
        options: Option<TryOffOptions>,
    ) -> Result<String> {
        validate_image("model_image", &model_image)?;

        let mut form = Form::new().part("model_image", image_part(model_image)?);

        if let Some(options) = options {
            form = form.text("options", encode_options(&options)?);
        }

        let url = format!("{}/api/v1/processing/try-off", self.base_url);
        let response = self.client.post(&url).multipart(form).send().await?;

        let submitted: SubmitResponse = self.handle_response(response).await?;
        debug!(
            "Submitted try-off job {} (estimated time: {})",
            submitted.job_id,
            submitted.estimated_time.as_deref().unwrap_or("unknown")
        );

        Ok(submitted.job_id)
    }

    // =============================================================================
    // Status and Results
    // =============================================================================

    /// Fetch the current snapshot of a job
    ///
    /// Idempotent read. When the backend reports the job completed, the
    /// result payload is fetched from the result endpoint and attached to
    /// the returned snapshot, so one call yields the full terminal view.
    pub async fn get_job_status(&self, job_id: &str) -> Result<JobSnapshot> {
        let url = format!("{}/api/v1/jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        let envelope: StatusEnvelope = self.handle_response(response).await?;
        let mut snapshot = envelope.job;

        if snapshot.status == JobStatus::Completed && snapshot.result.is_none() {
            snapshot.result = Some(self.get_job_result(job_id).await?);
        }

        Ok(snapshot)
    }

    /// Fetch the result payload of a completed job
    pub async fn get_job_result(
        &self,
        job_id: &str,
    ) -> Result<vizart_core::domain::job::ProcessingResult> {
        let url = format!("{}/api/v1/jobs/{}/result", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        let envelope: ResultEnvelope = self.handle_response(response).await?;
        Ok(envelope.result)
    }

    // =============================================================================
    // Cancellation
    // =============================================================================

    /// Request cancellation of a job
    ///
    /// Best-effort: a job the backend no longer considers cancellable
    /// (already terminal, or already cleaned up) is not an error for the
    /// caller.
    pub async fn cancel_job(&self, job_id: &str) -> Result<()> {
        let url = format!("{}/api/v1/jobs/{}", self.base_url, job_id);
        let response = self.client.delete(&url).send().await?;

        match self.handle_response::<CancelResponse>(response).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("Cancel for job {} was a no-op: {}", job_id, e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Validate an image payload before any network traffic
fn validate_image(field: &str, image: &ImagePayload) -> Result<()> {
    if image.bytes.is_empty() {
        return Err(ClientError::InvalidRequest(format!(
            "{} is empty",
            field
        )));
    }

    if image.bytes.len() > MAX_UPLOAD_SIZE {
        return Err(ClientError::InvalidRequest(format!(
            "{} exceeds the {} byte upload limit",
            field, MAX_UPLOAD_SIZE
        )));
    }

    if mime_for(image).is_none() {
        return Err(ClientError::InvalidRequest(format!(
            "{} has an unsupported format (expected jpeg, png, webp or gif): {}",
            field, image.file_name
        )));
    }

    Ok(())
}

/// Content type for an image payload, from its file extension
fn mime_for(image: &ImagePayload) -> Option<&'static str> {
    let extension = image.extension()?;
    ALLOWED_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

/// Build the multipart file part for an image
fn image_part(image: ImagePayload) -> Result<Part> {
    // validate_image ran first, so the extension is known good
    let mime = mime_for(&image).unwrap_or("application/octet-stream");
    let part = Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(mime)?;
    Ok(part)
}

/// Serialize an options object for the `options` form field
fn encode_options<T: serde::Serialize>(options: &T) -> Result<String> {
    serde_json::to_string(options)
        .map_err(|e| ClientError::InvalidRequest(format!("Unserializable options: {}", e)))
}
