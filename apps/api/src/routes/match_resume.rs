//! POST /match_resume: resume vs job description evaluation.
//!
//! Validation order (first failure wins):
//! 1. job description present and non-blank
//! 2. resume part present
//! 3. resume declared as PDF
//! 4. PDF parses
//! 5. extracted text non-blank
//!
//! Only after all five does the model get called.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::{evaluate_resume, normalizer::EvaluationResult};
use crate::extractor::{extract_blocking, ExtractError};
use crate::state::AppState;

pub const ACCEPTED_PDF_TYPES: [&str; 2] = ["application/pdf", "application/x-pdf"];

const JOB_DESCRIPTION_REQUIRED: &str = "Job description is required";
const RESUME_REQUIRED: &str = "Resume file is required";
const ONLY_PDF_SUPPORTED: &str = "Only PDF files are supported";
const UNREADABLE_PDF: &str = "Could not read PDF file. Please ensure the file is a valid PDF.";
const NO_EXTRACTABLE_TEXT: &str =
    "Could not extract text from PDF. Please ensure the PDF contains readable text.";

/// The uploaded resume part, held only until its text is extracted.
#[derive(Debug)]
pub struct UploadedDocument {
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Default)]
struct MatchForm {
    resume: Option<UploadedDocument>,
    job_description: Option<String>,
    /// The body hit the upload limit; parts after that point were never read.
    oversized: bool,
}

pub async fn handle_match_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EvaluationResult>, AppError> {
    let multipart = multipart.map_err(|e| {
        AppError::Validation(format!("Invalid multipart form data: {}", e.body_text()))
    })?;
    let form = read_form(multipart).await?;

    // A job description that was read and is blank wins over an oversized upload.
    // One that was never reached because of the limit cannot be judged.
    let job_description_blank = form
        .job_description
        .as_deref()
        .map_or(!form.oversized, |jd| jd.trim().is_empty());
    if job_description_blank {
        return Err(AppError::Validation(JOB_DESCRIPTION_REQUIRED.to_string()));
    }
    if form.oversized {
        return Err(AppError::PayloadTooLarge);
    }
    let job_description = form.job_description.unwrap_or_default();

    let resume = form
        .resume
        .ok_or_else(|| AppError::Validation(RESUME_REQUIRED.to_string()))?;

    if !is_pdf_content_type(resume.content_type.as_deref()) {
        return Err(AppError::Validation(ONLY_PDF_SUPPORTED.to_string()));
    }

    info!("Extracting text from {} byte resume", resume.data.len());

    let resume_text = match extract_blocking(state.extractor.clone(), resume.data).await {
        Ok(text) => text,
        Err(ExtractError::InvalidPdf(detail)) => {
            tracing::warn!("Unreadable PDF upload: {detail}");
            return Err(AppError::Validation(UNREADABLE_PDF.to_string()));
        }
        Err(e) => return Err(AppError::Internal(e.into())),
    };

    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(NO_EXTRACTABLE_TEXT.to_string()));
    }

    let result = evaluate_resume(state.llm.as_ref(), &resume_text, &job_description).await?;

    Ok(Json(result))
}

/// Collects the `resume` and `job_description` parts; anything else is drained.
///
/// Hitting the upload limit stops reading and sets `oversized` instead of
/// failing, so the caller can still validate what was read before it.
async fn read_form(mut multipart: Multipart) -> Result<MatchForm, AppError> {
    let mut form = MatchForm::default();

    match read_fields(&mut multipart, &mut form).await {
        Ok(()) => Ok(form),
        Err(AppError::PayloadTooLarge) => {
            form.oversized = true;
            Ok(form)
        }
        Err(e) => Err(e),
    }
}

async fn read_fields(multipart: &mut Multipart, form: &mut MatchForm) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                form.resume = Some(UploadedDocument { content_type, data });
            }
            "job_description" => {
                form.job_description = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {
                field.bytes().await.map_err(multipart_error)?;
            }
        }
    }

    Ok(())
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Invalid multipart form data: {}", e.body_text()))
    }
}

/// Matches the declared MIME type against `ACCEPTED_PDF_TYPES`,
/// ignoring case and any `;` parameters.
fn is_pdf_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
        .is_some_and(|essence| ACCEPTED_PDF_TYPES.contains(&essence.as_str()))
}
