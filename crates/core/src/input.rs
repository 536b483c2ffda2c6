//! Upload validation applied before any job is created.
//!
//! Rejections here are synchronous: the caller gets an immediate error
//! and no job id is ever allocated.

use std::path::Path;

use validator::Validate;

use crate::error::CoreError;

/// File extensions the transcription provider accepts.
pub const ALLOWED_AUDIO_EXTENSIONS: &[&str] =
    &["mp3", "mp4", "mpeg", "mpga", "m4a", "wav", "webm"];

/// Default cap on uploaded audio size (the hosted transcription API limit).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// Optional free-text fields accompanying an upload.
#[derive(Debug, Default, Validate)]
pub struct UploadHints {
    /// What the meeting is about; steers the transcription model.
    #[validate(length(max = 2000, message = "meeting_summary must be at most 2000 characters"))]
    pub meeting_summary: Option<String>,
    /// Terms and names likely to come up in the recording.
    #[validate(length(max = 2000, message = "key_terms must be at most 2000 characters"))]
    pub key_terms: Option<String>,
    /// Provider model override for the transcription call.
    #[validate(length(min = 1, max = 128, message = "model must be between 1 and 128 characters"))]
    pub model: Option<String>,
}

/// Extract and check the audio file extension (lowercased, without dot).
pub fn audio_extension(filename: &str) -> Result<String, CoreError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if ALLOWED_AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported file format '.{ext}'. Supported formats: {}",
            ALLOWED_AUDIO_EXTENSIONS
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// Validate a complete upload. Returns the normalized extension on success.
pub fn validate_upload(
    filename: &str,
    size_bytes: u64,
    max_bytes: u64,
    hints: &UploadHints,
) -> Result<String, CoreError> {
    let ext = audio_extension(filename)?;

    if size_bytes == 0 {
        return Err(CoreError::Validation(
            "Uploaded file is empty".to_string(),
        ));
    }
    if size_bytes > max_bytes {
        return Err(CoreError::Validation(format!(
            "Uploaded file is {size_bytes} bytes; the maximum is {max_bytes} bytes"
        )));
    }

    hints
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))?;

    Ok(ext)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- extensions -----------------------------------------------------------

    #[test]
    fn known_extensions_are_accepted() {
        for ext in ALLOWED_AUDIO_EXTENSIONS {
            let filename = format!("meeting.{ext}");
            assert_eq!(audio_extension(&filename).unwrap(), *ext);
        }
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(audio_extension("Meeting.MP3").unwrap(), "mp3");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = audio_extension("notes.txt").unwrap_err();
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn missing_extension_is_rejected() {
        assert!(audio_extension("recording").is_err());
    }

    // -- full upload validation -----------------------------------------------

    #[test]
    fn valid_upload_passes() {
        let hints = UploadHints::default();
        let ext = validate_upload("standup.wav", 1024, DEFAULT_MAX_UPLOAD_BYTES, &hints).unwrap();
        assert_eq!(ext, "wav");
    }

    #[test]
    fn empty_upload_is_rejected() {
        let hints = UploadHints::default();
        assert!(validate_upload("standup.wav", 0, DEFAULT_MAX_UPLOAD_BYTES, &hints).is_err());
    }

    #[test]
    fn oversized_upload_is_rejected() {
        let hints = UploadHints::default();
        let err = validate_upload("standup.wav", 200, 100, &hints).unwrap_err();
        assert!(err.to_string().contains("maximum"));
    }

    #[test]
    fn oversized_hint_is_rejected() {
        let hints = UploadHints {
            meeting_summary: Some("a".repeat(2001)),
            ..Default::default()
        };
        assert!(validate_upload("standup.wav", 1024, DEFAULT_MAX_UPLOAD_BYTES, &hints).is_err());
    }

    #[test]
    fn empty_model_override_is_rejected() {
        let hints = UploadHints {
            model: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_upload("standup.wav", 1024, DEFAULT_MAX_UPLOAD_BYTES, &hints).is_err());
    }
}
