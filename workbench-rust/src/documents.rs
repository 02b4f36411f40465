use crate::{WorkbenchError, WorkbenchResult};
use risk_sdk::FilePayload;
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const EML_MIME_TYPE: &str = "message/rfc822";

/// 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// The MIME type the service expects for a file name, judged by extension.
#[must_use]
pub fn mime_type_for(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?;
    match extension.to_ascii_lowercase().as_str() {
        "pdf" => Some(PDF_MIME_TYPE),
        "eml" => Some(EML_MIME_TYPE),
        _ => None,
    }
}

/// Read a PDF or EML file from disk into an upload payload.
pub async fn read_document(path: impl AsRef<Path>) -> WorkbenchResult<FilePayload> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            WorkbenchError::InvalidDocument(format!("Not a file path: {}", path.display()))
        })?;
    let mime_type = mime_type_for(file_name).ok_or_else(|| {
        WorkbenchError::InvalidDocument(format!(
            "Unsupported file type: {file_name}. Please select a PDF or EML file"
        ))
    })?;

    let data = tokio::fs::read(path).await.map_err(|error| {
        WorkbenchError::InvalidDocument(format!("Failed to read {}: {error}", path.display()))
    })?;

    Ok(FilePayload::new(file_name, mime_type, data))
}

/// Reject payloads the service would refuse before anything is sent.
pub(crate) fn validate_document(
    file: &FilePayload,
    allowed_types: &[String],
    max_bytes: usize,
) -> WorkbenchResult<()> {
    if !allowed_types.iter().any(|allowed| *allowed == file.mime_type) {
        return Err(WorkbenchError::InvalidDocument(format!(
            "Invalid file type: {}. Please select a PDF or EML file",
            file.mime_type
        )));
    }
    if file.len() > max_bytes {
        return Err(WorkbenchError::InvalidDocument(format!(
            "File too large: {} exceeds {}",
            format_bytes(file.len()),
            format_bytes(max_bytes)
        )));
    }
    Ok(())
}

/// Human-readable size, two decimals at most: `1.5 KB`, `10 MB`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
