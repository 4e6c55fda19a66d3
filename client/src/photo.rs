use std::path::Path;

use reqwest::blocking::multipart::Part;

use crate::Error;

pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Reads the photo into a `pet_photo` multipart part. Content is not
/// inspected; the service decides whether it is an image.
pub(crate) fn photo_part(path: &Path) -> Result<Part, Error> {
    let data = std::fs::read(path).map_err(|source| {
        Error::Photo {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pet_photo".to_string());

    tracing::trace!(file = %path.display(), bytes = data.len(), "attaching photo");

    Ok(Part::bytes(data)
        .file_name(file_name)
        .mime_str(mime_for(path))?)
}
