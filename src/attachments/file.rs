use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{Fragment, InputSource};
use crate::constants::IMAGE_EXTENSIONS;
use crate::utils::VedaError;

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

async fn require_file(path: &Path) -> Result<std::fs::Metadata, VedaError> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        VedaError::AttachmentError(format!("cannot read {}: {}", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(VedaError::AttachmentError(format!(
            "{} is not a file",
            path.display()
        )));
    }
    Ok(metadata)
}

/// A document to ask the model about
///
/// Only name and size are read; the contents are not sent.
pub struct FileAttachment {
    path: PathBuf,
}

impl FileAttachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InputSource for FileAttachment {
    fn label(&self) -> &str {
        "file"
    }

    async fn produce(&self) -> Result<Fragment, VedaError> {
        let metadata = require_file(&self.path).await?;
        let name = display_name(&self.path);
        let size_kb = metadata.len() as f64 / 1024.0;

        Ok(Fragment {
            text: format!("Analyze this file: {} ({:.2} KB)", name, size_kb),
            notification: format!("File \"{}\" ready for analysis", name),
        })
    }
}

/// An image to ask the model about
pub struct ImageAttachment {
    path: PathBuf,
}

impl ImageAttachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_image(&self) -> bool {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl InputSource for ImageAttachment {
    fn label(&self) -> &str {
        "image"
    }

    async fn produce(&self) -> Result<Fragment, VedaError> {
        if !self.is_image() {
            return Err(VedaError::AttachmentError(format!(
                "{} is not a supported image ({})",
                self.path.display(),
                IMAGE_EXTENSIONS.join(", ")
            )));
        }
        require_file(&self.path).await?;
        let name = display_name(&self.path);

        Ok(Fragment {
            text: format!("Analyze this image: {}", name),
            notification: format!("Image \"{}\" uploaded", name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_fragment_reports_size_in_kb() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();

        let fragment = FileAttachment::new(&path).produce().await.unwrap();

        assert_eq!(fragment.text, "Analyze this file: notes.txt (2.00 KB)");
        assert_eq!(fragment.notification, "File \"notes.txt\" ready for analysis");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = FileAttachment::new(dir.path().join("nope.pdf")).produce().await;
        assert!(matches!(result, Err(VedaError::AttachmentError(_))));

        let result = FileAttachment::new(dir.path()).produce().await;
        assert!(matches!(result, Err(VedaError::AttachmentError(_))));
    }

    #[tokio::test]
    async fn test_image_fragment_checks_extension() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("Cat.PNG");
        std::fs::write(&image, b"not really a png").unwrap();
        let text = dir.path().join("cat.txt");
        std::fs::write(&text, b"meow").unwrap();

        let fragment = ImageAttachment::new(&image).produce().await.unwrap();
        assert_eq!(fragment.text, "Analyze this image: Cat.PNG");

        let result = ImageAttachment::new(&text).produce().await;
        assert!(matches!(result, Err(VedaError::AttachmentError(_))));
    }
}
