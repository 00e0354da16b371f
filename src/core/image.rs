//! Locally chosen images and draft previews.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Image shown when an entity has no image yet.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// An image file chosen on the local machine, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    /// Original file name.
    pub file_name: String,

    /// Lowercase extension used for the storage key.
    pub extension: String,

    /// MIME type sent with the upload.
    pub content_type: String,

    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl LocalImage {
    /// Wrap raw bytes, deriving extension and content type from the name.
    #[must_use]
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        let extension = Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "bin".to_string());
        let content_type = content_type_for(&extension);
        Self {
            file_name: file_name.to_string(),
            extension,
            content_type,
            bytes,
        }
    }

    /// Read an image from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().to_string());
        Ok(Self::new(&file_name, bytes))
    }

    /// Decode a base64 `data:` URI such as `data:image/png;base64,iVBOR…`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is not a base64 data URI.
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let invalid = || Error::InvalidState("not a base64 data URI".to_string());

        let rest = uri.strip_prefix("data:").ok_or_else(invalid)?;
        let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
        let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;
        let subtype = mime.split_once('/').map_or(mime, |(_, s)| s);
        let extension = match subtype {
            "svg+xml" => "svg".to_string(),
            other => other.to_lowercase(),
        };
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::InvalidState(format!("invalid data URI payload: {e}")))?;

        Ok(Self {
            file_name: format!("image.{extension}"),
            extension,
            content_type: mime.to_string(),
            bytes,
        })
    }

    /// Encode as a base64 `data:` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }

    /// A fresh, collision-resistant storage key: `<uuid>.<ext>`.
    ///
    /// Upserts are disabled, so every upload needs a new key.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{}.{}", Uuid::new_v4(), self.extension)
    }
}

/// MIME type for an image extension.
fn content_type_for(extension: &str) -> String {
    match extension {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "svg" => "image/svg+xml".to_string(),
        "bin" => "application/octet-stream".to_string(),
        other => format!("image/{other}"),
    }
}

/// How a locally chosen file is previewed before upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStyle {
    /// Inline the file as a `data:` URI.
    DataUri,
    /// Reference the file through an opaque object URL.
    ObjectUrl,
}

impl PreviewStyle {
    /// Build the preview string for `image`.
    #[must_use]
    pub fn preview(self, image: &LocalImage) -> String {
        match self {
            Self::DataUri => image.to_data_uri(),
            Self::ObjectUrl => format!("blob:{}", Uuid::new_v4()),
        }
    }
}

/// What the dialog shows in its image slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePreview {
    /// No image yet.
    Placeholder,

    /// Existing image, by public URL.
    Remote(String),

    /// Newly chosen local file awaiting upload at save time.
    Local {
        /// Preview reference (data URI or object URL).
        preview: String,
        /// The file itself.
        image: LocalImage,
    },
}

impl ImagePreview {
    /// Preview for an entity's resolved image URL.
    #[must_use]
    pub fn for_url(url: &str) -> Self {
        if url.is_empty() {
            Self::Placeholder
        } else {
            Self::Remote(url.to_string())
        }
    }

    /// Preview for a freshly chosen file.
    #[must_use]
    pub fn local(image: LocalImage, style: PreviewStyle) -> Self {
        Self::Local {
            preview: style.preview(&image),
            image,
        }
    }

    /// The `src` to render.
    #[must_use]
    pub fn src(&self) -> &str {
        match self {
            Self::Placeholder => PLACEHOLDER_IMAGE,
            Self::Remote(url) => url,
            Self::Local { preview, .. } => preview,
        }
    }

    /// The file that still has to be uploaded, if any.
    #[must_use]
    pub fn pending_upload(&self) -> Option<&LocalImage> {
        match self {
            Self::Local { image, .. } => Some(image),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_extension_and_content_type() {
        let image = LocalImage::new("Kyoto.JPG", vec![1, 2, 3]);
        assert_eq!(image.extension, "jpg");
        assert_eq!(image.content_type, "image/jpeg");

        let png = LocalImage::new("map.png", vec![]);
        assert_eq!(png.content_type, "image/png");
    }

    #[test]
    fn new_without_extension_is_binary() {
        let image = LocalImage::new("README", vec![]);
        assert_eq!(image.extension, "bin");
        assert_eq!(image.content_type, "application/octet-stream");
    }

    #[test]
    fn data_uri_decodes_mime_and_payload() {
        let image = LocalImage::from_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes, b"hello");
        assert_eq!(image.to_data_uri(), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn data_uri_svg_extension() {
        let image = LocalImage::from_data_uri("data:image/svg+xml;base64,PHN2Zy8+").unwrap();
        assert_eq!(image.extension, "svg");
    }

    #[test]
    fn data_uri_rejects_other_inputs() {
        assert!(LocalImage::from_data_uri("https://example.com/a.png").is_err());
        assert!(LocalImage::from_data_uri("data:image/png,plain").is_err());
        assert!(LocalImage::from_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn storage_keys_are_unique_and_keep_extension() {
        let image = LocalImage::new("beach.webp", vec![0]);
        let a = image.storage_key();
        let b = image.storage_key();
        assert_ne!(a, b);
        assert!(a.ends_with(".webp"));
    }

    #[test]
    fn preview_styles() {
        let image = LocalImage::new("a.png", b"hello".to_vec());
        assert!(PreviewStyle::DataUri.preview(&image).starts_with("data:image/png;base64,"));
        assert!(PreviewStyle::ObjectUrl.preview(&image).starts_with("blob:"));
    }

    #[test]
    fn preview_src_and_pending() {
        assert_eq!(ImagePreview::for_url("").src(), PLACEHOLDER_IMAGE);
        assert_eq!(ImagePreview::for_url("https://x/a.png").src(), "https://x/a.png");
        assert!(ImagePreview::for_url("https://x/a.png").pending_upload().is_none());

        let local = ImagePreview::local(LocalImage::new("a.png", vec![1]), PreviewStyle::DataUri);
        assert!(local.src().starts_with("data:"));
        assert_eq!(local.pending_upload().unwrap().file_name, "a.png");
    }
}
