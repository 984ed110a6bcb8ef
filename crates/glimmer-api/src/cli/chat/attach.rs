//! Image attachment helpers for the chat loop.
//!
//! `/image <spec>` accepts either a URL (kept as a reference and resolved
//! at dispatch time) or a local file (read and inlined immediately).
//! Generated images come back inline and are written into the data
//! directory so the user has something to open.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::warn;
use uuid::Uuid;

use glimmer_types::turn::ImageRef;

/// Turn a user-supplied spec into an image reference.
pub async fn load_attachment(spec: &str) -> Result<ImageRef> {
    if spec.starts_with("http://") || spec.starts_with("https://") {
        return Ok(ImageRef::Url(spec.to_string()));
    }

    let path = Path::new(spec);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("could not read '{spec}'"))?;
    let mime_type = mime_for_path(path).to_string();

    Ok(ImageRef::Inline {
        mime_type,
        data: BASE64.encode(&bytes),
    })
}

/// Write an inline image into `<data_dir>/images/` and return its path.
///
/// URL references and undecodable payloads yield None; failures are logged
/// and never interrupt the chat.
pub async fn save_inline_image(data_dir: &Path, image: &ImageRef) -> Option<PathBuf> {
    let ImageRef::Inline { mime_type, data } = image else {
        return None;
    };

    let bytes = match BASE64.decode(data) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "could not decode inline image payload");
            return None;
        }
    };

    let dir = data_dir.join("images");
    if let Err(err) = tokio::fs::create_dir_all(&dir).await {
        warn!(error = %err, "could not create image directory");
        return None;
    }

    let path = dir.join(format!(
        "img-{}.{}",
        Uuid::now_v7(),
        extension_for_mime(mime_type)
    ));
    match tokio::fs::write(&path, bytes).await {
        Ok(()) => Some(path),
        Err(err) => {
            warn!(error = %err, "could not write image file");
            None
        }
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "png",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_url_spec_stays_a_reference() {
        let image = load_attachment("https://example.com/cat.png").await.unwrap();
        assert_eq!(image, ImageRef::Url("https://example.com/cat.png".to_string()));
    }

    #[tokio::test]
    async fn test_file_spec_is_inlined() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let image = load_attachment(path.to_str().unwrap()).await.unwrap();
        let ImageRef::Inline { mime_type, data } = image else {
            panic!("expected inline image");
        };
        assert_eq!(mime_type, "image/jpeg");
        assert_eq!(data, BASE64.encode(b"hello"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        assert!(load_attachment("/no/such/file.png").await.is_err());
    }

    #[tokio::test]
    async fn test_save_inline_image_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let image = ImageRef::Inline {
            mime_type: "image/png".to_string(),
            data: BASE64.encode(b"pixels"),
        };

        let path = save_inline_image(tmp.path(), &image).await.unwrap();
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn test_save_skips_url_refs() {
        let tmp = TempDir::new().unwrap();
        let image = ImageRef::Url("https://example.com/cat.png".to_string());
        assert!(save_inline_image(tmp.path(), &image).await.is_none());
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_for_path(Path::new("a")), "image/png");
    }
}
