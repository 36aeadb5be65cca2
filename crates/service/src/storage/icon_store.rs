use std::{path::PathBuf, sync::Arc};

use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Image extensions accepted for service icons.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "svg"];

/// Disk-backed blob store for uploaded service icons.
///
/// Files are written under `root` with a unique `<uuid>_<name>` object
/// name and addressed through `public_prefix` (the router serves the
/// directory at that prefix).
#[derive(Clone)]
pub struct IconStore {
    root: PathBuf,
    public_prefix: String,
}

impl IconStore {
    /// Initialize the store, creating the directory if missing.
    pub async fn new<P: Into<PathBuf>>(root: P, public_prefix: &str) -> Result<Arc<Self>, ServiceError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| ServiceError::Storage(format!("cannot create {}: {e}", root.display())))?;
        Ok(Arc::new(Self {
            root,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }))
    }

    pub fn allowed_file(filename: &str) -> bool {
        filename
            .rsplit_once('.')
            .map(|(stem, ext)| !stem.is_empty() && ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Store an uploaded icon and return its public URL.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        if !Self::allowed_file(original_name) {
            return Err(ServiceError::Validation(format!(
                "file type not allowed (expected one of {})",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        let object_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(original_name));
        let path = self.root.join(&object_name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| ServiceError::Storage(format!("cannot write {}: {e}", path.display())))?;

        let url = format!("{}/{}", self.public_prefix, object_name);
        info!(%url, size = bytes.len(), "icon_stored");
        Ok(url)
    }
}

/// Reduce a client-supplied filename to a safe object-name component:
/// strip any path, keep `[A-Za-z0-9._-]`, map the rest to `_`.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_matches('.').to_string();
    if trimmed.is_empty() { "icon".to_string() } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("icon_store_{}", Uuid::new_v4()))
    }

    #[test]
    fn extension_allow_list() {
        assert!(IconStore::allowed_file("logo.png"));
        assert!(IconStore::allowed_file("logo.SVG"));
        assert!(!IconStore::allowed_file("logo.exe"));
        assert!(!IconStore::allowed_file("noextension"));
        assert!(!IconStore::allowed_file(".png"));
    }

    #[test]
    fn sanitize_strips_paths_and_odd_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd.png"), "passwd.png");
        assert_eq!(sanitize_filename("my logo (1).png"), "my_logo__1_.png");
        assert_eq!(sanitize_filename("C:\\uploads\\ünïcode.svg"), "_n_code.svg");
        assert_eq!(sanitize_filename("..."), "icon");
    }

    #[tokio::test]
    async fn save_writes_file_and_returns_public_url() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = IconStore::new(&root, "/icons/").await?;

        let url = store.save("logo.png", b"\x89PNG").await?;
        assert!(url.starts_with("/icons/"));
        assert!(url.ends_with("_logo.png"));

        let object_name = url.rsplit('/').next().expect("object name");
        let on_disk = tokio::fs::read(root.join(object_name)).await?;
        assert_eq!(on_disk, b"\x89PNG");

        // unique prefix keeps repeated uploads of the same name apart
        let url2 = store.save("logo.png", b"other").await?;
        assert_ne!(url, url2);

        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn save_rejects_disallowed_extension() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = IconStore::new(&root, "/icons").await?;
        let err = store.save("payload.html", b"<html>").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
