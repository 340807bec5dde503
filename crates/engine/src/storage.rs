//! Blob storage for attachment files: one flat directory, one file per
//! attachment, named by a random id.

use std::{
    io,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use uuid::Uuid;

#[allow(clippy::expect_used)]
static FILE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{32}\.[a-z0-9]{1,10}$").expect("file name pattern"));

#[derive(Clone, Debug)]
pub struct AttachmentStore {
    root: PathBuf,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names produced by [`Self::generate_name`]; nothing else is ever read
    /// from or written to disk.
    pub fn is_valid_name(name: &str) -> bool {
        FILE_NAME_PATTERN.is_match(name)
    }

    /// 32 hex chars plus an extension taken from `original_name` when it is
    /// safe, else derived from the image MIME type.
    pub fn generate_name(mime_type: &str, original_name: Option<&str>) -> String {
        format!(
            "{}.{}",
            Uuid::new_v4().simple(),
            image_extension(mime_type, original_name)
        )
    }

    fn path_of(&self, name: &str) -> io::Result<PathBuf> {
        if !Self::is_valid_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid attachment file name: {name}"),
            ));
        }
        Ok(self.root.join(name))
    }

    pub async fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path_of(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(path, bytes).await
    }

    pub async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path_of(name)?).await
    }

    /// Best-effort delete. A blob that cannot be removed is only logged.
    pub async fn remove(&self, name: &str) {
        let result = match self.path_of(name) {
            Ok(path) => tokio::fs::remove_file(path).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!("failed to remove attachment blob {name}: {err}"),
        }
    }

    pub async fn remove_all<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.remove(name.as_ref()).await;
        }
    }
}

fn image_extension(mime_type: &str, original_name: Option<&str>) -> String {
    let from_name = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .filter(|ext| {
            (1..=10).contains(&ext.len())
                && ext
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
    if let Some(ext) = from_name {
        return ext;
    }

    match mime_type.to_lowercase().as_str() {
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "png",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_valid() {
        let name = AttachmentStore::generate_name("image/jpeg", None);
        assert!(name.ends_with(".jpg"));
        assert!(AttachmentStore::is_valid_name(&name));
    }

    #[test]
    fn extension_prefers_original_name() {
        assert_eq!(image_extension("image/png", Some("receipt.JPEG")), "jpeg");
        assert_eq!(image_extension("image/webp", Some("receipt")), "webp");
        assert_eq!(image_extension("image/gif", Some("a.b@d")), "gif");
        assert_eq!(image_extension("image/heic", None), "png");
    }

    #[test]
    fn traversal_names_are_rejected() {
        assert!(!AttachmentStore::is_valid_name("../etc/passwd"));
        assert!(!AttachmentStore::is_valid_name(
            "0123456789abcdef0123456789ABCDEF.png"
        ));
        assert!(!AttachmentStore::is_valid_name(
            "0123456789abcdef0123456789abcdef"
        ));
        assert!(AttachmentStore::is_valid_name(
            "0123456789abcdef0123456789abcdef.png"
        ));
    }

    #[tokio::test]
    async fn write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().join("blobs"));
        let name = AttachmentStore::generate_name("image/png", None);

        store.write(&name, b"png-bytes").await.unwrap();
        assert_eq!(store.read(&name).await.unwrap(), b"png-bytes");

        store.remove(&name).await;
        assert!(store.read(&name).await.is_err());
        // removing twice is fine
        store.remove(&name).await;
    }
}
