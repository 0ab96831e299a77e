use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, data)?;
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let written = storage
            .write_file("previews/digest_preview.html", b"<html></html>")
            .await
            .unwrap();

        assert!(written.ends_with("digest_preview.html"));
        let data = fs::read(temp_dir.path().join("previews/digest_preview.html")).unwrap();
        assert_eq!(data, b"<html></html>");
    }

    #[tokio::test]
    async fn test_write_into_a_file_path_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("blocker"), b"").unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let err = storage
            .write_file("blocker/digest_preview.html", b"<html></html>")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::utils::error::DigestError::IoError(_)));
        assert_eq!(err.exit_code(), 3);
    }
}
