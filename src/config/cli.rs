use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Report storage on the local filesystem, rooted at `report.output_dir`.
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
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    fn describe(&self, path: &str) -> String {
        Path::new(&self.base_path).join(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_file_truncates_previous_content() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("menus");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage
            .write_file("2024_05_02.txt", b"a much longer first report")
            .await
            .unwrap();
        storage.write_file("2024_05_02.txt", b"second").await.unwrap();

        let content = fs::read_to_string(base.join("2024_05_02.txt")).unwrap();
        assert_eq!(content, "second");
        assert!(storage.describe("2024_05_02.txt").ends_with("2024_05_02.txt"));
    }
}
