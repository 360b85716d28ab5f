//! 教員ディレクトリの取得
//!
//! 照合1回につき1度だけスナップショットを取得する。

use crate::error::{LabelMatchError, Result};
use async_trait::async_trait;
use label_match_common::{Directory, DirectoryEntry};
use std::path::PathBuf;

/// 教員ディレクトリの提供元
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    async fn fetch(&self) -> Result<Directory>;
}

/// メモリ上の固定ディレクトリ
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    directory: Directory,
}

impl StaticDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Result<Self> {
        Ok(Self {
            directory: Directory::new(entries)?,
        })
    }
}

impl From<Directory> for StaticDirectory {
    fn from(directory: Directory) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl DirectoryProvider for StaticDirectory {
    async fn fetch(&self) -> Result<Directory> {
        Ok(self.directory.clone())
    }
}

/// JSON/CSVファイル（取得のたびに読み直す）
#[derive(Debug, Clone)]
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DirectoryProvider for FileDirectory {
    async fn fetch(&self) -> Result<Directory> {
        if !self.path.exists() {
            return Err(LabelMatchError::FileNotFound(self.path.display().to_string()));
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let directory = Directory::from_str_with_path(&content, &self.path)
            .map_err(|e| LabelMatchError::Directory(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!(path = %self.path.display(), entries = directory.len(), "教員ディレクトリを読み込み");
        Ok(directory)
    }
}
