use crate::error::{LabelMatchError, Result};
use crate::preprocess::PreprocessOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ocr_endpoint: Option<String>,
    pub ocr_key: Option<String>,
    pub directory_path: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub limit_size: bool,
    pub max_width: u32,
    pub max_height: u32,
    pub background_threshold: u8,
    pub padding: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr_endpoint: None,
            ocr_key: None,
            directory_path: None,
            poll_interval_ms: 800,
            limit_size: false,
            max_width: 1024,
            max_height: 768,
            background_threshold: 245,
            padding: 12,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// ファイルが無ければデフォルト値（ファイルは作らない）
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LabelMatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("label-match").join("config.json"))
    }

    pub fn get_ocr_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var("AZURE_CV_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.ocr_key.clone().ok_or(LabelMatchError::MissingOcrKey)
    }

    pub fn get_ocr_endpoint(&self) -> Result<String> {
        if let Ok(endpoint) = std::env::var("AZURE_CV_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                return Ok(endpoint);
            }
        }

        self.ocr_endpoint
            .clone()
            .ok_or_else(|| LabelMatchError::Config("OCRエンドポイントが設定されていません".into()))
    }

    /// ディレクトリファイル（引数指定を優先）
    pub fn resolve_directory(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        explicit
            .or_else(|| self.directory_path.clone())
            .ok_or_else(|| {
                LabelMatchError::Config(
                    "教員ディレクトリが指定されていません（--directory または config --set-directory）".into(),
                )
            })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn preprocess_options(&self) -> PreprocessOptions {
        PreprocessOptions {
            limit_size: self.limit_size,
            max_width: self.max_width,
            max_height: self.max_height,
            background_threshold: self.background_threshold,
            padding: self.padding,
        }
    }

    pub fn set_ocr_key(&mut self, key: String) -> Result<()> {
        self.ocr_key = Some(key);
        self.save()
    }

    pub fn set_ocr_endpoint(&mut self, endpoint: String) -> Result<()> {
        self.ocr_endpoint = Some(endpoint);
        self.save()
    }

    pub fn set_directory(&mut self, path: PathBuf) -> Result<()> {
        self.directory_path = Some(path);
        self.save()
    }
}
