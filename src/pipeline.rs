//! ラベル写真1枚の処理（前処理 → OCR → 照合）

use crate::directory::DirectoryProvider;
use crate::error::{LabelMatchError, Result};
use crate::matcher::LecturerMatcher;
use crate::ocr::{recognize, OcrEngine};
use label_match_common::LabelText;
use crate::preprocess::{preprocess, PreprocessOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 1枚分の処理結果（バッチレポートの1要素）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelReport {
    pub file_name: String,
    pub text: String,
    pub lines: Vec<String>,
    pub email: Option<String>,
    /// 宛先教員の表示名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
}

/// 処理済み画像と結果
#[derive(Debug, Clone)]
pub struct ProcessedLabel {
    pub processed_image: Vec<u8>,
    pub report: LabelReport,
}

pub struct LabelPipeline<E, P> {
    engine: E,
    matcher: LecturerMatcher<P>,
    options: PreprocessOptions,
    poll_interval: Duration,
}

impl<E: OcrEngine, P: DirectoryProvider> LabelPipeline<E, P> {
    pub fn new(engine: E, provider: P, options: PreprocessOptions, poll_interval: Duration) -> Self {
        Self {
            engine,
            matcher: LecturerMatcher::new(provider),
            options,
            poll_interval,
        }
    }

    pub async fn process_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<ProcessedLabel> {
        let processed_image = preprocess(bytes, &self.options)?;
        let recognized = recognize(&self.engine, processed_image.clone(), self.poll_interval).await?;
        let input = LabelText::from(recognized.clone());
        let (email, recipient_name) = match self.matcher.find_recipient(&input).await? {
            Some(recipient) => (Some(recipient.email), recipient.name),
            None => (None, None),
        };

        tracing::debug!(file = file_name, email = ?email, "ラベル処理完了");
        Ok(ProcessedLabel {
            processed_image,
            report: LabelReport {
                file_name: file_name.to_string(),
                text: recognized.text,
                lines: recognized.lines,
                email,
                recipient_name,
            },
        })
    }

    pub async fn process_file(&self, path: &Path, file_name: &str) -> Result<ProcessedLabel> {
        if !path.is_file() {
            return Err(LabelMatchError::FileNotFound(path.display().to_string()));
        }
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(file_name, &bytes).await
    }
}
