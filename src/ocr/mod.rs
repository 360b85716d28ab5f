//! OCR連携
//!
//! OCRサービスは「画像を投入 → 完了までポーリング」の非同期操作として扱う。

mod azure;

pub use azure::{operation_id_from_location, parse_read_result, AzureReadClient};

use crate::error::{LabelMatchError, Result};
use async_trait::async_trait;
use label_match_common::RecognizedText;
use std::time::Duration;

/// OCR操作の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrStatus {
    Running,
    Succeeded(Vec<String>),
    Failed(String),
}

/// OCRエンジン
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// 画像を投入して操作IDを返す
    async fn submit(&self, image: Vec<u8>) -> Result<String>;

    /// 操作の状態を取得
    async fn poll(&self, operation_id: &str) -> Result<OcrStatus>;
}

/// 画像を認識し、完了するまで `poll_interval` ごとにポーリングする
pub async fn recognize<E>(engine: &E, image: Vec<u8>, poll_interval: Duration) -> Result<RecognizedText>
where
    E: OcrEngine + ?Sized,
{
    let operation_id = engine.submit(image).await?;
    tracing::info!(operation_id = %operation_id, "OCR操作を開始");

    loop {
        tokio::time::sleep(poll_interval).await;
        match engine.poll(&operation_id).await? {
            OcrStatus::Running => continue,
            OcrStatus::Succeeded(lines) => {
                tracing::info!(operation_id = %operation_id, lines = lines.len(), "OCR完了");
                return Ok(RecognizedText::from_lines(lines));
            }
            OcrStatus::Failed(reason) => {
                tracing::info!(operation_id = %operation_id, reason = %reason, "OCR失敗");
                return Err(LabelMatchError::OcrFailed(reason));
            }
        }
    }
}
