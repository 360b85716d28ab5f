use super::{OcrEngine, OcrStatus};
use crate::config::Config;
use crate::error::{LabelMatchError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const READ_API_PATH: &str = "vision/v3.2/read";
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OPERATION_LOCATION: &str = "Operation-Location";

/// Azure Computer Vision Read API クライアント
pub struct AzureReadClient {
    http: reqwest::Client,
    endpoint: String,
    key: String,
}

impl AzureReadClient {
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    /// 設定（環境変数を優先）から作成
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config.get_ocr_key()?;
        let endpoint = config.get_ocr_endpoint()?;
        Ok(Self::new(endpoint, key))
    }

    fn analyze_url(&self) -> String {
        format!("{}/{}/analyze", self.endpoint, READ_API_PATH)
    }

    fn result_url(&self, operation_id: &str) -> String {
        format!("{}/{}/analyzeResults/{}", self.endpoint, READ_API_PATH, operation_id)
    }
}

#[async_trait]
impl OcrEngine for AzureReadClient {
    async fn submit(&self, image: Vec<u8>) -> Result<String> {
        let response = self
            .http
            .post(self.analyze_url())
            .header(KEY_HEADER, &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LabelMatchError::Ocr(format!("HTTP {}: {}", status, body)));
        }

        let location = response
            .headers()
            .get(OPERATION_LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| LabelMatchError::Ocr("Operation-Location ヘッダーがありません".into()))?;

        operation_id_from_location(location)
            .ok_or_else(|| LabelMatchError::Ocr(format!("操作IDを取得できません: {}", location)))
    }

    async fn poll(&self, operation_id: &str) -> Result<OcrStatus> {
        let response = self
            .http
            .get(self.result_url(operation_id))
            .header(KEY_HEADER, &self.key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LabelMatchError::Ocr(format!("HTTP {}: {}", status, body)));
        }

        parse_read_result(&body)
    }
}

/// `Operation-Location` の末尾セグメントを操作IDとして取り出す
pub fn operation_id_from_location(location: &str) -> Option<String> {
    let path = location.split('?').next().unwrap_or(location);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadOperationResult {
    status: ReadStatus,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ReadStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResult {
    #[serde(default)]
    read_results: Vec<ReadPage>,
}

#[derive(Debug, Deserialize)]
struct ReadPage {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
struct ReadLine {
    text: String,
}

/// Read API の結果JSONを解釈する（行はページ順・行順）
pub fn parse_read_result(body: &str) -> Result<OcrStatus> {
    let result: ReadOperationResult = serde_json::from_str(body)?;

    Ok(match result.status {
        ReadStatus::NotStarted | ReadStatus::Running => OcrStatus::Running,
        ReadStatus::Failed => OcrStatus::Failed("画像を処理できませんでした".into()),
        ReadStatus::Succeeded => {
            let lines = result
                .analyze_result
                .map(|r| r.read_results)
                .unwrap_or_default()
                .into_iter()
                .flat_map(|page| page.lines)
                .map(|line| line.text)
                .collect();
            OcrStatus::Succeeded(lines)
        }
    })
}
