use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("OCRキーが設定されていません。`label-match config --set-ocr-key YOUR_KEY` で設定してください")]
    MissingOcrKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像エンコードエラー: {0}")]
    ImageEncode(String),

    #[error("OCR呼び出しエラー: {0}")]
    Ocr(String),

    #[error("OCRが失敗しました: {0}")]
    OcrFailed(String),

    #[error("教員ディレクトリの取得に失敗: {0}")]
    Directory(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] label_match_common::Error),
}

impl From<image::ImageError> for LabelMatchError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => LabelMatchError::ImageEncode(e.to_string()),
            other => LabelMatchError::ImageLoad(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for LabelMatchError {
    fn from(err: reqwest::Error) -> Self {
        LabelMatchError::Ocr(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LabelMatchError>;
