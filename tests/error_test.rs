//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use label_match::directory::{DirectoryProvider, FileDirectory};
use label_match::error::LabelMatchError;
use label_match::preprocess::{preprocess, PreprocessOptions};
use label_match::scanner;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, LabelMatchError::FolderNotFound(_)));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("lecturers.json"), "[]").unwrap();

    let result = scanner::scan_folder(dir.path(), true);
    assert!(result.is_ok());
    assert!(result.unwrap().is_empty());
}

/// 画像として読めないデータ
#[test]
fn test_preprocess_invalid_image() {
    let result = preprocess(b"GIF89a but not really", &PreprocessOptions::default());
    assert!(matches!(result, Err(LabelMatchError::ImageLoad(_))));
}

/// ディレクトリファイルのメール重複
#[tokio::test]
async fn test_directory_duplicate_email() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lecturers.csv");
    std::fs::write(
        &path,
        "email,first_name,last_name\nj.roe@wrexham.ac.uk,Jane,Roe\nJ.Roe@wrexham.ac.uk,Janet,Roe\n",
    )
    .unwrap();

    let result = FileDirectory::new(&path).fetch().await;
    let err = result.unwrap_err();
    assert!(matches!(err, LabelMatchError::Directory(_)));
    assert!(err.to_string().contains("J.Roe@wrexham.ac.uk"));
}

/// LabelMatchErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        LabelMatchError::Config("テスト設定エラー".to_string()),
        LabelMatchError::FileNotFound("label.jpg".to_string()),
        LabelMatchError::FolderNotFound("/path/to/folder".to_string()),
        LabelMatchError::ImageLoad("壊れた画像".to_string()),
        LabelMatchError::ImageEncode("JPEG".to_string()),
        LabelMatchError::Ocr("HTTP 401".to_string()),
        LabelMatchError::OcrFailed("処理不可".to_string()),
        LabelMatchError::Directory("取得失敗".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty());
    }
}

/// OCRキー未設定のメッセージ
#[test]
fn test_missing_ocr_key_message() {
    let display = LabelMatchError::MissingOcrKey.to_string();
    assert!(display.contains("config --set-ocr-key"));
}

/// 共通ライブラリのエラーはそのまま表示される
#[test]
fn test_common_error_is_transparent() {
    let err: LabelMatchError = label_match::common::Error::Parse("email列がありません".into()).into();
    assert_eq!(err.to_string(), "Parse error: email列がありません");
}
