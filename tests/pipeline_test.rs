//! ラベル処理パイプラインの結合テスト
//!
//! 偽のOCRエンジンとメモリ上のディレクトリで、前処理 → OCR → 照合を通す

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use label_match::common::DirectoryEntry;
use label_match::directory::{FileDirectory, StaticDirectory};
use label_match::error::{LabelMatchError, Result};
use label_match::ocr::{OcrEngine, OcrStatus};
use label_match::pipeline::{LabelPipeline, LabelReport};
use label_match::preprocess::PreprocessOptions;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;

/// 投入された画像を記録し、固定の行を返すOCR
struct FakeOcr {
    lines: Vec<String>,
    received: Mutex<Vec<Vec<u8>>>,
}

impl FakeOcr {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|s| s.to_string()).collect(),
            received: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn submit(&self, image: Vec<u8>) -> Result<String> {
        self.received.lock().unwrap().push(image);
        Ok("fake-op".into())
    }

    async fn poll(&self, _operation_id: &str) -> Result<OcrStatus> {
        Ok(OcrStatus::Succeeded(self.lines.clone()))
    }
}

fn label_png() -> Vec<u8> {
    let gray = GrayImage::from_fn(320, 240, |x, y| {
        if (80..240).contains(&x) && (60..180).contains(&y) {
            Luma([30])
        } else {
            Luma([252])
        }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn lecturers() -> StaticDirectory {
    StaticDirectory::new(vec![
        DirectoryEntry::new("j.smith@wrexham.ac.uk", "John", "Smith"),
        DirectoryEntry::new("d.doroschenko@wrexham.ac.uk", "Daniel", "Doroschenko"),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_pipeline_matches_label() {
    let ocr = FakeOcr::new(&["Dr D. Doroschenko", "School of Computing", "Wrexham LL11 2AW"]);
    let pipeline = LabelPipeline::new(ocr, lecturers(), PreprocessOptions::default(), Duration::from_millis(1));

    let result = pipeline.process_bytes("IMG_0001.jpg", &label_png()).await.unwrap();

    assert_eq!(
        result.report,
        LabelReport {
            file_name: "IMG_0001.jpg".into(),
            text: "Dr D. Doroschenko School of Computing Wrexham LL11 2AW".into(),
            lines: vec![
                "Dr D. Doroschenko".into(),
                "School of Computing".into(),
                "Wrexham LL11 2AW".into(),
            ],
            email: Some("d.doroschenko@wrexham.ac.uk".into()),
            recipient_name: Some("Daniel Doroschenko".into()),
        }
    );

    // OCRには前処理済み（トリミング済みJPEG）が渡る
    let processed = image::load_from_memory(&result.processed_image).unwrap();
    assert!(processed.width() < 320 && processed.height() < 240);
    assert_eq!(image::guess_format(&result.processed_image).unwrap(), ImageFormat::Jpeg);
}

#[tokio::test]
async fn test_pipeline_no_match_is_not_an_error() {
    let ocr = FakeOcr::new(&["Random unrelated delivery note, no names"]);
    let pipeline = LabelPipeline::new(ocr, lecturers(), PreprocessOptions::default(), Duration::from_millis(1));

    let result = pipeline.process_bytes("note.png", &label_png()).await.unwrap();
    assert_eq!(result.report.email, None);
}

#[tokio::test]
async fn test_pipeline_with_directory_file() {
    let dir = tempdir().unwrap();
    let directory_path = dir.path().join("lecturers.json");
    std::fs::write(
        &directory_path,
        r#"[{"Lecturer_Email": "a.evans@glyndwr.ac.uk", "LecturerName": "Alun Rhys Evans"}]"#,
    )
    .unwrap();
    let image_path = dir.path().join("label.png");
    std::fs::write(&image_path, label_png()).unwrap();

    let ocr = FakeOcr::new(&["FAO Alun Rhys Evans", "Order #A1B2C3D4"]);
    let pipeline = LabelPipeline::new(
        ocr,
        FileDirectory::new(&directory_path),
        PreprocessOptions::default(),
        Duration::from_millis(1),
    );

    let result = pipeline.process_file(&image_path, "label.png").await.unwrap();
    assert_eq!(result.report.email.as_deref(), Some("a.evans@wrexham.ac.uk"));
    assert_eq!(result.report.recipient_name.as_deref(), Some("Alun Rhys Evans"));
}

#[tokio::test]
async fn test_pipeline_missing_file() {
    let pipeline = LabelPipeline::new(
        FakeOcr::new(&[]),
        lecturers(),
        PreprocessOptions::default(),
        Duration::from_millis(1),
    );
    let result = pipeline
        .process_file(std::path::Path::new("/nonexistent/label.jpg"), "label.jpg")
        .await;
    assert!(matches!(result, Err(LabelMatchError::FileNotFound(_))));
}

#[test]
fn test_report_json_shape() {
    let report = LabelReport {
        file_name: "a.jpg".into(),
        text: "Jane Roe".into(),
        lines: vec!["Jane Roe".into()],
        email: None,
        recipient_name: None,
    };
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["fileName"], "a.jpg");
    assert!(json["email"].is_null());
    assert!(json.get("recipientName").is_none());
    assert_eq!(json["lines"][0], "Jane Roe");
}
