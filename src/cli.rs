use crate::error::Result;
use clap::{Parser, Subcommand};
use label_match_common::LabelText;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "label-match")]
#[command(about = "配送ラベル写真から宛先教員のメールアドレスを特定するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像をOCR用に前処理してJPEGを出力
    Preprocess {
        /// 入力画像
        #[arg(required = true)]
        image: PathBuf,

        /// 出力JPEG（デフォルト: 入力名.processed.jpg）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// OCRテキストを教員ディレクトリと照合
    Match {
        /// OCR全文
        #[arg(long)]
        text: Option<String>,

        /// OCR行（複数指定可、上から順）
        #[arg(long = "line")]
        lines: Vec<String>,

        /// OCR結果JSON（文字列 または {"text": ..., "lines": [...]}）
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// 教員ディレクトリ（JSON/CSV）
        #[arg(short, long)]
        directory: Option<PathBuf>,
    },

    /// ラベル写真1枚を前処理 → OCR → 照合
    Scan {
        /// ラベル写真
        #[arg(required = true)]
        image: PathBuf,

        /// 教員ディレクトリ（JSON/CSV）
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// 前処理後の画像を保存
        #[arg(long)]
        keep_processed: bool,
    },

    /// フォルダ内のラベル写真を一括処理してJSONを出力
    Batch {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// 教員ディレクトリ（JSON/CSV）
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// 出力JSONファイル（デフォルト: 入力フォルダ/label-match.json）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// 設定を表示/編集
    Config {
        /// OCRキーを設定
        #[arg(long)]
        set_ocr_key: Option<String>,

        /// OCRエンドポイントを設定
        #[arg(long)]
        set_ocr_endpoint: Option<String>,

        /// 既定の教員ディレクトリを設定
        #[arg(long)]
        set_directory: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// `match` サブコマンドの入力を組み立てる（JSONファイルを優先）
pub fn label_text_from_args(
    text: Option<String>,
    lines: Vec<String>,
    input: Option<&Path>,
) -> Result<LabelText> {
    if let Some(path) = input {
        let content = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&content)?);
    }

    let lines = if lines.is_empty() { None } else { Some(lines) };
    let text = match (text, &lines) {
        (Some(text), _) => text,
        (None, Some(lines)) => lines.join(" "),
        (None, None) => String::new(),
    };
    Ok(LabelText { text, lines })
}

/// 前処理画像の既定の出力先
pub fn processed_path(image: &Path) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "label".into());
    image.with_file_name(format!("{}.processed.jpg", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parses_match_lines() {
        let cli = Cli::parse_from([
            "label-match",
            "match",
            "--line",
            "Dr D. Doroschenko",
            "--line",
            "Wrexham LL11 2AW",
            "-d",
            "lecturers.csv",
        ]);
        match cli.command {
            Commands::Match { lines, directory, text, .. } => {
                assert_eq!(lines.len(), 2);
                assert_eq!(directory, Some(PathBuf::from("lecturers.csv")));
                assert!(text.is_none());
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn test_label_text_joins_lines() {
        let input = label_text_from_args(None, vec!["Jane Roe".into(), "Room 4".into()], None).unwrap();
        assert_eq!(input.text, "Jane Roe Room 4");
        assert_eq!(input.lines.unwrap().len(), 2);

        let input = label_text_from_args(Some("only text".into()), vec![], None).unwrap();
        assert_eq!(input.text, "only text");
        assert!(input.lines.is_none());
    }

    #[test]
    fn test_label_text_from_json_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr.json");
        std::fs::write(&path, r#"{"text": "Jane Roe", "lines": ["Jane Roe"]}"#).unwrap();
        let input = label_text_from_args(Some("ignored".into()), vec![], Some(&path)).unwrap();
        assert_eq!(input.text, "Jane Roe");

        std::fs::write(&path, r#""just a string""#).unwrap();
        let input = label_text_from_args(None, vec![], Some(&path)).unwrap();
        assert_eq!(input.text, "just a string");
        assert!(input.lines.is_none());
    }

    #[test]
    fn test_processed_path() {
        assert_eq!(
            processed_path(Path::new("/tmp/labels/IMG_0001.JPG")),
            PathBuf::from("/tmp/labels/IMG_0001.processed.jpg")
        );
    }
}
