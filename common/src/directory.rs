//! 教員ディレクトリモジュール
//!
//! 照合対象となる教員レコード（メール・氏名）を保持する。
//! JSON配列またはCSVから読み込み、照合1回分の不変スナップショットとして扱う。

use crate::error::{Error, Result};
use crate::text::normalize_domain;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 教員レコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    /// メールアドレス（大文字小文字を無視して一意）
    #[serde(alias = "Email", alias = "Lecturer_Email")]
    pub email: String,

    #[serde(default, alias = "LecturerFirstName")]
    pub first_name: Option<String>,

    #[serde(default, alias = "LecturerLastName")]
    pub last_name: Option<String>,

    /// 旧形式のフルネーム（姓名が無い場合のみ使用）
    #[serde(default, alias = "LecturerName")]
    pub name: Option<String>,
}

impl DirectoryEntry {
    pub fn new(email: impl Into<String>, first_name: &str, last_name: &str) -> Self {
        Self {
            email: email.into(),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            name: None,
        }
    }

    /// 旧形式（フルネームのみ）のレコード
    pub fn with_legacy_name(email: impl Into<String>, name: &str) -> Self {
        Self {
            email: email.into(),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// 照合用の氏名（姓名があれば「名 姓」、無ければ旧形式のフルネーム）
    pub fn composed_name(&self) -> String {
        let first = self.first_name.as_deref().unwrap_or("");
        let last = self.last_name.as_deref().unwrap_or("");
        if !first.trim().is_empty() || !last.trim().is_empty() {
            format!("{} {}", first, last).trim().to_string()
        } else {
            self.name.clone().unwrap_or_default()
        }
    }

    /// 表示名（旧形式のフルネームを優先）
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!(
                "{} {}",
                self.first_name.as_deref().unwrap_or(""),
                self.last_name.as_deref().unwrap_or("")
            )
            .trim()
            .to_string(),
        }
    }
}

/// フルネームを（名, 姓）に分割する
///
/// 最後のトークンを姓とする。1トークンなら名のみ。
pub fn split_full_name(full_name: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    match parts.as_slice() {
        [] => (None, None),
        [single] => (Some(single.to_string()), None),
        [given @ .., last] => (Some(given.join(" ")), Some(last.to_string())),
    }
}

/// 教員ディレクトリ（不変スナップショット）
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    /// レコード列から構築（メール重複はエラー）
    pub fn new(entries: Vec<DirectoryEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            let key = entry.email.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            if !seen.insert(key) {
                return Err(Error::DuplicateEmail(entry.email.clone()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// メールで検索（大文字小文字・旧ドメインを無視）
    pub fn find_by_email(&self, email: &str) -> Option<&DirectoryEntry> {
        let wanted = normalize_domain(email.trim());
        self.entries
            .iter()
            .find(|e| normalize_domain(e.email.trim()).eq_ignore_ascii_case(&wanted))
    }

    /// JSON配列から読み込み
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<DirectoryEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// CSV文字列から読み込み
    ///
    /// ヘッダー行で列を判定する（`email`, `first_name`, `last_name`, `name`）。
    pub fn from_csv_str(content: &str) -> Result<Self> {
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| Error::Parse("CSVが空です".into()))?;
        let columns = CsvColumns::from_header(header)?;

        let entries = lines
            .map(|line| {
                let fields = parse_csv_line(line);
                DirectoryEntry {
                    email: columns.field(&fields, columns.email).unwrap_or_default(),
                    first_name: columns.optional(&fields, columns.first_name),
                    last_name: columns.optional(&fields, columns.last_name),
                    name: columns.optional(&fields, columns.name),
                }
            })
            .filter(|entry| !entry.email.is_empty())
            .collect();

        Self::new(entries)
    }

    /// ファイルから読み込み（拡張子 `.csv` はCSV、それ以外はJSON）
    #[cfg(not(feature = "wasm"))]
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str_with_path(&content, path)
    }

    /// パスの拡張子で形式を判定して文字列から読み込み
    pub fn from_str_with_path(content: &str, path: &std::path::Path) -> Result<Self> {
        let is_csv = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            Self::from_csv_str(content)
        } else {
            Self::from_json_str(content)
        }
    }
}

/// CSVヘッダーの列位置
struct CsvColumns {
    email: usize,
    first_name: Option<usize>,
    last_name: Option<usize>,
    name: Option<usize>,
}

impl CsvColumns {
    fn from_header(header: &str) -> Result<Self> {
        let names: Vec<String> = parse_csv_line(header)
            .iter()
            .map(|h| h.to_lowercase().replace([' ', '_'], ""))
            .collect();
        let position = |candidates: &[&str]| {
            names
                .iter()
                .position(|n| candidates.contains(&n.as_str()))
        };

        let email = position(&["email", "lectureremail"])
            .ok_or_else(|| Error::Parse("email列がありません".into()))?;

        Ok(Self {
            email,
            first_name: position(&["firstname", "lecturerfirstname"]),
            last_name: position(&["lastname", "lecturerlastname"]),
            name: position(&["name", "fullname", "lecturername"]),
        })
    }

    fn field(&self, fields: &[&str], index: usize) -> Option<String> {
        fields.get(index).map(|f| f.trim().to_string())
    }

    fn optional(&self, fields: &[&str], index: Option<usize>) -> Option<String> {
        index
            .and_then(|i| self.field(fields, i))
            .filter(|f| !f.is_empty())
    }
}

/// CSVの1行をフィールドに分割（ダブルクォート対応）
fn parse_csv_line(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field_start = 0;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(trim_quotes(&line[field_start..i]));
            field_start = i + c.len_utf8();
        }
    }

    // 最後のフィールド
    fields.push(trim_quotes(&line[field_start..]));

    fields
}

fn trim_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
        &s[1..s.len() - 1]
    } else {
        s
    }
}
