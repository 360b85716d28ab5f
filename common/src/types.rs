//! 照合パイプラインの共通型

use serde::{Deserialize, Serialize};

/// OCRサービスの認識結果（行順を保持）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedText {
    /// 全行をスペースで連結したテキスト
    pub text: String,
    /// 認識された行（上から順）
    pub lines: Vec<String>,
}

impl RecognizedText {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            text: lines.join(" "),
            lines,
        }
    }
}

/// 照合入力
///
/// JSON境界では文字列単体と `{ "text": ..., "lines": [...] }` の両方を受け付け、
/// 読み込み時に一度だけこの形へ解決する。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "LabelTextRepr")]
pub struct LabelText {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<String>>,
}

impl LabelText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lines: None,
        }
    }

    pub fn with_lines(text: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            text: text.into(),
            lines: Some(lines),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<RecognizedText> for LabelText {
    fn from(recognized: RecognizedText) -> Self {
        Self {
            text: recognized.text,
            lines: Some(recognized.lines),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LabelTextRepr {
    Plain(String),
    Structured {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        lines: Option<Vec<String>>,
    },
}

impl From<LabelTextRepr> for LabelText {
    fn from(repr: LabelTextRepr) -> Self {
        match repr {
            LabelTextRepr::Plain(text) => Self::new(text),
            LabelTextRepr::Structured { text, lines } => {
                // textが無ければ行から組み立てる
                let text = match (text, &lines) {
                    (Some(t), _) if !t.trim().is_empty() => t,
                    (_, Some(lines)) => lines.join(" "),
                    (t, None) => t.unwrap_or_default(),
                };
                Self { text, lines }
            }
        }
    }
}

/// 名前候補（1〜3トークンの窓）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    /// 正規化済みの窓テキスト（イニシャルのドットは保持）
    pub text: String,
    /// 元テキストで敬称（dr/prof/professor）が窓の直前または内部にあったか
    pub titled: bool,
}

/// 照合の経路
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    /// テキスト中のメールがディレクトリと完全一致
    ExactEmail,
    /// ドメインのみ一致（ディレクトリ未確認のアドレス）
    DomainFallback,
    /// 名前のあいまい照合
    FuzzyName,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKind::ExactEmail => write!(f, "exact-email"),
            MatchKind::DomainFallback => write!(f, "domain-fallback"),
            MatchKind::FuzzyName => write!(f, "fuzzy-name"),
        }
    }
}

/// 照合結果
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched {
        email: String,
        kind: MatchKind,
        /// あいまい照合のスコア（メール経路ではNone）
        score: Option<f64>,
    },
    NoMatch {
        /// 最良スコア（候補がなければNone）
        best_score: Option<f64>,
    },
}

impl MatchOutcome {
    pub fn email(&self) -> Option<&str> {
        match self {
            MatchOutcome::Matched { email, .. } => Some(email),
            MatchOutcome::NoMatch { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<MatchKind> {
        match self {
            MatchOutcome::Matched { kind, .. } => Some(*kind),
            MatchOutcome::NoMatch { .. } => None,
        }
    }

    pub fn into_email(self) -> Option<String> {
        match self {
            MatchOutcome::Matched { email, .. } => Some(email),
            MatchOutcome::NoMatch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_text_from_plain_string() {
        let input: LabelText = serde_json::from_str(r#""Dr D. Doroschenko""#).unwrap();
        assert_eq!(input.text, "Dr D. Doroschenko");
        assert!(input.lines.is_none());
    }

    #[test]
    fn test_label_text_from_object() {
        let json = r#"{"text": "Dr D. Doroschenko Wrexham", "lines": ["Dr D. Doroschenko", "Wrexham"]}"#;
        let input: LabelText = serde_json::from_str(json).unwrap();
        assert_eq!(input.text, "Dr D. Doroschenko Wrexham");
        assert_eq!(input.lines.as_ref().map(|l| l.len()), Some(2));
    }

    #[test]
    fn test_label_text_lines_only() {
        let json = r#"{"lines": ["Prof Jane Roe", "Room 101"]}"#;
        let input: LabelText = serde_json::from_str(json).unwrap();
        assert_eq!(input.text, "Prof Jane Roe Room 101");
    }

    #[test]
    fn test_label_text_empty_object_is_blank() {
        let input: LabelText = serde_json::from_str("{}").unwrap();
        assert!(input.is_blank());
    }

    #[test]
    fn test_recognized_text_joins_lines() {
        let recognized = RecognizedText::from_lines(vec!["a".into(), "b".into()]);
        assert_eq!(recognized.text, "a b");
        let input: LabelText = recognized.into();
        assert_eq!(input.lines, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = MatchOutcome::Matched {
            email: "x@wrexham.ac.uk".into(),
            kind: MatchKind::FuzzyName,
            score: Some(0.9),
        };
        assert_eq!(outcome.email(), Some("x@wrexham.ac.uk"));
        assert_eq!(outcome.kind(), Some(MatchKind::FuzzyName));
        assert_eq!(MatchOutcome::NoMatch { best_score: None }.email(), None);
    }
}
