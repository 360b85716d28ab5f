//! 宛先教員の照合（ディレクトリ取得付き）

use crate::directory::DirectoryProvider;
use crate::error::Result;
use label_match_common::{match_snapshot, LabelText, MatchKind, MatchOutcome};

/// 特定した宛先
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub email: String,
    /// ディレクトリ上の表示名（ドメイン推定では None）
    pub name: Option<String>,
    pub kind: MatchKind,
}

pub struct LecturerMatcher<P> {
    provider: P,
}

impl<P: DirectoryProvider> LecturerMatcher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// 照合結果を詳細付きで返す
    ///
    /// 空テキストではディレクトリを取得しない。
    pub async fn evaluate(&self, input: &LabelText) -> Result<MatchOutcome> {
        if input.is_blank() {
            return Ok(MatchOutcome::NoMatch { best_score: None });
        }

        let directory = self.provider.fetch().await?;
        let outcome = match_snapshot(&directory, input);
        tracing::debug!(outcome = ?outcome, "照合結果");
        Ok(outcome)
    }

    /// 宛先と表示名を返す（取得したスナップショットで名前も引く）
    pub async fn find_recipient(&self, input: &LabelText) -> Result<Option<Recipient>> {
        if input.is_blank() {
            return Ok(None);
        }

        let directory = self.provider.fetch().await?;
        let recipient = match match_snapshot(&directory, input) {
            MatchOutcome::Matched { email, kind, .. } => {
                let name = directory.find_by_email(&email).map(|e| e.display_name());
                Some(Recipient { email, name, kind })
            }
            MatchOutcome::NoMatch { .. } => None,
        };
        tracing::debug!(recipient = ?recipient, "宛先");
        Ok(recipient)
    }

    /// 宛先メールアドレスを返す（該当なしは `None`）
    pub async fn find_match(&self, text: &str, lines: Option<&[String]>) -> Result<Option<String>> {
        let input = LabelText {
            text: text.to_string(),
            lines: lines.map(|l| l.to_vec()),
        };
        Ok(self.evaluate(&input).await?.into_email())
    }
}
