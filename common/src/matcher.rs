//! 宛先照合モジュール
//!
//! ## 処理フロー
//! 1. 空テキストは照合しない
//! 2. テキスト中のメールがディレクトリと一致すれば即決定
//! 3. ドメインのみ一致するメールがあればそのまま返す（未確認アドレス）
//! 4. 名前窓と各教員の姓・名・フルネームを重み付き類似度で採点
//! 5. 最良スコアが閾値を超えれば採用
//!
//! 同点の場合はディレクトリ順で先のレコードを採用する。

use crate::directory::{split_full_name, Directory, DirectoryEntry};
use crate::similarity::{jaro_winkler, levenshtein_ratio};
use crate::text::candidates::{extract_email_candidates, extract_name_candidates};
use crate::text::noise::prefer_top_lines;
use crate::text::{clean_name_like, email_domain, normalize, normalize_domain};
use crate::types::{LabelText, MatchKind, MatchOutcome};
use std::collections::HashSet;

/// 通常の採用閾値
pub const ACCEPT_THRESHOLD: f64 = 0.87;
/// 短い氏名に対する緩和閾値
pub const WEAK_ACCEPT_THRESHOLD: f64 = 0.82;
/// これを超えたら残りの窓は見ない
const EARLY_EXIT_SCORE: f64 = 0.995;

const LAST_WEIGHT: f64 = 0.50;
const FIRST_WEIGHT: f64 = 0.35;
const FULL_WEIGHT: f64 = 0.15;
const INITIALS_BONUS: f64 = 0.02;
const TITLE_BONUS: f64 = 0.01;
const TOP_LINE_BONUS: f64 = 0.02;

/// ディレクトリのスナップショットに対して照合する
pub fn match_snapshot(directory: &Directory, input: &LabelText) -> MatchOutcome {
    if input.is_blank() {
        return MatchOutcome::NoMatch { best_score: None };
    }

    if let Some(outcome) = match_email(directory, &input.text) {
        return outcome;
    }

    match_names(directory, input)
}

/// メール経路（完全一致 → ドメイン一致）
fn match_email(directory: &Directory, raw_text: &str) -> Option<MatchOutcome> {
    let candidates: Vec<String> = extract_email_candidates(raw_text)
        .iter()
        .map(|e| normalize_domain(e))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let known: Vec<String> = directory
        .entries()
        .iter()
        .filter(|e| !e.email.trim().is_empty())
        .map(|e| normalize_domain(e.email.trim()))
        .collect();

    for candidate in &candidates {
        if let Some(email) = known.iter().find(|k| k.eq_ignore_ascii_case(candidate)) {
            tracing::debug!(email = %email, "メール完全一致");
            return Some(MatchOutcome::Matched {
                email: email.clone(),
                kind: MatchKind::ExactEmail,
                score: None,
            });
        }
    }

    let domains: HashSet<String> = known.iter().filter_map(|k| email_domain(k)).collect();
    let domain_hit = candidates
        .iter()
        .find(|c| email_domain(c).map(|d| domains.contains(&d)).unwrap_or(false))?;

    // ディレクトリに存在しないアドレスをそのまま返す
    tracing::warn!(email = %domain_hit, "ドメインのみ一致したメールを採用");
    Some(MatchOutcome::Matched {
        email: domain_hit.clone(),
        kind: MatchKind::DomainFallback,
        score: None,
    })
}

/// 採点用に整形済みの名前窓
struct Window {
    cleaned: String,
    tokens: Vec<String>,
    titled: bool,
    boosted: bool,
}

/// 教員ごとの照合用氏名
struct NameProfile {
    first: String,
    last: String,
    full: String,
    initials: Option<InitialsPattern>,
}

impl NameProfile {
    fn from_entry(entry: &DirectoryEntry) -> Option<Self> {
        if entry.email.trim().is_empty() {
            return None;
        }
        let composed = entry.composed_name();
        if composed.trim().is_empty() {
            return None;
        }

        let mut first = clean_name_like(entry.first_name.as_deref().unwrap_or(""));
        let mut last = clean_name_like(entry.last_name.as_deref().unwrap_or(""));
        let full = clean_name_like(&composed);

        // 姓が無ければフルネームの最後のトークンを姓とする
        if last.is_empty() {
            if let (Some(given), Some(surname)) = split_full_name(&full) {
                first = given;
                last = surname;
            }
        }

        let initials = InitialsPattern::new(&first, &last);
        Some(Self {
            first,
            last,
            full,
            initials,
        })
    }

    /// 短い氏名か（編集1つの影響が大きい）
    fn is_short(&self) -> bool {
        let last_token_len = self.full.split(' ').last().map(|t| t.len()).unwrap_or(0);
        self.full.chars().count() <= 10 || last_token_len <= 4
    }

    fn score(&self, windows: &[Window]) -> f64 {
        let mut max_sim: f64 = 0.0;
        for window in windows {
            let first_sim = if self.first.is_empty() {
                0.0
            } else {
                best_token_similarity(&self.first, &window.tokens)
            };
            let last_sim = if self.last.is_empty() {
                0.0
            } else {
                best_token_similarity(&self.last, &window.tokens)
            };
            let full_sim = 0.9 * jaro_winkler(&self.full, &window.cleaned)
                + 0.1 * levenshtein_ratio(&self.full, &window.cleaned);

            let initials_match = self
                .initials
                .as_ref()
                .map(|p| p.is_match(&window.tokens))
                .unwrap_or(false);

            let mut sim = LAST_WEIGHT * last_sim + FIRST_WEIGHT * first_sim + FULL_WEIGHT * full_sim;
            if initials_match {
                sim += INITIALS_BONUS;
            }
            if window.titled {
                sim += TITLE_BONUS;
            }
            if window.boosted {
                sim += TOP_LINE_BONUS;
            }

            if sim > max_sim {
                max_sim = sim;
            }
            if max_sim > EARLY_EXIT_SCORE {
                break;
            }
        }
        max_sim
    }
}

/// イニシャル表記（`d doroschenko`, `doroschenko d`）の判定
///
/// 整形済みの窓は空白区切りの英小文字トークンなので、トークンの隣接で判定する。
struct InitialsPattern {
    last_tokens: Vec<String>,
    initial: Option<String>,
}

impl InitialsPattern {
    fn new(first: &str, last: &str) -> Option<Self> {
        let last_tokens: Vec<String> = last.split_whitespace().map(str::to_string).collect();
        if last_tokens.is_empty() {
            return None;
        }
        let initial = first.chars().next().map(|c| c.to_lowercase().to_string());
        Some(Self { last_tokens, initial })
    }

    fn is_match(&self, tokens: &[String]) -> bool {
        let n = self.last_tokens.len();
        if tokens.len() < n {
            return false;
        }

        (0..=tokens.len() - n)
            .filter(|&i| tokens[i..i + n] == self.last_tokens[..])
            .any(|i| match &self.initial {
                None => true,
                // 前は単独のイニシャル、後ろはイニシャルで始まるトークン
                Some(fi) => {
                    (i > 0 && tokens[i - 1] == *fi)
                        || tokens.get(i + n).map(|t| t.starts_with(fi.as_str())).unwrap_or(false)
                }
            })
    }
}

/// 候補中のトークンとの最良類似度（`0.7·JW + 0.3·編集距離比`）
fn best_token_similarity(needle: &str, tokens: &[String]) -> f64 {
    tokens
        .iter()
        .map(|tok| 0.7 * jaro_winkler(needle, tok) + 0.3 * levenshtein_ratio(needle, tok))
        .fold(0.0, f64::max)
}

/// 名前のあいまい照合
fn match_names(directory: &Directory, input: &LabelText) -> MatchOutcome {
    let normalized = normalize(&input.text);
    let boosted: HashSet<String> = prefer_top_lines(input.lines.as_deref())
        .into_iter()
        .collect();

    let windows: Vec<Window> = extract_name_candidates(&normalized)
        .into_iter()
        .filter_map(|candidate| {
            let cleaned = clean_name_like(&candidate.text);
            if cleaned.is_empty() {
                return None;
            }
            Some(Window {
                tokens: cleaned.split(' ').map(str::to_string).collect(),
                boosted: boosted.contains(&cleaned),
                titled: candidate.titled,
                cleaned,
            })
        })
        .collect();

    let best = best_entry(directory.entries(), &windows);

    let Some((index, profile, score)) = best else {
        tracing::debug!("照合対象の教員がいません");
        return MatchOutcome::NoMatch { best_score: None };
    };

    let entry = &directory.entries()[index];
    tracing::debug!(email = %entry.email, score, "最良候補");

    let accepted = score >= ACCEPT_THRESHOLD || (score >= WEAK_ACCEPT_THRESHOLD && profile.is_short());
    if accepted {
        MatchOutcome::Matched {
            email: normalize_domain(&entry.email),
            kind: MatchKind::FuzzyName,
            score: Some(score),
        }
    } else {
        MatchOutcome::NoMatch {
            best_score: Some(score),
        }
    }
}

/// 同点なら添字の小さい方
fn better(a: (usize, NameProfile, f64), b: (usize, NameProfile, f64)) -> (usize, NameProfile, f64) {
    if b.2 > a.2 || (b.2 == a.2 && b.0 < a.0) {
        b
    } else {
        a
    }
}

#[cfg(feature = "parallel")]
fn best_entry(entries: &[DirectoryEntry], windows: &[Window]) -> Option<(usize, NameProfile, f64)> {
    use rayon::prelude::*;

    entries
        .par_iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let profile = NameProfile::from_entry(entry)?;
            let score = profile.score(windows);
            Some((i, profile, score))
        })
        .reduce_with(better)
}

#[cfg(not(feature = "parallel"))]
fn best_entry(entries: &[DirectoryEntry], windows: &[Window]) -> Option<(usize, NameProfile, f64)> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let profile = NameProfile::from_entry(entry)?;
            let score = profile.score(windows);
            Some((i, profile, score))
        })
        .reduce(better)
}
