//! 候補抽出（メールアドレス・名前窓）

use super::lexicon;
use crate::types::NameCandidate;
use regex::Regex;
use std::collections::HashSet;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"(?i)\b[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}\b").unwrap();
    static ref OBFUSCATED_AT: Regex = Regex::new(r"(?i)\[at\]|\(at\)| at ").unwrap();
    static ref OBFUSCATED_DOT: Regex = Regex::new(r"(?i)\[dot\]|\(dot\)| dot ").unwrap();
    static ref NON_CANDIDATE_CHARS: Regex = Regex::new(r"[^a-z\s.]").unwrap();
}

/// 生のOCRテキストからメールアドレス候補を抽出する
///
/// 原文と難読化解除後の両方を検索し、大文字小文字を無視して重複を除く（出現順）。
pub fn extract_email_candidates(raw_text: &str) -> Vec<String> {
    if raw_text.trim().is_empty() {
        return Vec::new();
    }

    let deobfuscated = OBFUSCATED_AT.replace_all(raw_text, "@");
    let deobfuscated = OBFUSCATED_DOT.replace_all(&deobfuscated, ".");

    let mut seen = HashSet::new();
    EMAIL_RE
        .find_iter(raw_text)
        .chain(EMAIL_RE.find_iter(&deobfuscated))
        .map(|m| m.as_str().to_string())
        .filter(|email| seen.insert(email.to_lowercase()))
        .collect()
}

/// 正規化済みテキストから名前候補の窓を抽出する
///
/// 敬称・住所語を除いたトークン列から2〜3トークンの連続窓を作り、
/// 続けて3文字以上の単独トークン（姓の可能性）を加える。
/// 重複は最初の出現位置を保ったまま除く。
pub fn extract_name_candidates(normalized: &str) -> Vec<NameCandidate> {
    if normalized.trim().is_empty() {
        return Vec::new();
    }

    // イニシャル用にドットは残す
    let clean = NON_CANDIDATE_CHARS.replace_all(normalized, " ");

    // (トークン, 直前に敬称があったか)
    let mut tokens: Vec<(&str, bool)> = Vec::new();
    let mut pending_title = false;
    for tok in clean.split_whitespace() {
        if lexicon::is_stopword(tok) {
            pending_title |= lexicon::is_academic_title(tok);
            continue;
        }
        // ドットのみのトークンは難読化解除の残り
        if !tok.chars().any(|c| c.is_ascii_lowercase()) {
            continue;
        }
        tokens.push((tok, pending_title));
        pending_title = false;
    }

    let mut windows: Vec<NameCandidate> = Vec::new();
    let mut push = |slice: &[(&str, bool)]| {
        let text = slice.iter().map(|(t, _)| *t).collect::<Vec<_>>().join(" ");
        let titled = slice.iter().any(|(_, titled)| *titled);
        match windows.iter_mut().find(|w| w.text == text) {
            Some(existing) => existing.titled |= titled,
            None => windows.push(NameCandidate { text, titled }),
        }
    };

    // 2・3トークンの窓を先に（単独より信頼できる）
    for i in 0..tokens.len() {
        if i + 1 < tokens.len() {
            push(&tokens[i..i + 2]);
        }
        if i + 2 < tokens.len() {
            push(&tokens[i..i + 3]);
        }
    }

    // 単独トークン（姓の可能性）
    for i in 0..tokens.len() {
        if tokens[i].0.chars().count() >= 3 {
            push(&tokens[i..i + 1]);
        }
    }

    windows
}
