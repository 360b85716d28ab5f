//! OCRテキスト正規化モジュール
//!
//! ## 処理フロー
//! 1. 小文字化・ダイアクリティカルマーク除去
//! 2. OCR誤認識の補正（`0`→`o`, `1`→`l`, `5`→`s`, `8`→`b`）
//! 3. メール難読化の解除（`(at)`, `[dot]`, 単独の ` at ` / ` dot `）
//! 4. 空白の統一
//!
//! 難読化解除を文字補正の後に行うことで `normalize` は冪等になる。

pub mod candidates;
pub mod lexicon;
pub mod noise;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

lazy_static::lazy_static! {
    static ref AT_BRACKETS: Regex = Regex::new(r"\(at\)|\[at\]").unwrap();
    static ref DOT_BRACKETS: Regex = Regex::new(r"\(dot\)|\[dot\]").unwrap();
    static ref NON_NAME_CHARS: Regex = Regex::new(r"[^a-z\s]").unwrap();
}

/// OCR誤認識の補正（小文字化後に適用）
fn fix_ocr_char(c: char) -> char {
    match c {
        '0' | 'O' => 'o',
        '1' | 'I' | 'l' => 'l',
        '5' | 'S' => 's',
        '8' | 'B' => 'b',
        _ => c,
    }
}

/// テキストを照合用に正規化する
pub fn normalize(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    // 小文字化 → 分解してマーク除去 → 再合成
    let lowered = input.to_lowercase();
    let stripped: String = lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .map(fix_ocr_char)
        .collect();

    let t = AT_BRACKETS.replace_all(&stripped, "@");
    let t = DOT_BRACKETS.replace_all(&t, ".");

    // 空白の統一と、前後を空白に挟まれた at / dot の置換
    let tokens: Vec<&str> = t.split_whitespace().collect();
    let last = tokens.len().saturating_sub(1);
    tokens
        .iter()
        .enumerate()
        .map(|(i, tok)| match *tok {
            "at" if i > 0 && i < last => "@",
            "dot" if i > 0 && i < last => ".",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 名前らしい文字列を整形する
///
/// 正規化後、英字以外を除去し、敬称・住所語を落として愛称を正式名に置換する。
pub fn clean_name_like(s: &str) -> String {
    if s.trim().is_empty() {
        return String::new();
    }
    let normalized = normalize(s);
    let letters = NON_NAME_CHARS.replace_all(&normalized, " ");

    letters
        .split_whitespace()
        .filter(|tok| !lexicon::is_stopword(tok))
        .map(lexicon::canonical_name)
        .collect::<Vec<_>>()
        .join(" ")
}

/// メールのドメイン部を小文字化し、旧ドメインを正規ドメインに置換する
///
/// ローカル部は変更しない。`@` がちょうど1つでなければそのまま返す。
pub fn normalize_domain(email: &str) -> String {
    let mut parts = email.split('@');
    let (user, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(user), Some(domain), None) => (user, domain),
        _ => return email.to_string(),
    };

    let domain = domain.to_lowercase();
    let canonical = lexicon::DOMAIN_ALIASES
        .iter()
        .find_map(|(alias, canonical)| {
            if domain == *alias {
                Some(canonical.to_string())
            } else {
                domain
                    .strip_suffix(alias)
                    .filter(|head| head.ends_with('.'))
                    .map(|head| format!("{}{}", head, canonical))
            }
        })
        .unwrap_or(domain);

    format!("{}@{}", user, canonical)
}

/// メールアドレスのドメイン部（小文字）
pub fn email_domain(email: &str) -> Option<String> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
        .filter(|domain| !domain.is_empty())
}
