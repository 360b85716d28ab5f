//! ラベル行のノイズ判定
//!
//! 宛名はラベル上部に来ることが多いため、上位行からノイズ行
//! （郵便番号・電話番号・追跡番号・注文番号・配送キーワード）を除いた
//! 名前行をスコアの加点対象として使う。

use super::clean_name_like;
use regex::Regex;
use std::collections::HashSet;

/// 加点対象として見る上位行の数
pub const TOP_LINE_LIMIT: usize = 8;

lazy_static::lazy_static! {
    // LL11 2AW など
    static ref UK_POSTCODE: Regex =
        Regex::new(r"(?i)\b[A-Z]{1,2}\d{1,2}[A-Z]?\s*\d[A-Z]{2}\b").unwrap();
    static ref PHONE: Regex = Regex::new(r"\+?\d[\d\s\-()]{6,}").unwrap();
    static ref TRACKING: Regex = Regex::new(
        r"(?i)\b(1Z[0-9A-Z]{16}|TBA[0-9A-Z]+|[A-Z]{2}\d{9}GB|\d{12}|\d{14}|\d{15}|\d{20}|\d{22})\b"
    )
    .unwrap();
    static ref ORDER_LIKE: Regex = Regex::new(
        r"(?i)\b(order|po|p/o|invoice|ref|reference|consignment|shipment|track|id|no\.?)\s*[:#]?\s*[A-Z0-9\-]{4,}\b"
    )
    .unwrap();
    static ref SHIP_WORDS: Regex = Regex::new(
        r"(?i)\b(ship\s*to|ship\s*from|delivery|address|dept|department|school|building|room)\b"
    )
    .unwrap();
    static ref MOSTLY_DIGITS: Regex = Regex::new(r"^\s*[\d\W]{6,}\s*$").unwrap();
}

/// 名前以外の情報行か判定
pub fn is_noise_line(line: &str) -> bool {
    let s = line.trim();
    if s.is_empty() {
        return true;
    }

    UK_POSTCODE.is_match(s)
        || PHONE.is_match(s)
        || TRACKING.is_match(s)
        || ORDER_LIKE.is_match(s)
        || SHIP_WORDS.is_match(s)
        || MOSTLY_DIGITS.is_match(s)
}

/// 上位行から加点用の名前集合を作る
///
/// 空行を除いた先頭8行からノイズ行を捨て、`clean_name_like` で整形し、
/// 空文字を除いて重複を除く（出現順）。フィルタではなく加点にのみ使う。
pub fn prefer_top_lines(lines: Option<&[String]>) -> Vec<String> {
    let Some(lines) = lines else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .take(TOP_LINE_LIMIT)
        .filter(|l| !is_noise_line(l))
        .map(|l| clean_name_like(l))
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .collect()
}
