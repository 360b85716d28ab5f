//! 固定の語彙テーブル（敬称・住所ストップワード・愛称）
//!
//! プロセス全体で共有する不変データ。

use std::collections::{HashMap, HashSet};

lazy_static::lazy_static! {
    /// 敬称
    pub static ref TITLES: HashSet<&'static str> = [
        "mr", "mrs", "ms", "miss", "dr", "prof", "professor", "sir", "madam", "fr", "sr", "jr",
    ]
    .into_iter()
    .collect();

    /// スコア加点対象の学術敬称
    pub static ref ACADEMIC_TITLES: HashSet<&'static str> =
        ["dr", "prof", "professor"].into_iter().collect();

    /// 住所・部署などのノイズ語
    pub static ref ADDRESS_STOPWORDS: HashSet<&'static str> = [
        // 通り
        "road", "rd", "street", "st", "lane", "ln", "avenue", "ave", "way", "close", "cl",
        "drive", "dr",
        // 地名・郵便番号
        "mold", "wrexham", "united", "kingdom", "uk", "ll", "ll11", "ll12", "2aw",
        "post", "code", "postcode",
        // 連絡先・建物
        "phone", "telefon", "tel", "department", "school", "building", "room",
    ]
    .into_iter()
    .collect();

    /// 愛称 → 正式名
    pub static ref NICKNAMES: HashMap<&'static str, &'static str> = [
        ("dan", "daniel"),
        ("danny", "daniel"),
        ("mike", "michael"),
        ("matt", "matthew"),
        ("tom", "thomas"),
        ("nick", "nicholas"),
        ("alex", "alexander"),
        ("andy", "andrew"),
        ("kate", "katherine"),
        ("katy", "katherine"),
        ("beth", "elizabeth"),
        ("liz", "elizabeth"),
    ]
    .into_iter()
    .collect();

    /// 旧ドメイン → 正規ドメイン
    pub static ref DOMAIN_ALIASES: HashMap<&'static str, &'static str> = [
        ("glyndwr.ac.uk", "wrexham.ac.uk"),
        ("wrexhamglyndwr.ac.uk", "wrexham.ac.uk"),
    ]
    .into_iter()
    .collect();
}

/// 敬称または住所ノイズ語か（末尾のドットは無視）
pub fn is_stopword(token: &str) -> bool {
    let token = token.trim_end_matches('.');
    TITLES.contains(token) || ADDRESS_STOPWORDS.contains(token)
}

/// スコア加点対象の敬称か
pub fn is_academic_title(token: &str) -> bool {
    ACADEMIC_TITLES.contains(token.trim_end_matches('.'))
}

/// 愛称を正式名に置換
pub fn canonical_name(token: &str) -> &str {
    NICKNAMES.get(token).copied().unwrap_or(token)
}
