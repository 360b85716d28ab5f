//! 文字列類似度
//!
//! - Jaro-Winkler（共通接頭辞ボーナス付き）
//! - 隣接転置を含む編集距離（OSA）とその比率
//!
//! どちらも `char` 単位で計算する。

/// Jaro-Winkler類似度（0.0〜1.0）
///
/// 同一文字列は1.0、片方だけ空なら0.0。
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let match_distance = (s1.len().max(s2.len()) / 2).saturating_sub(1);
    let mut s1_matches = vec![false; s1.len()];
    let mut s2_matches = vec![false; s2.len()];

    let mut matches = 0usize;
    for (i, c1) in s1.iter().enumerate() {
        let start = i.saturating_sub(match_distance);
        let end = (i + match_distance + 1).min(s2.len());
        for j in start..end {
            if s2_matches[j] || *c1 != s2[j] {
                continue;
            }
            s1_matches[i] = true;
            s2_matches[j] = true;
            matches += 1;
            break;
        }
    }
    if matches == 0 {
        return 0.0;
    }

    // 転置数（不一致ペア数の半分）
    let mut transpositions = 0.0;
    let mut k = 0;
    for (i, c1) in s1.iter().enumerate() {
        if !s1_matches[i] {
            continue;
        }
        while !s2_matches[k] {
            k += 1;
        }
        if *c1 != s2[k] {
            transpositions += 1.0;
        }
        k += 1;
    }
    transpositions /= 2.0;

    let m = matches as f64;
    let jaro = (m / s1.len() as f64 + m / s2.len() as f64 + (m - transpositions) / m) / 3.0;

    let max_prefix = 4.min(s1.len()).min(s2.len());
    let prefix = s1
        .iter()
        .zip(s2.iter())
        .take(max_prefix)
        .take_while(|(x, y)| x == y)
        .count();

    jaro + 0.1 * prefix as f64 * (1.0 - jaro)
}

/// 編集距離の比率 `1 - d / max(1, max(len))`
///
/// 空同士は1.0、片方だけ空なら0.0。
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let distance = levenshtein_distance(a, b);
    let max_len = a.chars().count().max(b.chars().count()).max(1);

    1.0 - (distance as f64 / max_len as f64)
}

/// 隣接転置を許す編集距離（Optimal String Alignment）
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b_len {
        matrix[0][j] = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);

            if i > 1
                && j > 1
                && a_chars[i - 1] == b_chars[j - 2]
                && a_chars[i - 2] == b_chars[j - 1]
            {
                matrix[i][j] = matrix[i][j].min(matrix[i - 2][j - 2] + 1);
            }
        }
    }

    matrix[a_len][b_len]
}
