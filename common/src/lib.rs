//! Label Match Common Library
//!
//! CLIとサービス層で共有される照合エンジン（正規化・類似度・スコアリング）

pub mod directory;
pub mod error;
pub mod matcher;
pub mod similarity;
pub mod text;
pub mod types;

pub use directory::{split_full_name, Directory, DirectoryEntry};
pub use error::{Error, Result};
pub use matcher::{match_snapshot, ACCEPT_THRESHOLD, WEAK_ACCEPT_THRESHOLD};
pub use similarity::{jaro_winkler, levenshtein_distance, levenshtein_ratio};
pub use text::{clean_name_like, normalize, normalize_domain};
pub use text::candidates::{extract_email_candidates, extract_name_candidates};
pub use text::noise::prefer_top_lines;
pub use types::{LabelText, MatchKind, MatchOutcome, NameCandidate, RecognizedText};
