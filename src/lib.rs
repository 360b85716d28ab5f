//! label-match
//!
//! 配送ラベルの写真から宛先教員のメールアドレスを特定する。
//! 照合エンジン本体は `label_match_common` にある。

pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod matcher;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod scanner;

pub use label_match_common as common;
