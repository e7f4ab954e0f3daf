//! Recipe Gallery CLI
//!
//! 共通ライブラリの状態機械を仮想スケジューラ上で動かす開発用ツール

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod render;
