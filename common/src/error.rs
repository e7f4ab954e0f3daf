//! エラー型定義

use thiserror::Error;

/// ファイル選択時の検証エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Only image files are accepted (got \"{mime_type}\")")]
    UnsupportedType { mime_type: String },

    #[error("This file is too large ({size} bytes). Maximum {max} bytes please.")]
    TooLarge { size: u64, max: u64 },
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("The recipe could not be saved: {0}")]
    SimulatedSaveFailure(String),

    #[error("Cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    #[error("There is no generated recipe to accept")]
    NoGeneratedRecipe,

    #[error("Upload session was closed before the operation finished")]
    StaleSession,

    #[error("Duplicate recipe id: {0}")]
    DuplicateId(String),

    #[error("Image reference error: {0}")]
    ImageRef(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
