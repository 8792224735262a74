//! # 统一错误处理模块
//!
//! 定义 defectprep 的所有错误类型，使用 `thiserror` 派生。
//!
//! 所有错误都是以文件夹为单位的：单个缺陷文件夹失败只终止该文件夹的处理，
//! 由批处理器收集后在运行结束时统一报告。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// defectprep 统一错误类型
#[derive(Error, Debug)]
pub enum DefectPrepError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed {format} input: {path}\nReason: {reason}")]
    MalformedInput {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid modification log: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 结构修改错误
    // ─────────────────────────────────────────────────────────────
    #[error("Cannot remove {requested} {element} atom(s): only {available} present")]
    InsufficientAtoms {
        element: String,
        requested: usize,
        available: usize,
    },

    #[error("No placement data for {element}: placed {placed} of {requested} requested atom(s)")]
    InvalidSubstitution {
        element: String,
        requested: usize,
        placed: usize,
    },

    #[error("Element {element} has no valence entry in POTCAR")]
    UnknownElement { element: String },

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl DefectPrepError {
    /// 构造解析错误的快捷方式
    pub fn malformed(
        format: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DefectPrepError::MalformedInput {
            format: format.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// 错误类别名称，用于运行总结
    pub fn kind(&self) -> &'static str {
        match self {
            DefectPrepError::FileReadError { .. } | DefectPrepError::FileWriteError { .. } => {
                "IoError"
            }
            DefectPrepError::DirectoryNotFound { .. } | DefectPrepError::FileNotFound { .. } => {
                "MissingInput"
            }
            DefectPrepError::MalformedInput { .. } | DefectPrepError::JsonError(_) => {
                "MalformedInputError"
            }
            DefectPrepError::InsufficientAtoms { .. } => "InsufficientAtomsError",
            DefectPrepError::InvalidSubstitution { .. } => "InvalidSubstitutionError",
            DefectPrepError::UnknownElement { .. } => "UnknownElementError",
            DefectPrepError::CommandNotFound { .. } | DefectPrepError::CommandFailed { .. } => {
                "CommandError"
            }
            DefectPrepError::InvalidArgument(_) => "InvalidArgument",
            DefectPrepError::CsvError(_) => "CsvError",
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, DefectPrepError>;
