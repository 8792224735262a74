//! # VASP 作业状态模型
//!
//! `check` 命令根据 OUTCAR 内容判断每个文件夹的作业状态。
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs` 产生
//! - 被 `commands/check.rs` 使用

use serde::{Deserialize, Serialize};

/// 作业状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    NotStarted,
    Running,
    Finished,
    Failed,
    Unreadable,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::NotStarted => write!(f, "not started"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Unreadable => write!(f, "unreadable"),
        }
    }
}
