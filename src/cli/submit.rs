//! # submit 子命令 CLI 定义
//!
//! 将各文件夹的作业脚本提交到调度器
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/submit.rs`

use super::FolderArgs;
use clap::Args;

/// submit 子命令参数
#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub folders: FolderArgs,

    /// Job script name inside each folder
    #[arg(long, default_value = "job.justhpc")]
    pub job_file: String,

    /// Scheduler submission command
    #[arg(long, env = "DEFECTPREP_SCHEDULER", default_value = "sbatch")]
    pub scheduler: String,

    /// List what would be submitted without submitting
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
