//! # edit 子命令 CLI 定义
//!
//! 批量编辑各文件夹的 INCAR
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/edit.rs`

use super::FolderArgs;
use clap::Args;

/// edit 子命令参数
#[derive(Args, Debug)]
pub struct EditArgs {
    #[command(flatten)]
    pub folders: FolderArgs,

    /// Show planned changes without writing files
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, env = "DEFECTPREP_JOBS", default_value_t = 0)]
    pub jobs: usize,

    /// Edit operations, applied in order: KEY=value, -KEY, KEY:old->new
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true, trailing_var_arg = true)]
    pub ops: Vec<String>,
}
