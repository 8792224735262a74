//! # check 子命令 CLI 定义
//!
//! 检查各文件夹的输入文件、NELECT、电荷与作业状态
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/check.rs`

use super::FolderArgs;
use clap::Args;
use std::path::PathBuf;

/// check 子命令参数
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub folders: FolderArgs,

    /// Required input files (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "INCAR,POSCAR,KPOINTS,POTCAR,job.justhpc"
    )]
    pub required: Vec<String>,

    /// Omit folders missing more than this many required files
    #[arg(long, default_value_t = 2)]
    pub max_missing: usize,

    /// Also write the summary to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
