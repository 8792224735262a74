//! # diff 子命令 CLI 定义
//!
//! 与参考 INCAR 比较并按差异分组
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/diff.rs`

use super::FolderArgs;
use clap::Args;
use std::path::PathBuf;

/// diff 子命令参数
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub folders: FolderArgs,

    /// Reference INCAR, relative to --root
    #[arg(long, default_value = "z_input/reference_incar/INCAR")]
    pub reference_incar: PathBuf,

    /// INCAR tag left out of the comparison ('' disables)
    #[arg(long, default_value = "NELECT")]
    pub ignore: String,

    /// Also list the differences shared by every folder
    #[arg(long, default_value_t = false)]
    pub show_shared: bool,

    /// Print a folder-by-tag matrix instead of grouped tables
    #[arg(long, default_value_t = false)]
    pub matrix: bool,

    /// Maximum tag columns per matrix table (0 = fit terminal)
    #[arg(long, default_value_t = 5)]
    pub max_columns: usize,
}
