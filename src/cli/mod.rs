//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `apply`: 按修改日志生成缺陷文件夹
//! - `edit`: 批量编辑 INCAR
//! - `diff`: 与参考 INCAR 比较并分组
//! - `check`: 检查输入文件完整性与作业状态
//! - `submit`: 批量提交作业
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: apply, edit, diff, check, submit

pub mod apply;
pub mod check;
pub mod diff;
pub mod edit;
pub mod submit;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// defectprep - 缺陷计算输入批量准备工具
#[derive(Parser)]
#[command(name = "defectprep")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Prepare and cross-check batches of VASP defect calculations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Build defect folders from the reference structure and modification log
    Apply(apply::ApplyArgs),

    /// Batch-edit INCAR tags in every defect folder
    Edit(edit::EditArgs),

    /// Group folders by how their INCAR differs from the reference
    Diff(diff::DiffArgs),

    /// Summarize input files, NELECT, charge and job status per folder
    Check(check::CheckArgs),

    /// Submit every folder's job script to the scheduler
    Submit(submit::SubmitArgs),
}

/// 文件夹选择参数（各子命令共用）
#[derive(Args, Debug, Clone)]
pub struct FolderArgs {
    /// Root directory containing the defect folders
    #[arg(long, env = "DEFECTPREP_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Skip folders whose name starts with this prefix ('' disables)
    #[arg(long, default_value = "z")]
    pub exclude_prefix: String,

    /// Only process folders matching this glob pattern
    #[arg(long)]
    pub pattern: Option<String>,
}

impl FolderArgs {
    /// 相对路径按根目录解析
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// 空字符串表示不忽略任何标签
pub fn ignored_key(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    (!raw.is_empty()).then_some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_relative_to_root() {
        let args = FolderArgs {
            root: PathBuf::from("/data/pbwo4"),
            exclude_prefix: "z".to_string(),
            pattern: None,
        };
        assert_eq!(
            args.resolve(Path::new("z_input/KPOINTS")),
            PathBuf::from("/data/pbwo4/z_input/KPOINTS")
        );
        assert_eq!(args.resolve(Path::new("/abs/POTCAR")), PathBuf::from("/abs/POTCAR"));
    }

    #[test]
    fn test_ignored_key() {
        assert_eq!(ignored_key("NELECT"), Some("NELECT"));
        assert_eq!(ignored_key("  "), None);
    }
}
