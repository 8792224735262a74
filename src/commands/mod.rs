//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `engine/`, `parsers/`, `batch/`, `utils/`
//! - 子模块: apply, edit, diff, check, submit

pub mod apply;
pub mod check;
pub mod diff;
pub mod edit;
pub mod submit;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Apply(args) => apply::execute(args),
        Commands::Edit(args) => edit::execute(args),
        Commands::Diff(args) => diff::execute(args),
        Commands::Check(args) => check::execute(args),
        Commands::Submit(args) => submit::execute(args),
    }
}
