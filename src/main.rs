//! # defectprep - 缺陷计算输入批量准备工具
//!
//! 由同一参考结构批量生成 VASP 缺陷计算文件夹，并检查各文件夹输入的一致性。
//!
//! ## 子命令
//! - `apply`  - 按修改日志生成缺陷文件夹（替换/空位、电荷、NELECT）
//! - `edit`   - 批量编辑 INCAR 标签
//! - `diff`   - 与参考 INCAR 比较并按差异分组
//! - `check`  - 检查输入文件、电荷与作业状态
//! - `submit` - 批量提交作业到 Slurm
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── engine/    (结构修改、INCAR 编辑与比较)
//!   │     ├── parsers/   (POSCAR/INCAR/POTCAR/OUTCAR)
//!   │     ├── batch/     (文件夹收集与并行处理)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出、进度条、Slurm)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod engine;
mod error;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
