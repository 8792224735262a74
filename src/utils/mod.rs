//! # 工具函数模块
//!
//! 提供美化输出、进度条、Slurm 作业脚本处理等工具。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `batch/` 模块使用
//! - 子模块: output, progress, slurm

pub mod output;
pub mod progress;
pub mod slurm;
