//! # 批量处理模块
//!
//! 提供缺陷文件夹的枚举与并行处理能力。
//!
//! ## 功能
//! - 收集并过滤缺陷文件夹
//! - 并行处理，失败按文件夹隔离
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被各命令模块使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{Folder, FolderCollector};
pub use runner::{BatchResult, BatchRunner, ProcessResult};
