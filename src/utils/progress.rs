//! # 进度条工具
//!
//! 封装 `indicatif`，批量处理文件夹时显示进度。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 使用
//! - 使用 `indicatif` crate

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const FOLDER_TEMPLATE: &str =
    "{spinner:.green} {msg:<10} [{bar:40.cyan/blue}] {pos}/{len} folders ({elapsed_precise})";

/// 创建文件夹计数进度条；单个文件夹时不绘制
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if len <= 1 {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    let style = ProgressStyle::with_template(FOLDER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
