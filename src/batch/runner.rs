//! # 批量执行器
//!
//! 并行处理各个文件夹，单个文件夹失败不影响其他文件夹。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代，结果保持输入顺序
//! - 进度条显示
//! - 错误收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/apply.rs`, `commands/edit.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{DefectPrepError, Result};
use crate::utils::progress;

use rayon::prelude::*;

/// 单个文件夹处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessResult {
    /// 处理成功 (文件夹, 说明)
    Success(String, String),
    /// 跳过 (文件夹, 原因)
    Skipped(String, String),
    /// 处理失败 (文件夹, 错误类别, 错误信息)
    Failed(String, String, String),
}

impl ProcessResult {
    /// 由处理函数的返回值构造
    pub fn from_result(name: &str, result: Result<String>) -> Self {
        match result {
            Ok(detail) => ProcessResult::Success(name.to_string(), detail),
            Err(e) => ProcessResult::Failed(name.to_string(), e.kind().to_string(), e.to_string()),
        }
    }
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功详情 (文件夹, 说明)
    pub successes: Vec<(String, String)>,
    /// 跳过详情 (文件夹, 原因)
    pub skips: Vec<(String, String)>,
    /// 失败详情 (文件夹, 错误类别, 错误信息)
    pub failures: Vec<(String, String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(name, detail) => self.successes.push((name, detail)),
            ProcessResult::Skipped(name, reason) => self.skips.push((name, reason)),
            ProcessResult::Failed(name, kind, msg) => self.failures.push((name, kind, msg)),
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.successes.len() + self.skips.len() + self.failures.len()
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器（0 表示使用全部核心）
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行处理条目列表
    pub fn run<T, F>(&self, items: &[T], message: &str, processor: F) -> Result<BatchResult>
    where
        T: Sync,
        F: Fn(&T) -> ProcessResult + Sync + Send,
    {
        let pb = progress::create_progress_bar(items.len() as u64, message);

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| DefectPrepError::InvalidArgument(format!("thread pool: {}", e)))?;

        let results: Vec<ProcessResult> = pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let result = processor(item);
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();

        // 汇总结果
        let mut batch_result = BatchResult::default();
        for result in results {
            batch_result.merge(result);
        }

        Ok(batch_result)
    }
}
