//! # submit 命令实现
//!
//! 在每个缺陷文件夹中调用调度器提交作业脚本。
//!
//! ## 功能
//! - 跳过以排除前缀开头或没有作业脚本的文件夹
//! - 单个文件夹提交失败时继续处理其余文件夹
//! - `--dry-run` 只列出将要提交的文件夹
//!
//! ## 依赖关系
//! - 使用 `cli/submit.rs` 定义的参数
//! - 使用 `batch/collector.rs`, `utils/slurm.rs`, `utils/output.rs`

use crate::batch::{BatchResult, Folder, FolderCollector, ProcessResult};
use crate::cli::submit::SubmitArgs;
use crate::error::Result;
use crate::utils::{output, slurm};

/// 执行 submit 命令
pub fn execute(args: SubmitArgs) -> Result<()> {
    output::print_header("Batch Job Submission");

    let collected = FolderCollector::new(&args.folders.root)
        .with_pattern(args.folders.pattern.as_deref())?
        .exclude_prefix(&args.folders.exclude_prefix)
        .require_file(&args.job_file)
        .collect()?;
    for (name, reason) in &collected.skipped {
        output::print_skip(&format!("{} ({})", name, reason));
    }

    if collected.folders.is_empty() {
        output::print_warning(&format!("No folders with {} found.", args.job_file));
        return Ok(());
    }

    let result = submit_all(&collected.folders, &args.scheduler, &args.job_file, args.dry_run);

    output::print_separator();
    if args.dry_run {
        output::print_warning("(DRY RUN: nothing submitted)");
    }
    output::print_done(&format!(
        "{} submitted, {} failed",
        result.successes.len(),
        result.failures.len()
    ));

    Ok(())
}

/// 按顺序逐个提交，调度器输出随提交打印
fn submit_all(folders: &[Folder], scheduler: &str, job_file: &str, dry_run: bool) -> BatchResult {
    let mut result = BatchResult::default();

    for folder in folders {
        let outcome = if dry_run {
            ProcessResult::Success(
                folder.name.clone(),
                format!("would run: {} {}", scheduler, job_file),
            )
        } else {
            ProcessResult::from_result(
                &folder.name,
                slurm::submit_job(scheduler, job_file, &folder.path),
            )
        };

        match &outcome {
            ProcessResult::Success(name, detail) => {
                output::print_success(&format!("{:<25} {}", name, detail))
            }
            ProcessResult::Skipped(name, reason) => {
                output::print_skip(&format!("{:<25} {}", name, reason))
            }
            ProcessResult::Failed(name, kind, msg) => {
                output::print_failure(name, kind, msg)
            }
        }
        result.merge(outcome);
    }

    result
}
