//! # Slurm 作业脚本工具
//!
//! 为每个缺陷文件夹改写作业名，并调用调度器提交作业。
//!
//! ## 依赖关系
//! - 被 `commands/apply.rs`, `commands/submit.rs` 使用
//! - 使用 `regex` crate

use crate::error::{DefectPrepError, Result};
use regex::Regex;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

fn job_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^(\s*#SBATCH\s+)(?:--job-name(?:=|\s+)|-J\s*)\S+.*$")
            .expect("job-name regex is valid")
    })
}

/// 改写作业脚本中的作业名
///
/// 替换所有 `#SBATCH --job-name=...` 与 `#SBATCH -J ...` 行；
/// 没有作业名行时原样返回。
pub fn stamp_job_name(script: &str, job_name: &str) -> String {
    job_name_pattern()
        .replace_all(script, |caps: &regex::Captures| {
            format!("{}--job-name={}", &caps[1], job_name)
        })
        .into_owned()
}

/// 在文件夹中提交作业脚本，返回调度器的标准输出
pub fn submit_job(scheduler: &str, job_file: &str, workdir: &Path) -> Result<String> {
    let output = Command::new(scheduler)
        .arg(job_file)
        .current_dir(workdir)
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DefectPrepError::CommandNotFound {
                command: scheduler.to_string(),
            },
            _ => DefectPrepError::CommandFailed {
                command: format!("{} {}", scheduler, job_file),
                stderr: e.to_string(),
            },
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(DefectPrepError::CommandFailed {
            command: format!("{} {}", scheduler, job_file),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
