//! # VASP OUTCAR 状态检测
//!
//! 根据 OUTCAR 末尾的计时信息判断作业状态。
//!
//! ## 依赖关系
//! - 被 `commands/check.rs` 使用
//! - 使用 `models/calculation.rs`

use crate::models::JobStatus;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const TIMING_MARKER: &str = "General timing and accounting";
const FINISHED_MARKER: &str = "Voluntary context switches";

/// 检测文件夹中的作业状态
pub fn detect_job_status(folder: &Path) -> JobStatus {
    let outcar = folder.join("OUTCAR");
    if !outcar.exists() {
        return JobStatus::NotStarted;
    }

    let file = match File::open(&outcar) {
        Ok(f) => f,
        Err(_) => return JobStatus::Unreadable,
    };

    let mut has_timing = false;
    for line in BufReader::new(file).split(b'\n') {
        let line = match line {
            Ok(l) => l,
            Err(_) => return JobStatus::Unreadable,
        };
        let line = String::from_utf8_lossy(&line);

        if line.contains(FINISHED_MARKER) {
            return JobStatus::Finished;
        }
        if line.contains(TIMING_MARKER) {
            has_timing = true;
        }
    }

    if has_timing {
        JobStatus::Failed
    } else {
        JobStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_job_status() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(detect_job_status(dir.path()), JobStatus::NotStarted);

        let outcar = dir.path().join("OUTCAR");
        fs::write(&outcar, " running ionic step 3\n").unwrap();
        assert_eq!(detect_job_status(dir.path()), JobStatus::Running);

        fs::write(&outcar, format!(" {}\n", TIMING_MARKER)).unwrap();
        assert_eq!(detect_job_status(dir.path()), JobStatus::Failed);

        fs::write(
            &outcar,
            format!(" {}\n   {}  :  12\n", TIMING_MARKER, FINISHED_MARKER),
        )
        .unwrap();
        assert_eq!(detect_job_status(dir.path()), JobStatus::Finished);
    }
}
