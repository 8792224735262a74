//! # edit 命令实现
//!
//! 对所有缺陷文件夹的 INCAR 按顺序应用编辑操作。
//!
//! ## 功能
//! - `KEY=value` 设置，`-KEY` 删除，`KEY:old->new` 文本替换
//! - 只打印实际发生的修改
//! - `--dry-run` 只显示修改计划，不写文件
//!
//! ## 依赖关系
//! - 使用 `cli/edit.rs` 定义的参数
//! - 使用 `engine/editor.rs`, `parsers/incar.rs`, `batch/`

use crate::batch::{BatchRunner, Folder, FolderCollector, ProcessResult};
use crate::cli::edit::EditArgs;
use crate::engine::{apply_edits, Change, EditOp};
use crate::error::Result;
use crate::models::ParamValue;
use crate::parsers::incar;
use crate::utils::output::{self, DASH};

use std::collections::BTreeMap;
use std::sync::Mutex;

/// 执行 edit 命令
pub fn execute(args: EditArgs) -> Result<()> {
    output::print_header("Editing INCAR Files");

    let ops = args
        .ops
        .iter()
        .map(|s| s.parse())
        .collect::<Result<Vec<EditOp>>>()?;
    for op in &ops {
        output::print_info(&format!("Operation: {}", op));
    }

    let collected = FolderCollector::new(&args.folders.root)
        .with_pattern(args.folders.pattern.as_deref())?
        .exclude_prefix(&args.folders.exclude_prefix)
        .require_file("INCAR")
        .collect()?;
    for (name, reason) in &collected.skipped {
        output::print_skip(&format!("{} ({})", name, reason));
    }
    if collected.folders.is_empty() {
        output::print_warning("No folders with an INCAR found.");
        return Ok(());
    }

    let changes: Mutex<BTreeMap<String, Vec<Change>>> = Mutex::new(BTreeMap::new());
    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(&collected.folders, "Editing", |folder| {
        match edit_folder(folder, &ops, args.dry_run) {
            Ok(folder_changes) if folder_changes.is_empty() => {
                ProcessResult::Skipped(folder.name.clone(), "no changes".to_string())
            }
            Ok(folder_changes) => {
                let summary = format!("{} change(s)", folder_changes.len());
                if let Ok(mut all) = changes.lock() {
                    all.insert(folder.name.clone(), folder_changes);
                }
                ProcessResult::Success(folder.name.clone(), summary)
            }
            Err(e) => ProcessResult::from_result(&folder.name, Err(e)),
        }
    })?;

    // 按文件夹顺序打印修改
    let changes = changes.into_inner().unwrap_or_default();
    for (name, folder_changes) in &changes {
        for change in folder_changes {
            output::print_change(
                name,
                &change.key,
                &show(change.before.as_ref()),
                &show(change.after.as_ref()),
            );
        }
    }
    for (name, kind, msg) in &result.failures {
        output::print_failure(name, kind, msg);
    }

    output::print_separator();
    if args.dry_run {
        output::print_warning("(DRY RUN: no files written)");
    }
    output::print_done(&format!(
        "{} of {} folders changed, {} failed",
        result.successes.len(),
        result.total(),
        result.failures.len()
    ));

    Ok(())
}

fn show(value: Option<&ParamValue>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| DASH.to_string())
}

/// 编辑单个文件夹的 INCAR；没有修改时不重写文件
fn edit_folder(folder: &Folder, ops: &[EditOp], dry_run: bool) -> Result<Vec<Change>> {
    let path = folder.path.join("INCAR");
    let mut params = incar::parse_incar_file(&path)?;
    let changes = apply_edits(ops, &mut params);

    if !dry_run && !changes.is_empty() {
        incar::write_incar_file(&path, &params)?;
    }

    Ok(changes)
}
