//! # diff 命令实现
//!
//! 将各文件夹的 INCAR 与参考 INCAR 比较，按差异签名分组输出。
//!
//! ## 功能
//! - 分组视图：每组列出文件夹名与 (标签, 参考值, 文件夹值) 表
//! - 矩阵视图 (`--matrix`)：文件夹 × 标签，宽表按列分块
//! - 所有文件夹共有的差异与忽略标签不显示
//!
//! ## 依赖关系
//! - 使用 `cli/diff.rs` 定义的参数
//! - 使用 `engine/diff.rs`, `parsers/incar.rs`
//! - 使用 `utils/output.rs`

use crate::batch::{Folder, FolderCollector};
use crate::cli::diff::DiffArgs;
use crate::cli::ignored_key;
use crate::engine::{diff_parameters, DiffEntry, DiffReport};
use crate::error::{DefectPrepError, Result};
use crate::models::{ParamValue, ParameterSet};
use crate::parsers::incar;
use crate::utils::output::{self, DASH};

use std::path::Path;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

/// 差异表格行
#[derive(Debug, Clone, Tabled)]
struct DiffRow {
    #[tabled(rename = "Tag")]
    key: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Folder")]
    folder: String,
}

impl From<&DiffEntry> for DiffRow {
    fn from(entry: &DiffEntry) -> Self {
        DiffRow {
            key: entry.key.clone(),
            reference: show(entry.reference.as_ref()),
            folder: show(entry.folder.as_ref()),
        }
    }
}

fn show(value: Option<&ParamValue>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| DASH.to_string())
}

/// 执行 diff 命令
pub fn execute(args: DiffArgs) -> Result<()> {
    output::print_header("Comparing INCAR Files");

    let reference_path = args.folders.resolve(&args.reference_incar);
    let reference = load_reference(&reference_path)?;
    if reference.is_empty() {
        output::print_warning(&format!("Reference INCAR {} has no tags", reference_path.display()));
    }

    let collected = FolderCollector::new(&args.folders.root)
        .with_pattern(args.folders.pattern.as_deref())?
        .exclude_prefix(&args.folders.exclude_prefix)
        .require_file("INCAR")
        .collect()?;

    if collected.folders.is_empty() {
        output::print_warning("No folders with an INCAR found.");
        return Ok(());
    }

    let (folders, failures) = load_folder_incars(&collected.folders);
    for (name, err) in &failures {
        output::print_error(&format!("{}: {}", name, err));
    }

    output::print_info(&format!(
        "Comparing {} folders against {} ({} tags)",
        folders.len(),
        reference_path.display(),
        reference.len()
    ));

    let report = diff_parameters(&reference, &folders, ignored_key(&args.ignore));

    if args.matrix {
        let names: Vec<&str> = folders.iter().map(|(n, _)| n.as_str()).collect();
        let max_columns = if args.max_columns == 0 {
            fit_columns(&names)
        } else {
            args.max_columns
        };
        render_matrix(&report, &names, max_columns);
    } else {
        render_report(&report, args.show_shared);
    }

    output::print_separator();
    output::print_done(&format!(
        "{} folders in {} group(s), {} unreadable",
        folders.len(),
        report.groups.len(),
        failures.len()
    ));

    Ok(())
}

/// 读取参考 INCAR
pub fn load_reference(path: &Path) -> Result<ParameterSet> {
    if !path.is_file() {
        return Err(DefectPrepError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    incar::parse_incar_file(path)
}

/// 读取各文件夹 INCAR；解析失败的文件夹单独返回
pub fn load_folder_incars(folders: &[Folder]) -> (Vec<(String, ParameterSet)>, Vec<(String, DefectPrepError)>) {
    let mut loaded = Vec::new();
    let mut failures = Vec::new();

    for folder in folders {
        match incar::parse_incar_file(&folder.path.join("INCAR")) {
            Ok(params) => loaded.push((folder.name.clone(), params)),
            Err(e) => failures.push((folder.name.clone(), e)),
        }
    }

    (loaded, failures)
}

/// 分组视图
pub fn render_report(report: &DiffReport, show_shared: bool) {
    for group in &report.groups {
        let names = group.folders.join(", ");
        if group.matches_reference() {
            output::print_success(&format!(
                "{} folder(s) match the reference: {}",
                group.folders.len(),
                names
            ));
            continue;
        }

        output::print_warning(&format!(
            "{} folder(s) differ in {} tag(s): {}",
            group.folders.len(),
            group.signature.len(),
            names
        ));
        let rows: Vec<DiffRow> = group.signature.iter().map(DiffRow::from).collect();
        println!("{}\n", Table::new(&rows));
    }

    if !report.shared.is_empty() {
        output::print_info(&format!(
            "{} difference(s) shared by every folder not shown{}",
            report.shared.len(),
            if show_shared { ":" } else { " (use --show-shared)" }
        ));
        if show_shared {
            let rows: Vec<DiffRow> = report.shared.iter().map(DiffRow::from).collect();
            println!("{}\n", Table::new(&rows));
        }
    }
}

/// 矩阵视图：每行一个文件夹，每列一个差异标签，显示文件夹中的值
pub fn render_matrix(report: &DiffReport, folders: &[&str], max_columns: usize) {
    let keys = report.keys();
    if keys.is_empty() {
        output::print_success("All folders match the reference.");
        return;
    }

    for chunk in keys.chunks(max_columns.max(1)) {
        let mut builder = Builder::default();

        let mut header = vec!["FOLDER".to_string()];
        header.extend(chunk.iter().map(|k| k.to_string()));
        builder.push_record(header);

        for name in folders {
            let signature = report
                .group_of(name)
                .map(|g| g.signature.as_slice())
                .unwrap_or(&[]);
            let mut row = vec![name.to_string()];
            for key in chunk {
                let cell = signature
                    .iter()
                    .find(|e| e.key == *key)
                    .map(|e| show(e.folder.as_ref()))
                    .unwrap_or_else(|| DASH.to_string());
                row.push(cell);
            }
            builder.push_record(row);
        }

        println!("{}\n", builder.build());
    }
}

/// 按终端宽度估算每块列数
fn fit_columns(names: &[&str]) -> usize {
    let name_width = names.iter().map(|n| n.len()).max().unwrap_or(6) + 4;
    let available = output::terminal_width().saturating_sub(name_width);
    (available / 14).max(1)
}
