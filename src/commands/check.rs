//! # check 命令实现
//!
//! 汇总各缺陷文件夹的输入完整性、电子数与作业状态。
//!
//! ## 输出列
//! - NELECT: INCAR 中的电子数
//! - ΔQ: POTCAR 价电子总数 − NELECT（即体系电荷）
//! - Atoms / Composition: POSCAR 原子数与组成
//! - Status: 由 OUTCAR 判断的作业状态
//! - Missing: 缺失的必需文件
//!
//! 缺失的值显示为 `—`，文件存在但无法解析时显示为 `err`。
//! 缺失文件超过 `--max-missing` 的文件夹不列出。
//!
//! ## 依赖关系
//! - 使用 `cli/check.rs` 定义的参数
//! - 使用 `parsers/`（incar, poscar, potcar, outcar）
//! - 使用 `tabled` 输出表格, `csv` 导出

use crate::batch::{Folder, FolderCollector};
use crate::cli::check::CheckArgs;
use crate::error::{DefectPrepError, Result};
use crate::models::Crystal;
use crate::parsers::{incar, outcar, poscar, potcar};
use crate::utils::output::{self, DASH};

use serde::Serialize;
use std::path::Path;
use tabled::{Table, Tabled};

/// |ΔQ| 小于此值视为中性
const CHARGE_TOLERANCE: f64 = 1e-2;

/// 文件存在但无法解析
const UNREADABLE: &str = "err";

/// 检查结果行
#[derive(Debug, Clone, Tabled, Serialize)]
struct CheckRow {
    #[tabled(rename = "Folder")]
    folder: String,
    #[tabled(rename = "NELECT")]
    nelect: String,
    #[tabled(rename = "ΔQ")]
    delta_q: String,
    #[tabled(rename = "Atoms")]
    atoms: String,
    #[tabled(rename = "Composition")]
    composition: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Missing")]
    missing: String,
}

/// 执行 check 命令
pub fn execute(args: CheckArgs) -> Result<()> {
    output::print_header("Checking Defect Folders");

    let collected = FolderCollector::new(&args.folders.root)
        .with_pattern(args.folders.pattern.as_deref())?
        .exclude_prefix(&args.folders.exclude_prefix)
        .collect()?;
    for (name, reason) in &collected.skipped {
        output::print_skip(&format!("{} ({})", name, reason));
    }

    let mut rows = Vec::new();
    for folder in &collected.folders {
        let missing = missing_files(&folder.path, &args.required);
        if missing.len() > args.max_missing {
            output::print_skip(&format!(
                "{} (missing {} of {} required files)",
                folder.name,
                missing.len(),
                args.required.len()
            ));
            continue;
        }
        rows.push(check_folder(folder, &missing));
    }

    if rows.is_empty() {
        output::print_warning("No folders to report.");
        return Ok(());
    }

    println!("{}\n", Table::new(&rows));

    if let Some(path) = &args.csv {
        write_csv(path, &rows)?;
        output::print_success(&format!("Summary written to {}", path.display()));
    }

    let charged = rows
        .iter()
        .filter(|r| r.delta_q != DASH && r.delta_q != UNREADABLE && r.delta_q != "+0.00")
        .count();
    let incomplete = rows.iter().filter(|r| r.missing != DASH).count();

    output::print_separator();
    output::print_done(&format!(
        "{} folders checked: {} charged, {} with missing files",
        rows.len(),
        charged,
        incomplete
    ));

    Ok(())
}

/// 列出文件夹中缺失的必需文件
fn missing_files(folder: &Path, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !folder.join(name.as_str()).is_file())
        .cloned()
        .collect()
}

/// 单个输入文件的读取结果
enum Input<T> {
    Missing,
    Unreadable,
    Loaded(T),
}

impl<T> Input<T> {
    fn load(path: &Path, parse: impl FnOnce(&Path) -> Result<T>) -> Self {
        if !path.is_file() {
            return Input::Missing;
        }
        match parse(path) {
            Ok(value) => Input::Loaded(value),
            Err(_) => Input::Unreadable,
        }
    }

    fn is_unreadable(&self) -> bool {
        matches!(self, Input::Unreadable)
    }

    /// 缺失显示 `—`，无法解析显示 `err`
    fn show(&self, f: impl FnOnce(&T) -> String) -> String {
        match self {
            Input::Missing => DASH.to_string(),
            Input::Unreadable => UNREADABLE.to_string(),
            Input::Loaded(value) => f(value),
        }
    }
}

/// 生成单个文件夹的检查行
fn check_folder(folder: &Folder, missing: &[String]) -> CheckRow {
    let params = Input::load(&folder.path.join("INCAR"), incar::parse_incar_file);
    let crystal = Input::load(&folder.path.join("POSCAR"), poscar::parse_poscar_file);
    let valences = Input::load(&folder.path.join("POTCAR"), potcar::parse_potcar_file);

    let nelect = match params {
        Input::Missing => Input::Missing,
        Input::Unreadable => Input::Unreadable,
        Input::Loaded(p) => match p.get("NELECT") {
            None => Input::Missing,
            Some(value) => value.as_f64().map_or(Input::Unreadable, Input::Loaded),
        },
    };

    let delta_q = match (&crystal, &valences, &nelect) {
        (Input::Loaded(c), Input::Loaded(v), Input::Loaded(n)) => match v.total_valence(c) {
            Ok(total) => format_charge(total - n),
            Err(_) => UNREADABLE.to_string(),
        },
        _ if crystal.is_unreadable() || valences.is_unreadable() || nelect.is_unreadable() => {
            UNREADABLE.to_string()
        }
        _ => DASH.to_string(),
    };

    CheckRow {
        folder: folder.name.clone(),
        nelect: nelect.show(|n| format_count(*n)),
        delta_q,
        atoms: crystal.show(|c| c.atoms.len().to_string()),
        composition: crystal.show(Crystal::formula),
        status: outcar::detect_job_status(&folder.path).to_string(),
        missing: if missing.is_empty() {
            DASH.to_string()
        } else {
            missing.join(", ")
        },
    }
}

fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn format_charge(delta: f64) -> String {
    if delta.abs() < CHARGE_TOLERANCE {
        "+0.00".to_string()
    } else {
        format!("{:+.2}", delta)
    }
}

fn write_csv(path: &Path, rows: &[CheckRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| DefectPrepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
