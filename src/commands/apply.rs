//! # apply 命令实现
//!
//! 由参考结构和修改日志生成缺陷文件夹。
//!
//! ## 每个文件夹的流程
//! 1. 选择模板目录，读取 POTCAR 价电子表
//! 2. 对参考结构（可选超胞）应用修改，计算 NELECT
//! 3. 写 POSCAR，复制 POTCAR 与 KPOINTS
//! 4. 编辑模板 INCAR，写入 NELECT
//! 5. 复制作业脚本并改写作业名
//!
//! 文件夹并行处理，失败互不影响；结束时汇总结果并输出与参考 INCAR 的比较。
//!
//! ## 依赖关系
//! - 使用 `cli/apply.rs` 定义的参数
//! - 使用 `engine/`, `parsers/`, `batch/`
//! - 使用 `utils/output.rs`, `utils/slurm.rs`

use crate::batch::{BatchResult, BatchRunner, Folder, ProcessResult};
use crate::cli::apply::ApplyArgs;
use crate::cli::ignored_key;
use crate::commands::diff;
use crate::engine::{apply_edits, apply_modification, diff_parameters, EditOp};
use crate::error::{DefectPrepError, Result};
use crate::models::modification::load_modification_log;
use crate::models::{Crystal, ModificationSpec};
use crate::parsers::{incar, poscar, potcar, ValenceTable};
use crate::utils::{output, slurm};

use glob::Pattern;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 所有文件夹共享的只读输入
struct BuildContext<'a> {
    root: &'a Path,
    input_dir: PathBuf,
    default_template: Option<&'a str>,
    template_for: BTreeMap<String, String>,
    kpoints: &'a str,
    job_file: &'a str,
    species_order: &'a [String],
    edits: Vec<EditOp>,
    reference: Crystal,
}

/// 执行 apply 命令
pub fn execute(args: ApplyArgs) -> Result<()> {
    output::print_header("Building Defect Folders");

    let root = &args.folders.root;
    if !root.is_dir() {
        return Err(DefectPrepError::DirectoryNotFound {
            path: root.display().to_string(),
        });
    }

    let supercell = supercell_factors(&args.supercell)?;
    let edits = args
        .edits
        .iter()
        .map(|s| s.parse())
        .collect::<Result<Vec<EditOp>>>()?;
    let template_for = template_mapping(&args.template_for)?;

    // 读取参考结构与修改日志
    let reference_path = args.folders.resolve(&args.reference);
    let unit_cell = poscar::parse_poscar_file(&reference_path)?;
    let reference = unit_cell.supercell(supercell);
    output::print_info(&format!(
        "Reference: {} ({} atoms, supercell {}x{}x{})",
        reference.formula(),
        reference.atoms.len(),
        supercell[0],
        supercell[1],
        supercell[2]
    ));

    let log = load_modification_log(&args.folders.resolve(&args.modifications))?;
    let selected = select_folders(&log, &args.folders.exclude_prefix, args.folders.pattern.as_deref())?;
    if selected.is_empty() {
        output::print_warning("No folders selected from the modification log.");
        return Ok(());
    }
    output::print_info(&format!(
        "Building {} of {} folders from the modification log",
        selected.len(),
        log.len()
    ));

    let ctx = BuildContext {
        root,
        input_dir: args.folders.resolve(&args.input_dir),
        default_template: args.default_template.as_deref(),
        template_for,
        kpoints: &args.kpoints,
        job_file: &args.job_file,
        species_order: &args.species_order,
        edits,
        reference,
    };

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(&selected, "Building", |(name, spec)| {
        ProcessResult::from_result(name, build_folder(&ctx, name, spec))
    })?;

    print_summary(&result);

    // 与参考 INCAR 比较已完成的文件夹
    let reference_incar = args.folders.resolve(&args.reference_incar);
    if reference_incar.is_file() && !result.successes.is_empty() {
        report_differences(root, &reference_incar, &result.successes, ignored_key(&args.ignore))?;
    } else if !reference_incar.is_file() {
        output::print_warning(&format!(
            "No reference INCAR at {}, skipping diff report",
            reference_incar.display()
        ));
    }

    output::print_separator();
    output::print_done(&format!(
        "Processed {} folders: {} built, {} failed",
        result.total(),
        result.successes.len(),
        result.failures.len()
    ));

    Ok(())
}

/// 比较已生成的文件夹与参考 INCAR，返回无法读取的文件夹数
fn report_differences(
    root: &Path,
    reference_incar: &Path,
    built: &[(String, String)],
    ignore: Option<&str>,
) -> Result<usize> {
    let reference = diff::load_reference(reference_incar)?;
    let completed: Vec<Folder> = built
        .iter()
        .map(|(name, _)| Folder {
            name: name.clone(),
            path: root.join(name),
        })
        .collect();
    let (folders, failures) = diff::load_folder_incars(&completed);
    for (name, err) in &failures {
        output::print_error(&format!("{}: {}", name, err));
    }

    output::print_header("INCAR Differences");
    let report = diff_parameters(&reference, &folders, ignore);
    diff::render_report(&report, false);
    Ok(failures.len())
}

fn supercell_factors(values: &[usize]) -> Result<[usize; 3]> {
    match values {
        &[x, y, z] if x > 0 && y > 0 && z > 0 => Ok([x, y, z]),
        _ => Err(DefectPrepError::InvalidArgument(format!(
            "supercell needs three positive integers, got {:?}",
            values
        ))),
    }
}

/// 按排除前缀与名称模式筛选修改日志中的文件夹
fn select_folders<'a>(
    log: &'a crate::models::ModificationLog,
    exclude_prefix: &str,
    pattern: Option<&str>,
) -> Result<Vec<(&'a str, &'a ModificationSpec)>> {
    let pattern = pattern
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                DefectPrepError::InvalidArgument(format!("invalid pattern '{}': {}", p, e))
            })
        })
        .transpose()?;

    let mut selected = Vec::new();
    for (name, spec) in log {
        if !exclude_prefix.is_empty() && name.starts_with(exclude_prefix) {
            output::print_skip(&format!("{} (starts with '{}')", name, exclude_prefix));
            continue;
        }
        if pattern.as_ref().is_some_and(|p| !p.matches(name)) {
            continue;
        }
        selected.push((name.as_str(), spec));
    }
    Ok(selected)
}

/// 生成单个缺陷文件夹，返回摘要
fn build_folder(ctx: &BuildContext, name: &str, spec: &ModificationSpec) -> Result<String> {
    let template_dir = match template_name(ctx, spec) {
        Some(template) => ctx.input_dir.join(template),
        None => ctx.input_dir.clone(),
    };
    let incar_src = require_file(template_dir.join("INCAR"))?;
    let potcar_src = require_file(template_dir.join("POTCAR"))?;
    let kpoints_src = require_file(ctx.input_dir.join(ctx.kpoints))?;
    let job_src = require_file(ctx.input_dir.join(ctx.job_file))?;

    let valence = potcar::parse_potcar_file(&potcar_src)?;
    let (mut crystal, nelect) = apply_modification(&ctx.reference, spec, &valence)?;
    if ctx.species_order.is_empty() {
        let order: Vec<String> = valence.elements().map(str::to_string).collect();
        crystal.sort_by_species(&order);
    } else {
        crystal.sort_by_species(ctx.species_order);
    }
    ensure_potcar_order(&crystal, &valence, &potcar_src)?;
    crystal.name = name.to_string();

    let mut params = incar::parse_incar_file(&incar_src)?;
    let job_script = fs::read_to_string(&job_src).map_err(|e| DefectPrepError::FileReadError {
        path: job_src.display().to_string(),
        source: e,
    })?;

    // 所有输入校验通过后才写文件夹
    let folder = ctx.root.join(name);
    fs::create_dir_all(&folder).map_err(|e| DefectPrepError::FileWriteError {
        path: folder.display().to_string(),
        source: e,
    })?;

    poscar::write_poscar_file(&folder.join("POSCAR"), &crystal)?;
    copy_file(&potcar_src, &folder.join("POTCAR"))?;
    copy_file(&kpoints_src, &folder.join("KPOINTS"))?;

    apply_edits(&ctx.edits, &mut params);
    params.set("NELECT", nelect);
    incar::write_incar_file(&folder.join("INCAR"), &params)?;

    let job_dst = folder.join(ctx.job_file);
    fs::write(&job_dst, slurm::stamp_job_name(&job_script, name)).map_err(|e| {
        DefectPrepError::FileWriteError {
            path: job_dst.display().to_string(),
            source: e,
        }
    })?;

    Ok(format!("{} (NELECT = {})", crystal.formula(), nelect))
}

/// 模板目录：修改日志中的 `template`，其次按插入元素的 `--template-for`，最后 `--default-template`
fn template_name<'a>(ctx: &'a BuildContext, spec: &'a ModificationSpec) -> Option<&'a str> {
    spec.template.as_deref()
        .or_else(|| {
            spec.delta
                .iter()
                .filter(|&(_, &n)| n > 0)
                .find_map(|(element, _)| ctx.template_for.get(element).map(String::as_str))
        })
        .or(ctx.default_template)
}

/// 解析 `ELEMENT=DIR` 映射
fn template_mapping(entries: &[String]) -> Result<BTreeMap<String, String>> {
    entries
        .iter()
        .map(|entry| match entry.split_once('=') {
            Some((element, dir)) if !element.trim().is_empty() && !dir.trim().is_empty() => {
                Ok((element.trim().to_string(), dir.trim().to_string()))
            }
            _ => Err(DefectPrepError::InvalidArgument(format!(
                "template mapping '{}' must be ELEMENT=DIR",
                entry
            ))),
        })
        .collect()
}

/// POSCAR 元素行必须与 POTCAR 中的赝势一一对应
fn ensure_potcar_order(crystal: &Crystal, valence: &ValenceTable, potcar: &Path) -> Result<()> {
    let species: Vec<String> = crystal.composition().into_iter().map(|(el, _)| el).collect();
    let potentials: Vec<&str> = valence.elements().collect();
    if species.iter().map(String::as_str).eq(potentials.iter().copied()) {
        Ok(())
    } else {
        Err(DefectPrepError::malformed(
            "potcar",
            potcar.display().to_string(),
            format!(
                "POSCAR species [{}] do not match POTCAR order [{}]",
                species.join(" "),
                potentials.join(" ")
            ),
        ))
    }
}

fn require_file(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(DefectPrepError::FileNotFound {
            path: path.display().to_string(),
        })
    }
}

fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| DefectPrepError::FileWriteError {
            path: dst.display().to_string(),
            source: e,
        })
}

/// 打印运行总结
fn print_summary(result: &BatchResult) {
    output::print_separator();
    for (name, detail) in &result.successes {
        output::print_success(&format!("{:<25} {}", name, detail));
    }
    for (name, reason) in &result.skips {
        output::print_skip(&format!("{:<25} {}", name, reason));
    }
    for (name, kind, msg) in &result.failures {
        output::print_failure(name, kind, msg);
    }
}
