//! # apply 子命令 CLI 定义
//!
//! 由参考结构和修改日志批量生成缺陷文件夹
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/apply.rs`

use super::FolderArgs;
use clap::Args;
use std::path::PathBuf;

/// apply 子命令参数
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub folders: FolderArgs,

    /// Reference structure (POSCAR/CONTCAR), relative to --root
    #[arg(long, default_value = "z_unit_cell/CONTCAR")]
    pub reference: PathBuf,

    /// Modification log (JSON), relative to --root
    #[arg(long, default_value = "z_input/defect_modifications.json")]
    pub modifications: PathBuf,

    /// Directory holding templates, KPOINTS and the job script, relative to --root
    #[arg(long, default_value = "z_input")]
    pub input_dir: PathBuf,

    /// Template subdirectory used when a folder names none (default: the input dir itself)
    #[arg(long)]
    pub default_template: Option<String>,

    /// Template subdirectory chosen by inserted element (ELEMENT=DIR, e.g. La=La_Pb_W_O); repeatable
    #[arg(long = "template-for", value_name = "ELEMENT=DIR")]
    pub template_for: Vec<String>,

    /// Shared KPOINTS file name inside the input dir
    #[arg(long, default_value = "KPOINTS")]
    pub kpoints: String,

    /// Job script name inside the input dir (copied with the job name stamped)
    #[arg(long, default_value = "job.justhpc")]
    pub job_file: String,

    /// Supercell expansion applied to the reference before modification
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], default_values_t = [1, 1, 1])]
    pub supercell: Vec<usize>,

    /// Species order for the written POSCAR (comma-separated; default: the folder's POTCAR order)
    #[arg(long, value_delimiter = ',')]
    pub species_order: Vec<String>,

    /// INCAR edit applied before NELECT is set (KEY=value, -KEY, KEY:old->new); repeatable
    #[arg(long = "edit", allow_hyphen_values = true)]
    pub edits: Vec<String>,

    /// Reference INCAR for the closing diff report, relative to --root
    #[arg(long, default_value = "z_input/reference_incar/INCAR")]
    pub reference_incar: PathBuf,

    /// INCAR tag left out of the diff report ('' disables)
    #[arg(long, default_value = "NELECT")]
    pub ignore: String,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, env = "DEFECTPREP_JOBS", default_value_t = 0)]
    pub jobs: usize,
}
