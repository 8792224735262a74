//! # 缺陷修改描述
//!
//! 每个缺陷文件夹一条声明式修改记录：元素数目变化、净电荷，
//! 以及可选的插入坐标与模板名。修改日志整体从 JSON 读取一次。
//!
//! ```json
//! {
//!   "La_Pb": { "delta": { "Pb": -1, "La": 1 }, "charge": 0, "template": "La_Pb_W_O" },
//!   "V_O":   { "delta": { "O": -1 }, "charge": 2 }
//! }
//! ```
//!
//! ## 依赖关系
//! - 被 `engine/modifier.rs` 与 `commands/apply.rs` 使用

use crate::error::{DefectPrepError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// 单个文件夹的修改描述
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModificationSpec {
    /// 元素 → 原子数变化（负数为移除，正数为插入）
    #[serde(default)]
    pub delta: BTreeMap<String, i64>,

    /// 相对中性参考的净电荷（正值表示电子更少）
    #[serde(default)]
    pub charge: i64,

    /// 插入原子的显式分数坐标
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sites: BTreeMap<String, Vec<[f64; 3]>>,

    /// 输入模板目录名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl ModificationSpec {
    pub fn new(delta: &[(&str, i64)], charge: i64) -> Self {
        ModificationSpec {
            delta: delta.iter().map(|(el, n)| (el.to_string(), *n)).collect(),
            charge,
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_sites(mut self, element: &str, coords: Vec<[f64; 3]>) -> Self {
        self.sites.insert(element.to_string(), coords);
        self
    }
}

/// 修改日志：文件夹名 → 修改描述（按名称排序）
pub type ModificationLog = BTreeMap<String, ModificationSpec>;

/// 读取修改日志文件
pub fn load_modification_log(path: &Path) -> Result<ModificationLog> {
    let content = fs::read_to_string(path).map_err(|e| DefectPrepError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_modification_log(&content, &path.display().to_string())
}

/// 从 JSON 文本解析修改日志并校验
pub fn parse_modification_log(content: &str, origin: &str) -> Result<ModificationLog> {
    let log: ModificationLog = serde_json::from_str(content)?;

    for (name, spec) in &log {
        if let Some((el, _)) = spec.delta.iter().find(|&(_, &n)| n == 0) {
            return Err(DefectPrepError::malformed(
                "modification log",
                origin,
                format!("{}: delta for {} must be non-zero", name, el),
            ));
        }
    }

    Ok(log)
}
