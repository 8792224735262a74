//! # VASP POTCAR 价电子解析器
//!
//! 从 POTCAR 中按顺序读取每个赝势的元素符号 (TITEL) 与价电子数 (ZVAL)，
//! 构成元素 → 价电子数表。
//!
//! ```text
//!    TITEL  = PAW_PBE La_GW 06Sep2000
//!    POMASS =  138.900; ZVAL   =   11.000    mass and valenz
//! ```
//!
//! ## 依赖关系
//! - 被 `engine/modifier.rs`, `commands/apply.rs`, `commands/check.rs` 使用

use crate::error::{DefectPrepError, Result};
use crate::models::Crystal;
use std::fs;
use std::path::Path;

/// 元素价电子表（保持 POTCAR 中的顺序）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValenceTable {
    entries: Vec<(String, f64)>,
}

impl ValenceTable {
    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, f64)]) -> Self {
        ValenceTable {
            entries: pairs.iter().map(|(el, z)| (el.to_string(), *z)).collect(),
        }
    }

    pub fn get(&self, element: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(el, _)| el == element)
            .map(|(_, z)| *z)
    }

    /// 按 POTCAR 顺序列出元素
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(el, _)| el.as_str())
    }

    /// 结构的总价电子数（未取整）
    pub fn total_valence(&self, crystal: &Crystal) -> Result<f64> {
        let mut total = 0.0;
        for (element, count) in crystal.composition() {
            let z = self
                .get(&element)
                .ok_or(DefectPrepError::UnknownElement { element })?;
            total += z * count as f64;
        }
        Ok(total)
    }
}

/// 解析 POTCAR 文件
pub fn parse_potcar_file(path: &Path) -> Result<ValenceTable> {
    let content = fs::read_to_string(path).map_err(|e| DefectPrepError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_potcar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 POTCAR
pub fn parse_potcar_content(content: &str, origin: &str) -> Result<ValenceTable> {
    let mut entries: Vec<(String, f64)> = Vec::new();
    let mut pending: Option<String> = None;

    for line in content.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with("TITEL") {
            if let Some(symbol) = pending.take() {
                return Err(DefectPrepError::malformed(
                    "potcar",
                    origin,
                    format!("no ZVAL found for {}", symbol),
                ));
            }
            let symbol = trimmed
                .split_once('=')
                .and_then(|(_, rest)| rest.split_whitespace().nth(1))
                .map(base_symbol)
                .ok_or_else(|| {
                    DefectPrepError::malformed("potcar", origin, format!("bad TITEL line '{}'", trimmed))
                })?;
            pending = Some(symbol);
        } else if let Some(idx) = line.find("ZVAL") {
            let Some(symbol) = pending.take() else {
                continue;
            };
            let zval = line[idx + 4..]
                .trim_start()
                .trim_start_matches('=')
                .split_whitespace()
                .next()
                .and_then(|s| s.trim_end_matches(';').parse::<f64>().ok())
                .ok_or_else(|| {
                    DefectPrepError::malformed(
                        "potcar",
                        origin,
                        format!("bad ZVAL for {}", symbol),
                    )
                })?;
            entries.push((symbol, zval));
        }
    }

    if let Some(symbol) = pending {
        return Err(DefectPrepError::malformed(
            "potcar",
            origin,
            format!("no ZVAL found for {}", symbol),
        ));
    }
    if entries.is_empty() {
        return Err(DefectPrepError::malformed("potcar", origin, "no pseudopotentials found"));
    }

    Ok(ValenceTable { entries })
}

/// 去掉赝势后缀: La_GW → La, Pb_d → Pb
fn base_symbol(s: &str) -> String {
    s.split('_').next().unwrap_or(s).to_string()
}
