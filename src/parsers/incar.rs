//! # VASP INCAR 格式解析器
//!
//! ## INCAR 格式说明
//! ```text
//! SYSTEM = La on Pb site     # comment
//! ENCUT = 520; ISMEAR = 0    ! several statements per line
//! MAGMOM = 4*1.0 60*0.0
//! ```
//!
//! 未识别的标签原样保留；标签统一转为大写。
//!
//! ## 依赖关系
//! - 被 `models/parameters.rs` 与 `commands/` 使用
//! - 使用 `models/parameters.rs`

use crate::error::{DefectPrepError, Result};
use crate::models::{ParamValue, ParameterSet};
use std::fs;
use std::path::Path;

/// 解析 INCAR 文件
pub fn parse_incar_file(path: &Path) -> Result<ParameterSet> {
    let content = fs::read_to_string(path).map_err(|e| DefectPrepError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_incar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 INCAR
pub fn parse_incar_content(content: &str, origin: &str) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = strip_comment(line);

        for statement in line.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }

            let (key, value) = statement.split_once('=').ok_or_else(|| {
                DefectPrepError::malformed(
                    "incar",
                    origin,
                    format!("line {}: expected KEY = value, got '{}'", lineno + 1, statement),
                )
            })?;

            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(DefectPrepError::malformed(
                    "incar",
                    origin,
                    format!("line {}: invalid tag name '{}'", lineno + 1, key),
                ));
            }

            params.set(key, ParamValue::parse(value));
        }
    }

    Ok(params)
}

/// 去除 `#` 或 `!` 之后的注释
fn strip_comment(line: &str) -> &str {
    match line.find(['#', '!']) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// 将参数集合转换为 INCAR 字符串
pub fn to_incar_string(params: &ParameterSet) -> String {
    let mut result = String::new();
    for (key, value) in params.iter() {
        result.push_str(&format!("{} = {}\n", key, value));
    }
    result
}

/// 写入 INCAR 文件
pub fn write_incar_file(path: &Path, params: &ParameterSet) -> Result<()> {
    fs::write(path, params.serialize()).map_err(|e| DefectPrepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
