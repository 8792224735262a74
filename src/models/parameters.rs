//! # INCAR 参数集合模型
//!
//! 有序的 标签 → 值 映射。标签在所有入口处统一转换为大写，
//! 因此 `encut` 与 `ENCUT` 视为同一个标签。
//!
//! 文本解析与序列化在 `parsers/incar.rs` 中实现。
//!
//! ## 依赖关系
//! - 被 `parsers/incar.rs`, `engine/editor.rs`, `engine/diff.rs` 使用

use serde::{Deserialize, Serialize};
use std::fmt;

/// 标签值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    /// 从 INCAR 文本推断类型
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();

        match s.to_ascii_uppercase().as_str() {
            ".TRUE." | "T" | "TRUE" => return ParamValue::Bool(true),
            ".FALSE." | "F" | "FALSE" => return ParamValue::Bool(false),
            _ => {}
        }

        if let Ok(i) = s.parse::<i64>() {
            return ParamValue::Int(i);
        }

        // Fortran 风格指数 1.0d-5
        let normalized = s.replace(['d', 'D'], "e");
        if looks_numeric(&normalized) {
            if let Ok(f) = normalized.parse::<f64>() {
                if f.is_finite() {
                    return ParamValue::Float(f);
                }
            }
        }

        ParamValue::Text(s.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// 按 VASP 读取后的含义比较：数值按大小，文本忽略大小写
    ///
    /// `520` 与 `520.0`、`Accurate` 与 `accurate` 视为相同。
    pub fn same_value(&self, other: &ParamValue) -> bool {
        match (self, other) {
            (ParamValue::Text(a), ParamValue::Text(b)) => a.eq_ignore_ascii_case(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => self == other,
            },
        }
    }
}

/// 仅由数字、符号、小数点与指数组成
fn looks_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{:.1}", x),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::Bool(true) => write!(f, ".TRUE."),
            ParamValue::Bool(false) => write!(f, ".FALSE."),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// 有序参数集合（保留插入顺序）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    entries: Vec<(String, ParamValue)>,
}

/// 标签规范化
pub fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_uppercase()
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        let key = normalize_key(key);
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// 设置标签；已存在时原位替换，保持原有顺序
    pub fn set(&mut self, key: &str, value: impl Into<ParamValue>) {
        let key = normalize_key(key);
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    /// 删除标签，返回旧值
    pub fn delete(&mut self, key: &str) -> Option<ParamValue> {
        let key = normalize_key(key);
        let idx = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 从 INCAR 文本解析
    pub fn parse(text: &str) -> crate::error::Result<Self> {
        crate::parsers::incar::parse_incar_content(text, "INCAR")
    }

    /// 序列化为 INCAR 文本
    pub fn serialize(&self) -> String {
        crate::parsers::incar::to_incar_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_typing() {
        assert_eq!(ParamValue::parse("520"), ParamValue::Int(520));
        assert_eq!(ParamValue::parse("0.05"), ParamValue::Float(0.05));
        assert_eq!(ParamValue::parse("1.0d-5"), ParamValue::Float(1.0e-5));
        assert_eq!(ParamValue::parse(".TRUE."), ParamValue::Bool(true));
        assert_eq!(ParamValue::parse("F"), ParamValue::Bool(false));
        assert_eq!(ParamValue::parse("Accurate"), ParamValue::Text("Accurate".into()));
        assert_eq!(
            ParamValue::parse("4*1.0 2*0.0"),
            ParamValue::Text("4*1.0 2*0.0".into())
        );
        assert_eq!(ParamValue::parse("e"), ParamValue::Text("e".into()));
    }

    #[test]
    fn test_float_display_keeps_type() {
        let v = ParamValue::Float(520.0);
        assert_eq!(v.to_string(), "520.0");
        assert_eq!(ParamValue::parse(&v.to_string()), v);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let mut p = ParameterSet::new();
        p.set("encut", 520);
        assert_eq!(p.get("ENCUT"), Some(&ParamValue::Int(520)));

        p.set("Encut", 400);
        assert_eq!(p.len(), 1);
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["ENCUT"]);

        assert_eq!(p.delete("ENCUT"), Some(ParamValue::Int(400)));
        assert!(p.is_empty());
        assert_eq!(p.delete("ENCUT"), None);
    }

    #[test]
    fn test_set_keeps_position() {
        let mut p = ParameterSet::new();
        p.set("ISMEAR", 0);
        p.set("SIGMA", "0.05");
        p.set("ISMEAR", 1);
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["ISMEAR", "SIGMA"]);
    }

    #[test]
    fn test_parse_serialize_round_trip() {
        let mut p = ParameterSet::new();
        p.set("SYSTEM", "La_Pb");
        p.set("ENCUT", 520);
        p.set("EDIFF", ParamValue::Float(1e-6));
        p.set("LORBIT", ParamValue::Bool(true));
        p.set("MAGMOM", "4*1.0 2*0.0");
        p.set("NELECT", ParamValue::Float(400.0));

        assert_eq!(ParameterSet::parse(&p.serialize()).unwrap(), p);
    }

    #[test]
    fn test_same_value_ignores_formatting() {
        assert!(ParamValue::Int(520).same_value(&ParamValue::Float(520.0)));
        assert!(ParamValue::parse("1E-6").same_value(&ParamValue::parse("0.000001")));
        assert!(ParamValue::parse("Accurate").same_value(&ParamValue::parse("accurate")));
        assert!(!ParamValue::Int(520).same_value(&ParamValue::Float(520.5)));
        assert!(!ParamValue::Int(1).same_value(&ParamValue::Bool(true)));
    }
}
