//! # INCAR 批量编辑
//!
//! 将同一组编辑操作按顺序应用到参数集合上。对缺失标签的删除与替换
//! 都是空操作，不会报错。
//!
//! ## 命令行语法
//! - `KEY=value`    设置
//! - `-KEY`         删除
//! - `KEY:old->new` 替换值中的文本
//!
//! ## 依赖关系
//! - 被 `commands/edit.rs`, `commands/apply.rs` 使用
//! - 使用 `models/parameters.rs`

use crate::error::{DefectPrepError, Result};
use crate::models::parameters::normalize_key;
use crate::models::{ParamValue, ParameterSet};
use std::fmt;
use std::str::FromStr;

/// 编辑操作
#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    Set(String, ParamValue),
    Delete(String),
    Replace {
        key: String,
        matcher: String,
        replacement: String,
    },
}

impl FromStr for EditOp {
    type Err = DefectPrepError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || DefectPrepError::InvalidArgument(format!("invalid edit operation '{}'", s));

        if let Some(key) = s.strip_prefix('-') {
            let key = normalize_key(key);
            if key.is_empty() || key.contains(['=', ':']) {
                return Err(invalid());
            }
            return Ok(EditOp::Delete(key));
        }

        let eq = s.find('=');
        let colon = s.find(':');
        match (eq, colon) {
            (Some(e), c) if c.map_or(true, |c| e < c) => {
                let key = normalize_key(&s[..e]);
                if key.is_empty() {
                    return Err(invalid());
                }
                let value = &s[e + 1..];
                check_value(value)?;
                Ok(EditOp::Set(key, ParamValue::parse(value)))
            }
            (_, Some(c)) => {
                let key = normalize_key(&s[..c]);
                let (matcher, replacement) = s[c + 1..].split_once("->").ok_or_else(invalid)?;
                if key.is_empty() || matcher.is_empty() {
                    return Err(invalid());
                }
                check_value(replacement)?;
                Ok(EditOp::Replace {
                    key,
                    matcher: matcher.to_string(),
                    replacement: replacement.to_string(),
                })
            }
            _ => Err(invalid()),
        }
    }
}

/// INCAR 中 `;` 分隔语句，`#`/`!` 开始注释，写出后无法原样读回
fn check_value(value: &str) -> Result<()> {
    match value.chars().find(|c| matches!(c, ';' | '#' | '!')) {
        Some(c) => Err(DefectPrepError::InvalidArgument(format!(
            "value '{}' contains '{}', which INCAR cannot store",
            value.trim(),
            c
        ))),
        None => Ok(()),
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOp::Set(key, value) => write!(f, "{}={}", key, value),
            EditOp::Delete(key) => write!(f, "-{}", key),
            EditOp::Replace {
                key,
                matcher,
                replacement,
            } => write!(f, "{}:{}->{}", key, matcher, replacement),
        }
    }
}

/// 一次实际生效的修改
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub key: String,
    pub before: Option<ParamValue>,
    pub after: Option<ParamValue>,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<ParamValue>| match v {
            Some(v) => v.to_string(),
            None => "—".to_string(),
        };
        write!(f, "{}={} → {}", self.key, show(&self.before), show(&self.after))
    }
}

/// 按顺序应用编辑操作，返回实际发生的修改
pub fn apply_edits(edits: &[EditOp], target: &mut ParameterSet) -> Vec<Change> {
    let mut changes = Vec::new();

    for op in edits {
        match op {
            EditOp::Set(key, value) => {
                let before = target.get(key).cloned();
                if before.as_ref() != Some(value) {
                    target.set(key, value.clone());
                    changes.push(Change {
                        key: key.clone(),
                        before,
                        after: Some(value.clone()),
                    });
                }
            }
            EditOp::Delete(key) => {
                if let Some(before) = target.delete(key) {
                    changes.push(Change {
                        key: key.clone(),
                        before: Some(before),
                        after: None,
                    });
                }
            }
            EditOp::Replace {
                key,
                matcher,
                replacement,
            } => {
                let Some(before) = target.get(key).cloned() else {
                    continue;
                };
                let text = before.to_string();
                if !text.contains(matcher.as_str()) {
                    continue;
                }
                let after = ParamValue::parse(&text.replace(matcher.as_str(), replacement));
                if after != before {
                    target.set(key, after.clone());
                    changes.push(Change {
                        key: key.clone(),
                        before: Some(before),
                        after: Some(after),
                    });
                }
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(tokens: &[&str]) -> Vec<EditOp> {
        tokens.iter().map(|t| t.parse().unwrap()).collect()
    }

    fn sample() -> ParameterSet {
        let mut p = ParameterSet::new();
        p.set("ENCUT", 400);
        p.set("ALGO", "Normal");
        p.set("SYSTEM", "PbWO4 bulk");
        p
    }

    #[test]
    fn test_parse_ops() {
        assert_eq!(
            "encut=520".parse::<EditOp>().unwrap(),
            EditOp::Set("ENCUT".into(), ParamValue::Int(520))
        );
        assert_eq!("-LWAVE".parse::<EditOp>().unwrap(), EditOp::Delete("LWAVE".into()));
        assert_eq!(
            "ALGO:Normal->Fast".parse::<EditOp>().unwrap(),
            EditOp::Replace {
                key: "ALGO".into(),
                matcher: "Normal".into(),
                replacement: "Fast".into()
            }
        );
        // '=' 出现在 ':' 之前时为设置操作
        assert_eq!(
            "SYSTEM=a:b->c".parse::<EditOp>().unwrap(),
            EditOp::Set("SYSTEM".into(), ParamValue::Text("a:b->c".into()))
        );
        assert!("ENCUT".parse::<EditOp>().is_err());
        assert!("ALGO:Normal".parse::<EditOp>().is_err());
        assert!("=5".parse::<EditOp>().is_err());
        assert!("-".parse::<EditOp>().is_err());
    }

    #[test]
    fn test_ops_apply_in_order() {
        let mut p = sample();
        let changes = apply_edits(&ops(&["ENCUT=520", "-ENCUT", "ENCUT=600"]), &mut p);

        assert_eq!(p.get("ENCUT"), Some(&ParamValue::Int(600)));
        assert_eq!(changes.len(), 3);
        // 重新插入的标签排在末尾
        assert_eq!(p.keys().last(), Some("ENCUT"));
    }

    #[test]
    fn test_missing_keys_are_noops() {
        let mut p = sample();
        let before = p.clone();
        let changes = apply_edits(&ops(&["-LWAVE", "ISMEAR:0->1"]), &mut p);

        assert!(changes.is_empty());
        assert_eq!(p, before);
    }

    #[test]
    fn test_replace_retypes_value() {
        let mut p = sample();
        apply_edits(&ops(&["ENCUT:4->5", "SYSTEM:bulk->La_Pb", "ALGO:Fast->All"]), &mut p);

        assert_eq!(p.get("ENCUT"), Some(&ParamValue::Int(500)));
        assert_eq!(p.get("SYSTEM"), Some(&ParamValue::Text("PbWO4 La_Pb".into())));
        assert_eq!(p.get("ALGO"), Some(&ParamValue::Text("Normal".into())));
    }

    #[test]
    fn test_set_is_idempotent() {
        let edits = ops(&["ISYM=0"]);
        let mut p = sample();
        apply_edits(&edits, &mut p);
        let once = p.clone();

        let changes = apply_edits(&edits, &mut p);
        assert!(changes.is_empty());
        assert_eq!(p, once);
    }

    #[test]
    fn test_values_must_survive_incar() {
        for token in ["SYSTEM=La;Pb", "SYSTEM=La # Pb", "SYSTEM=hi!", "SYSTEM:bulk->a;b"] {
            let err = token.parse::<EditOp>().unwrap_err();
            assert_eq!(err.kind(), "InvalidArgument");
        }

        // 写出的 INCAR 可以被重新读取
        let mut p = sample();
        apply_edits(&ops(&["SYSTEM=La_Pb defect", "ALGO:Normal->All"]), &mut p);
        assert_eq!(ParameterSet::parse(&p.serialize()).unwrap(), p);
    }

    #[test]
    fn test_display_round_trip() {
        for token in ["ENCUT=520", "-LWAVE", "ALGO:Normal->Fast"] {
            let op: EditOp = token.parse().unwrap();
            assert_eq!(op.to_string().parse::<EditOp>().unwrap(), op);
        }
    }
}
