//! # INCAR 一致性比较
//!
//! 将每个文件夹的 INCAR 与参考 INCAR 比较，并按差异签名分组。
//!
//! ## 算法
//! 1. 逐文件夹求原始差异（值不同或仅一侧存在），跳过忽略标签
//! 2. 所有文件夹都具有的同一差异视为全局差异，从各文件夹中移除
//! 3. 按剩余差异（按标签排序）分组
//! 4. 组按首次出现顺序输出，组内文件夹保持输入顺序
//!
//! ## 依赖关系
//! - 被 `commands/diff.rs`, `commands/apply.rs` 使用
//! - 使用 `models/parameters.rs`

use crate::models::parameters::normalize_key;
use crate::models::{ParamValue, ParameterSet};
use std::collections::BTreeSet;

/// 单个标签的差异，`None` 表示该侧不存在此标签
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    pub key: String,
    pub reference: Option<ParamValue>,
    pub folder: Option<ParamValue>,
}

/// 一组具有相同差异签名的文件夹
#[derive(Debug, Clone, PartialEq)]
pub struct DiffGroup {
    /// 按标签排序的差异列表；为空表示与参考一致
    pub signature: Vec<DiffEntry>,
    pub folders: Vec<String>,
}

impl DiffGroup {
    pub fn matches_reference(&self) -> bool {
        self.signature.is_empty()
    }
}

/// 比较结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffReport {
    pub groups: Vec<DiffGroup>,
    /// 所有文件夹共有而被抑制的差异
    pub shared: Vec<DiffEntry>,
}

impl DiffReport {
    /// 所有出现过的差异标签（排序去重）
    pub fn keys(&self) -> Vec<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.signature.iter().map(|e| e.key.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 查找文件夹所在的组
    pub fn group_of(&self, folder: &str) -> Option<&DiffGroup> {
        self.groups
            .iter()
            .find(|g| g.folders.iter().any(|f| f == folder))
    }
}

/// 求单个文件夹相对参考的原始差异（按标签排序）
pub fn raw_differences(
    reference: &ParameterSet,
    folder: &ParameterSet,
    ignored_key: Option<&str>,
) -> Vec<DiffEntry> {
    let ignored = ignored_key.map(normalize_key);
    let keys: BTreeSet<&str> = reference.keys().chain(folder.keys()).collect();

    keys.into_iter()
        .filter(|k| ignored.as_deref() != Some(*k))
        .filter_map(|key| {
            let r = reference.get(key);
            let f = folder.get(key);
            let same = match (r, f) {
                (Some(r), Some(f)) => r.same_value(f),
                (None, None) => true,
                _ => false,
            };
            (!same).then(|| DiffEntry {
                key: key.to_string(),
                reference: r.cloned(),
                folder: f.cloned(),
            })
        })
        .collect()
}

/// 比较所有文件夹并分组
pub fn diff_parameters(
    reference: &ParameterSet,
    folders: &[(String, ParameterSet)],
    ignored_key: Option<&str>,
) -> DiffReport {
    let raw: Vec<Vec<DiffEntry>> = folders
        .iter()
        .map(|(_, params)| raw_differences(reference, params, ignored_key))
        .collect();

    let shared: Vec<DiffEntry> = match raw.split_first() {
        Some((first, rest)) => first
            .iter()
            .filter(|entry| rest.iter().all(|diffs| diffs.contains(*entry)))
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    let mut groups: Vec<DiffGroup> = Vec::new();
    for ((name, _), diffs) in folders.iter().zip(raw) {
        let signature: Vec<DiffEntry> = diffs.into_iter().filter(|e| !shared.contains(e)).collect();

        match groups.iter_mut().find(|g| g.signature == signature) {
            Some(group) => group.folders.push(name.clone()),
            None => groups.push(DiffGroup {
                signature,
                folders: vec![name.clone()],
            }),
        }
    }

    DiffReport { groups, shared }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParameterSet {
        let mut p = ParameterSet::new();
        for (k, v) in pairs {
            p.set(k, ParamValue::parse(v));
        }
        p
    }

    fn named(name: &str, pairs: &[(&str, &str)]) -> (String, ParameterSet) {
        (name.to_string(), params(pairs))
    }

    #[test]
    fn test_raw_differences() {
        let reference = params(&[("ENCUT", "520"), ("ISMEAR", "0"), ("LWAVE", "F")]);
        let folder = params(&[("encut", "400"), ("ISMEAR", "0"), ("NSW", "100")]);
        let diffs = raw_differences(&reference, &folder, None);

        let keys: Vec<&str> = diffs.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["ENCUT", "LWAVE", "NSW"]);
        assert_eq!(diffs[1].folder, None);
        assert_eq!(diffs[2].reference, None);
        assert_eq!(diffs[2].folder, Some(ParamValue::Int(100)));
    }

    #[test]
    fn test_ignored_key_and_shared_difference() {
        let reference = params(&[("ISMEAR", "0"), ("SIGMA", "0.05"), ("SYSTEM", "ref")]);
        let folders = vec![
            named("A", &[("ISMEAR", "0"), ("SIGMA", "0.05"), ("SYSTEM", "A"), ("KPAR", "2")]),
            named("B", &[("ISMEAR", "0"), ("SIGMA", "0.05"), ("SYSTEM", "B"), ("KPAR", "2")]),
        ];
        let report = diff_parameters(&reference, &folders, Some("system"));

        assert_eq!(report.groups.len(), 1);
        assert!(report.groups[0].matches_reference());
        assert_eq!(report.groups[0].folders, vec!["A", "B"]);
        assert_eq!(report.shared.len(), 1);
        assert_eq!(report.shared[0].key, "KPAR");
        assert!(report.keys().is_empty());
    }

    #[test]
    fn test_groups_first_seen_order() {
        let reference = params(&[("ENCUT", "520"), ("ISMEAR", "0")]);
        let folders = vec![
            named("v_O", &[("ENCUT", "520"), ("ISMEAR", "0")]),
            named("La_Pb", &[("ENCUT", "400"), ("ISMEAR", "0")]),
            named("Y_Pb", &[("ENCUT", "520"), ("ISMEAR", "0")]),
            named("Mo_W", &[("ENCUT", "400"), ("ISMEAR", "0")]),
            named("v_Pb", &[("ENCUT", "520"), ("ISMEAR", "1")]),
        ];
        let report = diff_parameters(&reference, &folders, None);

        assert!(report.shared.is_empty());
        assert_eq!(report.groups.len(), 3);
        assert_eq!(report.groups[0].folders, vec!["v_O", "Y_Pb"]);
        assert!(report.groups[0].matches_reference());
        assert_eq!(report.groups[1].folders, vec!["La_Pb", "Mo_W"]);
        assert_eq!(report.groups[2].folders, vec!["v_Pb"]);
        assert_eq!(report.keys(), vec!["ENCUT", "ISMEAR"]);
        assert_eq!(report.group_of("Mo_W"), Some(&report.groups[1]));
    }

    #[test]
    fn test_shared_requires_identical_values() {
        let reference = params(&[("NELECT", "400")]);
        let folders = vec![
            named("a", &[("NELECT", "401")]),
            named("b", &[("NELECT", "402")]),
        ];
        let report = diff_parameters(&reference, &folders, None);

        assert!(report.shared.is_empty());
        assert_eq!(report.groups.len(), 2);
    }

    #[test]
    fn test_shared_suppressed_but_rest_kept() {
        let reference = params(&[("ALGO", "Normal")]);
        let folders = vec![
            named("a", &[("ALGO", "Fast"), ("LREAL", "Auto")]),
            named("b", &[("ALGO", "Fast")]),
        ];
        let report = diff_parameters(&reference, &folders, None);

        assert_eq!(report.shared[0].key, "ALGO");
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].signature.len(), 1);
        assert_eq!(report.groups[0].signature[0].key, "LREAL");
        assert!(report.groups[1].matches_reference());
    }

    #[test]
    fn test_single_folder_differences_are_shared() {
        let reference = params(&[("ENCUT", "520")]);
        let folders = vec![named("only", &[("ENCUT", "400")])];
        let report = diff_parameters(&reference, &folders, None);

        assert_eq!(report.shared.len(), 1);
        assert!(report.groups[0].matches_reference());
    }

    #[test]
    fn test_numeric_formatting_is_not_a_difference() {
        let reference = params(&[("ENCUT", "520.0"), ("EDIFF", "1E-6"), ("PREC", "Accurate")]);
        let folder = params(&[("ENCUT", "520"), ("EDIFF", "1.0d-6"), ("PREC", "accurate")]);
        assert!(raw_differences(&reference, &folder, None).is_empty());

        let folders = vec![named("A", &[("ENCUT", "520"), ("EDIFF", "1E-6"), ("PREC", "Accurate")])];
        let report = diff_parameters(&reference, &folders, None);
        assert!(report.shared.is_empty());
        assert!(report.groups[0].matches_reference());
    }

    #[test]
    fn test_no_folders() {
        let report = diff_parameters(&params(&[("ENCUT", "520")]), &[], None);
        assert_eq!(report, DiffReport::default());
    }
}
