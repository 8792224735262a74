//! # 缺陷结构修改
//!
//! 将声明式的 [`ModificationSpec`] 应用到参考结构的副本上，
//! 并在修改后的组成上重新计算 NELECT。
//!
//! ## 规则
//! - 先移除后插入，元素按符号排序处理
//! - 移除：按结构顺序选择最先出现的匹配原子
//! - 插入：先用显式坐标 (`sites`)，再按先进先出复用被移除原子的位置；
//!   仍不足时报错，不猜测几何位置
//! - NELECT = round(Σ ZVAL × 原子数) − charge
//!
//! ## 依赖关系
//! - 被 `commands/apply.rs` 使用
//! - 使用 `models/`, `parsers/potcar.rs`

use crate::error::{DefectPrepError, Result};
use crate::models::{Atom, Crystal, ModificationSpec};
use crate::parsers::ValenceTable;
use std::collections::VecDeque;

/// 应用修改，返回新结构与电子数
///
/// 参考结构只读，返回的结构是独立的副本。
pub fn apply_modification(
    reference: &Crystal,
    spec: &ModificationSpec,
    valence: &ValenceTable,
) -> Result<(Crystal, i64)> {
    let mut crystal = reference.clone();
    let mut free_slots: VecDeque<[f64; 3]> = VecDeque::new();

    for (element, &change) in spec.delta.iter().filter(|&(_, &n)| n < 0) {
        let removed = remove_atoms(&mut crystal, element, change.unsigned_abs() as usize)?;
        free_slots.extend(removed);
    }

    for (element, &change) in spec.delta.iter().filter(|&(_, &n)| n > 0) {
        let requested = change as usize;
        let explicit = spec.sites.get(element).map(Vec::as_slice).unwrap_or(&[]);

        let mut placed = 0;
        for &position in explicit.iter().take(requested) {
            crystal.atoms.push(Atom::new(element.clone(), position));
            placed += 1;
        }
        while placed < requested {
            let Some(position) = free_slots.pop_front() else {
                return Err(DefectPrepError::InvalidSubstitution {
                    element: element.clone(),
                    requested,
                    placed,
                });
            };
            crystal.atoms.push(Atom::new(element.clone(), position));
            placed += 1;
        }
    }

    let nelect = electron_count(&crystal, spec.charge, valence)?;
    Ok((crystal, nelect))
}

/// 移除前 `count` 个匹配原子，返回其位置（按移除顺序）
fn remove_atoms(crystal: &mut Crystal, element: &str, count: usize) -> Result<Vec<[f64; 3]>> {
    let available = crystal.count_of(element);
    if available < count {
        return Err(DefectPrepError::InsufficientAtoms {
            element: element.to_string(),
            requested: count,
            available,
        });
    }

    let mut removed = Vec::with_capacity(count);
    crystal.atoms.retain(|atom| {
        if removed.len() < count && atom.element == element {
            removed.push(atom.position);
            false
        } else {
            true
        }
    });
    Ok(removed)
}

/// 计算结构的电子数
pub fn electron_count(crystal: &Crystal, charge: i64, valence: &ValenceTable) -> Result<i64> {
    let total = valence.total_valence(crystal)?;
    Ok(total.round() as i64 - charge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lattice;

    fn lattice() -> Lattice {
        Lattice::from_vectors([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]])
    }

    /// 10 个 Pb + 40 个 O
    fn reference() -> Crystal {
        let mut atoms = Vec::new();
        for i in 0..10 {
            atoms.push(Atom::new("Pb", [i as f64 / 10.0, 0.0, 0.0]));
        }
        for i in 0..40 {
            atoms.push(Atom::new("O", [0.0, i as f64 / 40.0, 0.5]));
        }
        Crystal::new("PbO", lattice(), atoms)
    }

    fn valence() -> ValenceTable {
        ValenceTable::from_pairs(&[("La", 11.0), ("Pb", 14.0), ("O", 6.0)])
    }

    #[test]
    fn test_empty_spec_keeps_reference() {
        let reference = reference();
        let (crystal, nelect) =
            apply_modification(&reference, &ModificationSpec::default(), &valence()).unwrap();

        assert_eq!(crystal, reference);
        assert_eq!(nelect, 10 * 14 + 40 * 6);
    }

    #[test]
    fn test_la_on_pb_substitution() {
        let reference = reference();
        let spec = ModificationSpec::new(&[("Pb", -1), ("La", 1)], 0);
        let (crystal, nelect) = apply_modification(&reference, &spec, &valence()).unwrap();

        assert_eq!(crystal.count_of("Pb"), 9);
        assert_eq!(crystal.count_of("La"), 1);
        assert_eq!(nelect, 9 * 14 + 11 + 40 * 6);

        // La 占据第一个 Pb 的位置
        let la = crystal.atoms.iter().find(|a| a.element == "La").unwrap();
        assert_eq!(la.position, [0.0, 0.0, 0.0]);
        assert_eq!(crystal.atoms[0].position, [0.1, 0.0, 0.0]);

        // 参考结构未被修改
        assert_eq!(reference.count_of("Pb"), 10);
    }

    #[test]
    fn test_charge_subtracts_electrons() {
        let spec = ModificationSpec::new(&[("O", -1)], 2);
        let (crystal, nelect) = apply_modification(&reference(), &spec, &valence()).unwrap();

        assert_eq!(crystal.count_of("O"), 39);
        assert_eq!(nelect, 10 * 14 + 39 * 6 - 2);
    }

    #[test]
    fn test_remove_all_then_too_many() {
        let spec = ModificationSpec::new(&[("Pb", -10)], 0);
        let (crystal, _) = apply_modification(&reference(), &spec, &valence()).unwrap();
        assert_eq!(crystal.count_of("Pb"), 0);

        let spec = ModificationSpec::new(&[("Pb", -11)], 0);
        let err = apply_modification(&reference(), &spec, &valence()).unwrap_err();
        assert!(matches!(
            err,
            DefectPrepError::InsufficientAtoms {
                requested: 11,
                available: 10,
                ..
            }
        ));
    }

    #[test]
    fn test_insertion_without_placement_fails() {
        let spec = ModificationSpec::new(&[("La", 1)], 0);
        let err = apply_modification(&reference(), &spec, &valence()).unwrap_err();
        assert!(matches!(
            err,
            DefectPrepError::InvalidSubstitution { placed: 0, requested: 1, .. }
        ));
    }

    #[test]
    fn test_explicit_sites_used_before_vacancies() {
        let spec = ModificationSpec::new(&[("Pb", -1), ("La", 2)], 0)
            .with_sites("La", vec![[0.25, 0.25, 0.25]]);
        let (crystal, _) = apply_modification(&reference(), &spec, &valence()).unwrap();

        let la: Vec<[f64; 3]> = crystal
            .atoms
            .iter()
            .filter(|a| a.element == "La")
            .map(|a| a.position)
            .collect();
        assert_eq!(la, vec![[0.25, 0.25, 0.25], [0.0, 0.0, 0.0]]);
    }

    #[test]
    fn test_unknown_element() {
        let spec = ModificationSpec::new(&[("Pb", -1), ("W", 1)], 0);
        let err = apply_modification(&reference(), &spec, &valence()).unwrap_err();
        assert_eq!(err.kind(), "UnknownElementError");
    }

    #[test]
    fn test_repeated_runs_identical() {
        let spec = ModificationSpec::new(&[("O", -3), ("Pb", -2), ("La", 2)], 1);
        let first = apply_modification(&reference(), &spec, &valence()).unwrap();
        let second = apply_modification(&reference(), &spec, &valence()).unwrap();
        assert_eq!(first, second);
    }
}
