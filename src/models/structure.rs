//! # 晶体结构数据模型
//!
//! 有序的原子位点序列加晶格。位点顺序是有意义的：缺陷修改按结构中
//! 首次出现的顺序选择被移除的原子，保证重复运行结果一致。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs` 和 `engine/modifier.rs` 使用
//! - 无外部模块依赖

use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 按各方向倍数放大晶格（超胞）
    pub fn scaled(&self, factors: [usize; 3]) -> Self {
        let mut matrix = self.matrix;
        for (row, &n) in matrix.iter_mut().zip(factors.iter()) {
            for v in row.iter_mut() {
                *v *= n as f64;
            }
        }
        Lattice { matrix }
    }

    /// 计算晶格体积
    pub fn volume(&self) -> f64 {
        let a = self.matrix[0];
        let b = self.matrix[1];
        let c = self.matrix[2];

        // 行列式计算
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }
}

/// 原子位点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 分数坐标 [x, y, z]
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crystal {
    /// 结构名称（POSCAR 注释行）
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl Crystal {
    pub fn new(name: impl Into<String>, lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Crystal {
            name: name.into(),
            lattice,
            atoms,
        }
    }

    /// 按首次出现顺序统计各元素原子数
    pub fn composition(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for atom in &self.atoms {
            match counts.iter_mut().find(|(el, _)| *el == atom.element) {
                Some((_, n)) => *n += 1,
                None => counts.push((atom.element.clone(), 1)),
            }
        }
        counts
    }

    /// 某元素的原子数
    pub fn count_of(&self, element: &str) -> usize {
        self.atoms.iter().filter(|a| a.element == element).count()
    }

    /// 组成字符串，如 "Pb9 La1 W10 O40"
    pub fn formula(&self) -> String {
        self.composition()
            .into_iter()
            .map(|(el, n)| format!("{}{}", el, n))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 构建超胞
    ///
    /// 原子顺序为“原胞原子优先”：同一个原胞原子的所有镜像连续排列。
    pub fn supercell(&self, factors: [usize; 3]) -> Crystal {
        if factors == [1, 1, 1] {
            return self.clone();
        }

        let [nx, ny, nz] = factors;
        let mut atoms = Vec::with_capacity(self.atoms.len() * nx * ny * nz);

        for atom in &self.atoms {
            for i in 0..nx {
                for j in 0..ny {
                    for k in 0..nz {
                        let p = atom.position;
                        atoms.push(Atom::new(
                            atom.element.clone(),
                            [
                                (p[0] + i as f64) / nx as f64,
                                (p[1] + j as f64) / ny as f64,
                                (p[2] + k as f64) / nz as f64,
                            ],
                        ));
                    }
                }
            }
        }

        Crystal::new(self.name.clone(), self.lattice.scaled(factors), atoms)
    }

    /// 按给定元素顺序稳定排序；未列出的元素排在最后并保持相对顺序
    pub fn sort_by_species(&mut self, order: &[String]) {
        if order.is_empty() {
            return;
        }
        self.atoms.sort_by_key(|a| {
            order
                .iter()
                .position(|el| *el == a.element)
                .unwrap_or(order.len())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic(a: f64) -> Lattice {
        Lattice::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    #[test]
    fn test_lattice_volume_cubic() {
        let vol = cubic(5.0).volume().abs();

        // 5^3 = 125
        assert!((vol - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_composition_first_seen_order() {
        let atoms = vec![
            Atom::new("Pb", [0.0, 0.0, 0.0]),
            Atom::new("O", [0.5, 0.0, 0.0]),
            Atom::new("Pb", [0.5, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("PbO", cubic(4.0), atoms);

        assert_eq!(
            crystal.composition(),
            vec![("Pb".to_string(), 2), ("O".to_string(), 1)]
        );
        assert_eq!(crystal.formula(), "Pb2 O1");
        assert_eq!(crystal.count_of("O"), 1);
        assert_eq!(crystal.count_of("La"), 0);
    }

    #[test]
    fn test_supercell_counts_and_volume() {
        let atoms = vec![
            Atom::new("Na", [0.0, 0.0, 0.0]),
            Atom::new("Cl", [0.5, 0.5, 0.5]),
        ];
        let crystal = Crystal::new("NaCl", cubic(2.0), atoms);
        let sc = crystal.supercell([2, 2, 4]);

        assert_eq!(sc.atoms.len(), 32);
        assert_eq!(sc.count_of("Na"), 16);
        assert!((sc.lattice.volume() - 8.0 * 16.0).abs() < 1e-9);

        // 同一原胞原子的镜像连续排列
        assert!(sc.atoms[..16].iter().all(|a| a.element == "Na"));
        assert_eq!(sc.atoms[1].position, [0.0, 0.0, 0.25]);
    }

    #[test]
    fn test_sort_by_species_is_stable() {
        let atoms = vec![
            Atom::new("O", [0.1, 0.0, 0.0]),
            Atom::new("Pb", [0.2, 0.0, 0.0]),
            Atom::new("Xx", [0.3, 0.0, 0.0]),
            Atom::new("La", [0.4, 0.0, 0.0]),
            Atom::new("O", [0.5, 0.0, 0.0]),
        ];
        let mut crystal = Crystal::new("mix", cubic(4.0), atoms);
        let order: Vec<String> = ["La", "Pb", "O"].iter().map(|s| s.to_string()).collect();
        crystal.sort_by_species(&order);

        let elements: Vec<&str> = crystal.atoms.iter().map(|a| a.element.as_str()).collect();
        assert_eq!(elements, vec!["La", "Pb", "O", "O", "Xx"]);
        assert_eq!(crystal.atoms[2].position[0], 0.1);
    }
}
