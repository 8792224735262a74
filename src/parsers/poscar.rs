//! # VASP POSCAR 格式解析器
//!
//! 读写 VASP POSCAR/CONTCAR 文件格式。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/apply.rs`, `commands/check.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{DefectPrepError, Result};
use crate::models::{Atom, Crystal, Lattice};
use std::fs;
use std::path::Path;

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| DefectPrepError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(&content, &path.display().to_string())
}

/// 按行读取 POSCAR，出错时报告行号
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    next: usize,
    origin: &'a str,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str, origin: &'a str) -> Self {
        Self {
            lines: content.lines().collect(),
            next: 0,
            origin,
        }
    }

    fn error(&self, reason: impl Into<String>) -> DefectPrepError {
        DefectPrepError::malformed("poscar", self.origin, reason)
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.next).copied()
    }

    fn take(&mut self, what: &str) -> Result<&'a str> {
        let line = self
            .peek()
            .ok_or_else(|| self.error(format!("missing {} (line {})", what, self.next + 1)))?;
        self.next += 1;
        Ok(line)
    }

    fn take_vector(&mut self, what: &str) -> Result<[f64; 3]> {
        let line_no = self.next + 1;
        let line = self.take(what)?;
        parse_triplet(line).ok_or_else(|| self.error(format!("invalid {} at line {}", what, line_no)))
    }
}

/// 从字符串内容解析 POSCAR 格式
///
/// 需要 VASP 5 元素行；支持 Selective dynamics 与 Direct/Cartesian 坐标，
/// Cartesian 坐标乘以缩放因子后转换为分数坐标。
pub fn parse_poscar_content(content: &str, origin: &str) -> Result<Crystal> {
    let mut cursor = LineCursor::new(content, origin);

    let name = cursor.take("comment line")?.trim().to_string();

    let scale_line = cursor.take("scaling factor")?;
    let scale: f64 = scale_line
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| cursor.error(format!("invalid scaling factor '{}'", scale_line.trim())))?;
    if scale <= 0.0 {
        return Err(cursor.error("volume (negative) scaling factors are not supported"));
    }

    let mut matrix = [[0.0; 3]; 3];
    for row in matrix.iter_mut() {
        *row = cursor.take_vector("lattice vector")?.map(|x| x * scale);
    }
    let lattice = Lattice::from_vectors(matrix);

    let species: Vec<String> = cursor
        .take("species line")?
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if species.is_empty() || species.iter().any(|s| s.parse::<f64>().is_ok()) {
        return Err(cursor.error("species line must list element symbols"));
    }

    let counts: Vec<usize> = cursor
        .take("atom counts")?
        .split_whitespace()
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()
        .ok_or_else(|| cursor.error("invalid atom counts"))?;
    if species.len() != counts.len() {
        return Err(cursor.error(format!(
            "{} species but {} atom counts",
            species.len(),
            counts.len()
        )));
    }

    if cursor
        .peek()
        .is_some_and(|l| l.trim_start().starts_with(['S', 's']))
    {
        cursor.next += 1;
    }
    let mode = cursor.take("coordinate mode")?.trim_start();
    let cartesian = mode.starts_with(['C', 'c', 'K', 'k']);

    let mut atoms = Vec::with_capacity(counts.iter().sum());
    for (element, &count) in species.iter().zip(&counts) {
        for _ in 0..count {
            let coords = cursor.take_vector("atom position")?;
            let position = if cartesian {
                cart_to_frac(coords.map(|x| x * scale), &lattice)
            } else {
                coords
            };
            atoms.push(Atom::new(element.as_str(), position));
        }
    }

    Ok(Crystal::new(name, lattice, atoms))
}

/// 读取一行中的前三个浮点数（忽略其后的选择性动力学标记）
fn parse_triplet(line: &str) -> Option<[f64; 3]> {
    let mut it = line.split_whitespace().map(|s| s.parse::<f64>().ok());
    Some([it.next()??, it.next()??, it.next()??])
}

/// 笛卡尔坐标转分数坐标（行向量约定: cart = frac · M）
fn cart_to_frac(cart: [f64; 3], lattice: &Lattice) -> [f64; 3] {
    let m = lattice.matrix;
    let det = lattice.volume();
    if det.abs() < 1e-10 {
        return cart;
    }

    // M⁻¹ 的列 j 由 M 其余两行的叉积给出
    let cross = |a: [f64; 3], b: [f64; 3]| {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    };
    let dot = |a: [f64; 3], b: [f64; 3]| a[0] * b[0] + a[1] * b[1] + a[2] * b[2];

    [
        dot(cart, cross(m[1], m[2])) / det,
        dot(cart, cross(m[2], m[0])) / det,
        dot(cart, cross(m[0], m[1])) / det,
    ]
}

/// 将 Crystal 转换为 POSCAR 格式字符串
///
/// 元素按首次出现顺序分组，坐标统一写为 Direct。
pub fn to_poscar_string(crystal: &Crystal) -> String {
    let composition = crystal.composition();
    let mut out = String::new();

    let row = |v: &[f64; 3]| format!("  {:16.10}  {:16.10}  {:16.10}\n", v[0], v[1], v[2]);

    out.push_str(&crystal.name);
    out.push_str("\n1.0\n");
    for v in &crystal.lattice.matrix {
        out.push_str(&row(v));
    }

    let symbols: Vec<&str> = composition.iter().map(|(el, _)| el.as_str()).collect();
    let counts: Vec<String> = composition.iter().map(|(_, n)| n.to_string()).collect();
    out.push_str(&format!("   {}\n   {}\nDirect\n", symbols.join("   "), counts.join("   ")));

    for (element, _) in &composition {
        for atom in crystal.atoms.iter().filter(|a| &a.element == element) {
            out.push_str(&row(&atom.position));
        }
    }

    out
}

/// 写入 POSCAR 文件
pub fn write_poscar_file(path: &Path, crystal: &Crystal) -> Result<()> {
    fs::write(path, to_poscar_string(crystal)).map_err(|e| DefectPrepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let crystal = parse_poscar_content(content, "NaCl").unwrap();
        assert_eq!(crystal.name, "NaCl");
        assert_eq!(crystal.atoms.len(), 8);
        assert_eq!(crystal.count_of("Na"), 4);
        assert_eq!(crystal.count_of("Cl"), 4);
    }

    #[test]
    fn test_parse_poscar_cartesian_with_scale() {
        let content = r#"Si
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Si
2
Cartesian
0.0 0.0 0.0
1.0 1.0 1.0
"#;
        let crystal = parse_poscar_content(content, "Si").unwrap();

        // 2.0 * 2.0 = 4.0
        assert!((crystal.lattice.matrix[0][0] - 4.0).abs() < 1e-9);
        for x in crystal.atoms[1].position {
            assert!((x - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_poscar_round_trip() {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        let atoms = vec![
            Atom::new("O", [0.5, 0.5, 0.0]),
            Atom::new("Ti", [0.0, 0.0, 0.0]),
            Atom::new("O", [0.5, 0.0, 0.5]),
        ];
        let crystal = Crystal::new("TiO2", lattice, atoms);

        let parsed = parse_poscar_content(&to_poscar_string(&crystal), "round_trip").unwrap();

        assert_eq!(parsed.atoms.len(), 3);
        assert_eq!(parsed.formula(), "O2 Ti1");
        assert_eq!(parsed.atoms[1].position, [0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_parse_poscar_selective_dynamics() {
        let content = r#"Fe with selective
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
2
Selective dynamics
Direct
0.0 0.0 0.0 T T T
0.5 0.5 0.5 F F F
"#;
        let crystal = parse_poscar_content(content, "Fe").unwrap();
        assert_eq!(crystal.atoms.len(), 2);
    }

    #[test]
    fn test_truncated_positions_rejected() {
        let content = "Fe\n1.0\n2.87 0 0\n0 2.87 0\n0 0 2.87\nFe\n3\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        let err = parse_poscar_content(content, "Fe").unwrap_err();
        assert_eq!(err.kind(), "MalformedInputError");
    }

    #[test]
    fn test_vasp4_counts_line_rejected() {
        let content = "X\n1.0\n1 0 0\n0 1 0\n0 0 1\n2\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        let err = parse_poscar_content(content, "X").unwrap_err();
        assert_eq!(err.kind(), "MalformedInputError");
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let content = "X\n1.0\n1 0 0\n0 1 0\n0 0 1\nPb O\n1\nDirect\n0 0 0\n";
        assert!(parse_poscar_content(content, "X").is_err());
    }
}
