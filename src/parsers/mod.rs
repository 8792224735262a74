//! # 解析器模块
//!
//! 提供 VASP 输入/输出文件的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `engine/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, incar, potcar, outcar

pub mod incar;
pub mod outcar;
pub mod poscar;
pub mod potcar;

pub use potcar::ValenceTable;
