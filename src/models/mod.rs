//! # 数据模型模块
//!
//! 定义晶体结构、INCAR 参数集合、缺陷修改描述和作业状态。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `engine/` 和 `commands/` 使用
//! - 子模块: structure, parameters, modification, calculation

pub mod calculation;
pub mod modification;
pub mod parameters;
pub mod structure;

pub use calculation::JobStatus;
pub use modification::{ModificationLog, ModificationSpec};
pub use parameters::{ParamValue, ParameterSet};
pub use structure::{Atom, Crystal, Lattice};
