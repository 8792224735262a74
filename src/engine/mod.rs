//! # 缺陷准备核心引擎
//!
//! 结构修改、INCAR 批量编辑与一致性比较。所有函数只读共享的参考数据，
//! 每个文件夹使用自己的副本，可安全地并行调用。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/`, `parsers/`
//! - 子模块: modifier, editor, diff

pub mod diff;
pub mod editor;
pub mod modifier;

pub use diff::{diff_parameters, DiffEntry, DiffReport};
pub use editor::{apply_edits, Change, EditOp};
pub use modifier::apply_modification;
