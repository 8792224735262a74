//! # 文件夹收集器
//!
//! 枚举根目录下的缺陷文件夹。
//!
//! ## 功能
//! - 仅收集一级子目录，按名称排序
//! - 跳过以排除前缀开头的文件夹（默认 `z`，如 `z_input`）
//! - 可选 glob 名称过滤与必需文件检查
//!
//! ## 依赖关系
//! - 被所有 `commands/` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配名称

use crate::error::{DefectPrepError, Result};
use glob::Pattern;
use std::path::PathBuf;
use walkdir::WalkDir;

/// 收集到的文件夹
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub name: String,
    pub path: PathBuf,
}

/// 文件夹收集器
pub struct FolderCollector {
    /// 根目录
    root: PathBuf,
    /// 名称过滤
    pattern: Option<Pattern>,
    /// 排除前缀
    exclude_prefix: Option<String>,
    /// 必需文件
    required_file: Option<String>,
}

/// 收集结果：保留的文件夹与被跳过的文件夹（含原因）
#[derive(Debug, Default)]
pub struct Collected {
    pub folders: Vec<Folder>,
    pub skipped: Vec<(String, String)>,
}

impl FolderCollector {
    /// 创建新的文件夹收集器
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: None,
            exclude_prefix: None,
            required_file: None,
        }
    }

    /// 设置名称匹配模式
    pub fn with_pattern(mut self, pattern: Option<&str>) -> Result<Self> {
        self.pattern = pattern
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    DefectPrepError::InvalidArgument(format!("invalid pattern '{}': {}", p, e))
                })
            })
            .transpose()?;
        Ok(self)
    }

    /// 设置排除前缀（空字符串表示不排除）
    pub fn exclude_prefix(mut self, prefix: &str) -> Self {
        self.exclude_prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    /// 只保留包含该文件的文件夹
    pub fn require_file(mut self, file: &str) -> Self {
        self.required_file = Some(file.to_string());
        self
    }

    /// 收集所有匹配的文件夹
    pub fn collect(&self) -> Result<Collected> {
        if !self.root.is_dir() {
            return Err(DefectPrepError::DirectoryNotFound {
                path: self.root.display().to_string(),
            });
        }

        let mut entries: Vec<Folder> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| Folder {
                name: e.file_name().to_string_lossy().to_string(),
                path: e.path().to_path_buf(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let mut collected = Collected::default();
        for folder in entries {
            if let Some(pattern) = &self.pattern {
                if !pattern.matches(&folder.name) {
                    continue;
                }
            }
            if let Some(prefix) = &self.exclude_prefix {
                if folder.name.starts_with(prefix.as_str()) {
                    collected
                        .skipped
                        .push((folder.name, format!("starts with '{}'", prefix)));
                    continue;
                }
            }
            if let Some(file) = &self.required_file {
                if !folder.path.join(file).is_file() {
                    collected.skipped.push((folder.name, format!("no {}", file)));
                    continue;
                }
            }
            collected.folders.push(folder);
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in ["v_O", "La_Pb", "z_input", "Mo_W"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("La_Pb").join("INCAR"), "ENCUT = 520\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        dir
    }

    #[test]
    fn test_collect_sorted_and_excluded() {
        let dir = setup();
        let collected = FolderCollector::new(dir.path())
            .exclude_prefix("z")
            .collect()
            .unwrap();

        let names: Vec<&str> = collected.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["La_Pb", "Mo_W", "v_O"]);
        assert_eq!(collected.skipped.len(), 1);
        assert_eq!(collected.skipped[0].0, "z_input");
    }

    #[test]
    fn test_required_file_and_pattern() {
        let dir = setup();
        let collected = FolderCollector::new(dir.path())
            .exclude_prefix("z")
            .require_file("INCAR")
            .collect()
            .unwrap();
        assert_eq!(collected.folders.len(), 1);
        assert_eq!(collected.folders[0].name, "La_Pb");

        let collected = FolderCollector::new(dir.path())
            .with_pattern(Some("*_W"))
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(collected.folders.len(), 1);
        assert_eq!(collected.folders[0].name, "Mo_W");
    }

    #[test]
    fn test_missing_root() {
        let err = FolderCollector::new("/nonexistent/defect/root").collect().unwrap_err();
        assert_eq!(err.kind(), "MissingInput");
    }
}
