//! # 美化输出工具
//!
//! 提供统一的终端输出样式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored`, `console` crate

use colored::Colorize;

/// 缺失值占位符
pub const DASH: &str = "—";

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印单个文件夹的失败（含错误类别）
pub fn print_failure(folder: &str, kind: &str, msg: &str) {
    eprintln!(
        "{} {:<25} {} {}",
        "[ERR]".red().bold(),
        folder,
        format!("[{}]", kind).red(),
        msg
    );
}

/// 打印修改消息
pub fn print_change(folder: &str, key: &str, before: &str, after: &str) {
    println!(
        "{} {:<25} {}={} {} {}",
        "[EDIT]".cyan().bold(),
        folder,
        key,
        before.dimmed(),
        "->".cyan(),
        after
    );
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// 终端宽度（非终端时为 120）
pub fn terminal_width() -> usize {
    let (_, cols) = console::Term::stdout().size();
    if console::Term::stdout().is_term() && cols > 0 {
        cols as usize
    } else {
        120
    }
}
