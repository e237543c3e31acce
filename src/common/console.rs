use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use colored::*;
use indicatif::ProgressBar;

struct ConsoleInner {
    out: Box<dyn Write + Send>,
    err: Option<Box<dyn Write + Send>>, // 未设置时错误行也写到 out
    bar: Option<ProgressBar>,
}

/// 面向用户的输出（所有并发任务共享同一个输出流）
///
/// 每一行都在持锁期间完整写出，多个下载任务的进度行不会互相穿插。
/// 挂载了进度条时，写出前会先挂起进度条，避免把进度条冲乱。
/// `error` 输出的行写到单独的错误流（命令行下是 stderr）。
pub struct Console {
    inner: Mutex<ConsoleInner>,
}

impl Console {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(ConsoleInner {
                out: Box::new(out),
                err: None,
                bar: None,
            }),
        }
    }

    pub fn with_error_sink(
        out: impl Write + Send + 'static,
        err: impl Write + Send + 'static,
    ) -> Self {
        let console = Self::new(out);
        console.lock().err = Some(Box::new(err));
        console
    }

    /// 普通输出走 stdout，错误走 stderr
    pub fn stdout() -> Self {
        Self::with_error_sink(std::io::stdout(), std::io::stderr())
    }

    fn lock(&self) -> MutexGuard<'_, ConsoleInner> {
        // 某个任务在持锁时 panic 不应让其他任务再也无法输出
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 原样输出一行
    pub fn line(&self, message: impl AsRef<str>) {
        self.write_line(message.as_ref(), false);
    }

    fn write_line(&self, message: &str, to_error: bool) {
        let mut guard = self.lock();
        let ConsoleInner { out, err, bar } = &mut *guard;
        let sink: &mut Box<dyn Write + Send> = match err {
            Some(err) if to_error => err,
            _ => out,
        };
        let result = match bar {
            Some(bar) => bar.suspend(|| writeln!(sink, "{}", message)),
            None => writeln!(sink, "{}", message),
        };
        if result.is_ok() {
            let _ = sink.flush();
        }
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.line(format!("{} {}", "✓".green().bold(), message.as_ref()));
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.line(format!("{} {}", "ℹ".blue().bold(), message.as_ref()));
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.line(format!("{} {}", "⚠".yellow().bold(), message.as_ref()));
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.write_line(&format!("{} {}", "✗".red().bold(), message.as_ref()), true);
    }

    pub fn waiting(&self, message: impl AsRef<str>) {
        self.line(format!("{} {}", "⏳".yellow().bold(), message.as_ref()));
    }

    pub fn step(&self, step: impl AsRef<str>) {
        self.line(format!("\n{} {}", "▶".cyan().bold(), step.as_ref().bold()));
    }

    pub fn separator(&self) {
        self.line("=".repeat(60));
    }

    /// 下载期间挂载总进度条
    pub fn attach_progress(&self, bar: ProgressBar) {
        self.lock().bar = Some(bar);
    }

    pub fn detach_progress(&self) -> Option<ProgressBar> {
        self.lock().bar.take()
    }
}
