//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY: one spinner per running stage (page walks, file scans).
//! Non-TTY: hidden bars, log lines are the only progress signal.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Central progress context managing the spinners.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    /// Context that never draws, for tests and library callers.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: false,
        }
    }

    /// Spinner line for one stage. Update with `set_message`, stop with `finish`.
    pub fn stage_line(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) =
            ProgressStyle::with_template("{spinner:.green} {prefix:<12.cyan.bold} {wide_msg}")
        {
            pb.set_style(style);
        }
        pb.set_prefix(name.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Print a line above managed spinners.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedProgress = Arc<ProgressContext>;

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_num_small() {
        assert_eq!(fmt_num(0), "0");
        assert_eq!(fmt_num(999), "999");
    }

    #[test]
    fn fmt_num_groups() {
        assert_eq!(fmt_num(1_000), "1,000");
        assert_eq!(fmt_num(300_000), "300,000");
        assert_eq!(fmt_num(1_234_567), "1,234,567");
    }

    #[test]
    fn hidden_context_is_not_tty() {
        let ctx = ProgressContext::hidden();
        assert!(!ctx.is_tty());
        assert!(ctx.stage_line("walk").is_hidden());
    }
}
