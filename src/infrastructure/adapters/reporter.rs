//! 콘솔 리포터 포트 구현 어댑터.

use std::io::{self, IsTerminal};

use crate::application::ports::Reporter;

/// 콘솔 전용 리포터 어댑터.
pub struct ConsoleReporter {
    colored: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    /// stdout이 TTY일 때만 상태 색상을 사용한다.
    pub fn new() -> Self {
        Self {
            colored: io::stdout().is_terminal(),
        }
    }

    fn scope_label(&self, scope: &str) -> String {
        let padded = format!("{scope:<12}");
        if self.colored {
            colorize_scope(scope, &padded)
        } else {
            padded
        }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, name: &str) {
        println!();
        println!("==================== {} ====================", name);
    }

    fn kv(&self, key: &str, value: &str) {
        println!("{:<12}: {}", key, value);
    }

    fn status(&self, scope: &str, message: &str) {
        println!("[{}] {}", self.scope_label(scope), message);
    }
}

fn colorize_scope(scope: &str, padded: &str) -> String {
    match scope {
        "resolve" | "reply" => format!("\x1b[32m{padded}\x1b[0m"),
        "valuable" => format!("\x1b[36m{padded}\x1b[0m"),
        "prompt" => format!("\x1b[33m{padded}\x1b[0m"),
        _ => padded.to_string(),
    }
}
