use log::{debug, info};
use std::process::Command;

/// 外部命令的追蹤輸出
///
/// `verbose` 開啟時命令以 info 等級印出，否則只在 debug 等級可見。
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTracer {
    verbose: bool,
}

impl CommandTracer {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn trace(&self, command: &Command) {
        let line = describe_command(command);
        if self.verbose {
            info!("##: {line}");
        } else {
            debug!("##: {line}");
        }
    }
}

/// 將命令轉為可閱讀的單行字串（用於日誌與錯誤訊息）
#[must_use]
pub fn describe_command(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().to_string()];
    parts.extend(command.get_args().map(|arg| {
        let arg = arg.to_string_lossy();
        if arg.is_empty() || arg.contains(char::is_whitespace) {
            format!("\"{arg}\"")
        } else {
            arg.to_string()
        }
    }));
    parts.join(" ")
}
