use indicatif::{ProgressBar, ProgressStyle};

/// 已知總量的進度條
#[must_use]
pub fn progress_bar(len: u64) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    progress_bar
}

/// 總量未知時使用（例如逐格偵測）
#[must_use]
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {prefix} {msg}")
            .expect("Invalid spinner template"),
    );
    spinner.set_prefix(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}
