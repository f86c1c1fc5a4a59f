use env_logger::Env;

/// 初始化日誌；`RUST_LOG` 優先於 `verbose`
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();
}
