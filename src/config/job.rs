use crate::cli::Cli;
use crate::component::logo_region::LogoSpec;
use crate::config::types::{
    DEFAULT_SPLIT_AT, DEFAULT_STOP_AT, DEFAULT_TOC_SUFFIX, LectureJob, TOC_SUBDIRECTORY,
    UserSettings,
};
use crate::tools::{find_in_dirs, validate_file_exists};
use anyhow::{Context, Result, bail};
use log::debug;
use std::path::{Path, PathBuf};

impl LectureJob {
    /// 合併命令列與設定檔；命令列優先
    ///
    /// 標誌與目錄會在影片所在資料夾及其 `toc/` 子資料夾中尋找。
    /// 明確指定但找不到的檔案是錯誤；預設的標誌或目錄找不到則直接略過。
    pub fn from_cli(cli: &Cli, settings: &UserSettings) -> Result<Self> {
        validate_file_exists(&cli.input)?;

        let input_dir = match cli.input.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let title = cli
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "lecture".to_string());
        let search_dirs = [input_dir.clone(), input_dir.join(TOC_SUBDIRECTORY)];

        let split = resolve_logo(
            cli.split_at.as_deref().or(settings.split_at.as_deref()),
            DEFAULT_SPLIT_AT,
            &search_dirs,
            "--split-at",
        )?;
        let stop = resolve_logo(
            cli.stop_at.as_deref().or(settings.stop_at.as_deref()),
            DEFAULT_STOP_AT,
            &search_dirs,
            "--stop-at",
        )?;

        let toc = match &cli.toc {
            Some(path) => Some(
                find_in_dirs(path, &search_dirs)
                    .with_context(|| format!("找不到目錄檔: {}", path.display()))?,
            ),
            None => find_in_dirs(
                Path::new(&format!("{title}{DEFAULT_TOC_SUFFIX}")),
                &search_dirs,
            ),
        };

        Ok(Self {
            output_dir: cli.out.clone().unwrap_or_else(|| input_dir.join(&title)),
            input: cli.input.clone(),
            title,
            split,
            stop,
            toc,
            css_href: cli.css_href.clone().or_else(|| settings.css_href.clone()),
            workers: cli.workers.or(settings.max_stop_workers),
            ffmpeg_path: settings.ffmpeg_path.clone(),
            ffprobe_path: settings.ffprobe_path.clone(),
            verbose: cli.verbose,
        })
    }
}

fn resolve_logo(
    explicit: Option<&str>,
    default: &str,
    search_dirs: &[PathBuf],
    option: &str,
) -> Result<Option<LogoSpec>> {
    let by_default = explicit.is_none();
    let text = explicit.unwrap_or(default);
    let mut spec: LogoSpec = text.parse().with_context(|| format!("{option} 設定錯誤"))?;

    match find_in_dirs(&spec.logo_path, search_dirs) {
        Some(found) => {
            spec.logo_path = found;
            Ok(Some(spec))
        }
        None if by_default => {
            debug!("未找到預設標誌 {}，略過 {option}", spec.logo_path.display());
            Ok(None)
        }
        None => bail!("{option}: 找不到標誌檔 {}", spec.logo_path.display()),
    }
}
