use crate::component::logo_region::LogoSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 未指定時尋找的切割標誌
pub const DEFAULT_SPLIT_AT: &str = "ll:splitlogo.png";
/// 未指定時尋找的暫停標誌
pub const DEFAULT_STOP_AT: &str = "ll:stoplogo.png";
/// 目錄檔名稱為 `<影片名稱><DEFAULT_TOC_SUFFIX>`
pub const DEFAULT_TOC_SUFFIX: &str = "-toc.txt";
/// 標誌與目錄除了影片所在資料夾外，也會在這個子資料夾中尋找
pub const TOC_SUBDIRECTORY: &str = "toc";

/// `settings.json` 的內容，所有欄位都可省略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub split_at: Option<String>,
    pub stop_at: Option<String>,
    pub css_href: Option<String>,
    pub max_stop_workers: Option<usize>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            split_at: None,
            stop_at: None,
            css_href: None,
            max_stop_workers: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: UserSettings,
}

/// 一次執行所需的全部參數（命令列與設定檔合併後的結果）
#[derive(Debug, Clone, PartialEq)]
pub struct LectureJob {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// 影片名稱，沒有目錄檔時作為標題
    pub title: String,
    /// 標誌路徑已換成實際找到的檔案
    pub split: Option<LogoSpec>,
    pub stop: Option<LogoSpec>,
    pub toc: Option<PathBuf>,
    pub css_href: Option<String>,
    pub workers: Option<usize>,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub verbose: bool,
}
