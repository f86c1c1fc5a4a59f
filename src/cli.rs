use clap::Parser;
use std::path::PathBuf;

/// 依標誌自動切割講課影片，產生可導覽的播放頁面
#[derive(Debug, Parser)]
#[command(name = "lecture_segmenter")]
#[command(author, version, about)]
pub struct Cli {
    /// 顯示執行的 ffmpeg/ffprobe 命令
    #[arg(short, long)]
    pub verbose: bool,

    /// 設定檔路徑（預設為目前目錄的 settings.json）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 切割標誌：`<ul|ur|ll|lr|x=a..b,y=c..d>:<logo.png>`
    #[arg(long, value_name = "REGION:LOGO")]
    pub split_at: Option<String>,

    /// 暫停標誌，格式同 --split-at
    #[arg(long, value_name = "REGION:LOGO")]
    pub stop_at: Option<String>,

    /// 目錄檔：第一段為標題，之後每段對應一個區段（以空白行分隔）
    #[arg(long, value_name = "FILE")]
    pub toc: Option<PathBuf>,

    /// 頁面引用的 CSS 位址
    #[arg(long, value_name = "HREF")]
    pub css_href: Option<String>,

    /// 輸出資料夾（預設為 <影片所在資料夾>/<影片名稱>）
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// 同時偵測暫停標誌的最大程序數
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// 要處理的影片檔
    pub input: PathBuf,
}
