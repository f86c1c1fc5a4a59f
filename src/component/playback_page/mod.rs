//! 播放頁面
//!
//! 產生單一 HTML 頁面：切換區段的目錄表，以及在暫停點自動暫停的腳本

mod main;
mod template;
mod toc;

pub use main::{PAGE_FILE_NAME, PlaybackPage, PlaybackPageBuilder};
pub use template::{
    PLAYBACK_RATES, PageContent, SKIP_SECONDS, STOP_PAUSE_WINDOW_SECONDS, render_page,
};
pub use toc::{TableOfContents, read_toc};
