//! 完整流程
//!
//! 切割偵測 → 分段 → 編碼 → 暫停點偵測 → 產生播放頁面

mod main;
mod toolchain;

pub use main::{BuildSummary, LectureBuilder};
pub use toolchain::Toolchain;
