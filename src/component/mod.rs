//! 功能元件模組
//!
//! 依流程順序：搜尋區域 → 標誌偵測 → 分段規劃 → 區段編碼 → 暫停點標註 → 播放頁面

pub mod lecture_builder;
pub mod logo_detector;
pub mod logo_region;
pub mod playback_page;
pub mod segment_encoder;
pub mod segment_planner;
pub mod stop_annotator;

pub use lecture_builder::{BuildSummary, LectureBuilder, Toolchain};
pub use logo_detector::LogoDetector;
pub use playback_page::PlaybackPageBuilder;
pub use segment_encoder::SegmentEncoder;
pub use stop_annotator::StopAnnotator;
