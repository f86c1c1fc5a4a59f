//! 標誌偵測
//!
//! 由外部分析器逐格比對標誌，再把匹配結果化簡成事件時間點

mod analyzer;
mod main;
mod reducer;
mod telemetry;

pub use analyzer::{
    AnalysisJob, FindRectAnalyzer, FrameAnalyzer, FrameStream, MATCH_THRESHOLD, PreparedLogo,
    escape_filter_value,
};
pub use main::LogoDetector;
pub use reducer::{
    DetectionProgress, EventReducer, PROGRESS_INTERVAL_SECONDS, TAIL_MERGE_SECONDS, reduce_samples,
};
pub use telemetry::{FrameSample, parse_telemetry_line};
