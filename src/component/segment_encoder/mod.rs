//! 區段編碼
//!
//! 使用 ffmpeg 將每個區段重新編碼為 H.264/AAC

mod ffmpeg_command;
mod main;
mod transcoder;

pub use ffmpeg_command::{
    SEGMENT_FILE_EXTENSION, SEGMENT_FILE_PREFIX, SegmentCommand, segment_file_name,
};
pub use main::SegmentEncoder;
pub use transcoder::{
    EncodeProgress, FfmpegTranscoder, ProgressStream, Transcoder, parse_progress_time,
};
