mod job;
pub mod load;
pub mod types;

pub use load::SETTINGS_FILE_NAME;
pub use types::{
    Config, DEFAULT_SPLIT_AT, DEFAULT_STOP_AT, DEFAULT_TOC_SUFFIX, LectureJob, TOC_SUBDIRECTORY,
    UserSettings,
};
