use std::path::{Path, PathBuf};
use std::process::Command;

pub const SEGMENT_FILE_PREFIX: &str = "segment";
pub const SEGMENT_FILE_EXTENSION: &str = "mp4";

/// 第 `index` 段（從 1 起算）的輸出檔名
#[must_use]
pub fn segment_file_name(index: usize) -> String {
    format!("{SEGMENT_FILE_PREFIX}{index}.{SEGMENT_FILE_EXTENSION}")
}

/// 擷取並重新編碼一個區段的 ffmpeg 命令
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCommand {
    index: usize,
    source_path: PathBuf,
    destination_path: PathBuf,
    start: f64,
    end: f64,
}

impl SegmentCommand {
    #[must_use]
    pub fn new(source_path: &Path, output_dir: &Path, index: usize, start: f64, end: f64) -> Self {
        Self {
            index,
            source_path: source_path.to_path_buf(),
            destination_path: output_dir.join(segment_file_name(index)),
            start,
            end,
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// 固定的編碼設定：x264 CRF 23、AAC 64k，每段從關鍵影格開始
    #[must_use]
    pub fn build_command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);

        cmd.args([
            "-hide_banner",
            "-nostdin",
            "-loglevel", "error",
            "-stats",
            "-y",
            "-ss", &format!("{:.2}", self.start),
            "-to", &format!("{:.2}", self.end),
            "-i",
        ]);
        cmd.arg(&self.source_path);
        cmd.args([
            "-c:v", "libx264",
            "-crf", "23",
            "-preset", "medium",
            "-tune", "stillimage",
            "-c:a", "aac",
            "-b:a", "64k",
            "-movflags", "+faststart",
        ]);
        cmd.arg(&self.destination_path);

        cmd
    }
}
