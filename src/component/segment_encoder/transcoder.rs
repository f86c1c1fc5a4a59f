use super::ffmpeg_command::SegmentCommand;
use crate::error::{PipelineError, Result};
use crate::tools::{CommandTracer, CrLfLines, LineTail, STDERR_TAIL_LINES, describe_command};
use regex::Regex;
use std::path::PathBuf;
use std::process::{Child, ChildStderr, Stdio};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// 編碼進度（已輸出的影片秒數）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeProgress {
    pub seconds: f64,
}

pub type ProgressStream<'a> = Box<dyn Iterator<Item = Result<EncodeProgress>> + Send + 'a>;

/// 將一個區段重新編碼的外部工具
pub trait Transcoder: Send + Sync {
    /// 開始編碼；串流走完且沒有錯誤才代表輸出檔完成
    fn transcode<'a>(
        &'a self,
        command: &'a SegmentCommand,
        cancel: &'a AtomicBool,
    ) -> Result<ProgressStream<'a>>;
}

static REGEX_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").expect("Invalid regex")
});

/// 從 ffmpeg `-stats` 行取出 `time=HH:MM:SS.cc`
#[must_use]
pub fn parse_progress_time(line: &str) -> Option<f64> {
    let caps = REGEX_TIME.captures(line)?;
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    tracer: CommandTracer,
}

impl FfmpegTranscoder {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, tracer: CommandTracer) -> Self {
        Self {
            program: program.into(),
            tracer,
        }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode<'a>(
        &'a self,
        command: &'a SegmentCommand,
        cancel: &'a AtomicBool,
    ) -> Result<ProgressStream<'a>> {
        let mut cmd = command.build_command(&self.program);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let description = describe_command(&cmd);
        self.tracer.trace(&cmd);

        let mut child = cmd.spawn().map_err(|e| PipelineError::EncodeProcessFailed {
            command: description.clone(),
            message: format!("無法啟動 ffmpeg: {e}"),
        })?;
        let Some(stderr) = child.stderr.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PipelineError::EncodeProcessFailed {
                command: description,
                message: "無法取得 ffmpeg 錯誤輸出".to_string(),
            });
        };

        Ok(Box::new(FfmpegProgress {
            child,
            lines: CrLfLines::new(stderr),
            tail: LineTail::new(STDERR_TAIL_LINES),
            command: description,
            cancel,
            done: false,
        }))
    }
}

/// `-stats` 進度與錯誤訊息都在 stderr，進度行以 `\r` 結尾
struct FfmpegProgress<'a> {
    child: Child,
    lines: CrLfLines<ChildStderr>,
    tail: LineTail,
    command: String,
    cancel: &'a AtomicBool,
    done: bool,
}

impl FfmpegProgress<'_> {
    fn abort(&mut self) {
        self.done = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    fn failed(&self, message: String) -> PipelineError {
        PipelineError::EncodeProcessFailed {
            command: self.command.clone(),
            message,
        }
    }

    fn finish(&mut self) -> Option<Result<EncodeProgress>> {
        self.done = true;
        match self.child.wait() {
            Ok(status) if status.success() => None,
            Ok(status) => Some(Err(self.failed(format!(
                "結束狀態 {status}: {}",
                self.tail.joined()
            )))),
            Err(e) => Some(Err(self.failed(format!("無法等待 ffmpeg 結束: {e}")))),
        }
    }
}

impl Iterator for FfmpegProgress<'_> {
    type Item = Result<EncodeProgress>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if self.cancel.load(Ordering::SeqCst) {
                self.abort();
                return Some(Err(PipelineError::Cancelled));
            }

            match self.lines.next() {
                Some(Ok(line)) => {
                    if let Some(seconds) = parse_progress_time(&line) {
                        return Some(Ok(EncodeProgress { seconds }));
                    }
                    self.tail.push(line);
                }
                Some(Err(e)) => {
                    self.abort();
                    return Some(Err(self.failed(format!("讀取輸出失敗: {e}"))));
                }
                None => return self.finish(),
            }
        }
    }
}

impl Drop for FfmpegProgress<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_time() {
        let line = "frame=  812 fps=203 q=28.0 size=    1024KiB time=00:01:05.24 bitrate= 128.6kbits/s speed=16.3x";
        let seconds = parse_progress_time(line).unwrap();
        assert!((seconds - 65.24).abs() < 1e-9);
    }

    #[test]
    fn test_parse_progress_time_hours() {
        let seconds = parse_progress_time("size=N/A time=01:00:00.50 bitrate=N/A").unwrap();
        assert!((seconds - 3600.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_progress_time_ignores_other_lines() {
        assert_eq!(parse_progress_time("Error opening output file"), None);
        assert_eq!(parse_progress_time("time=N/A"), None);
    }

    #[test]
    fn test_transcode_missing_program() {
        let transcoder = FfmpegTranscoder::new("nonexistent_ffmpeg_xyz", CommandTracer::default());
        let command = SegmentCommand::new(
            std::path::Path::new("/nope.mp4"),
            std::path::Path::new("/tmp"),
            1,
            0.0,
            1.0,
        );
        let cancel = AtomicBool::new(false);
        assert!(matches!(
            transcoder.transcode(&command, &cancel),
            Err(PipelineError::EncodeProcessFailed { .. })
        ));
    }
}
