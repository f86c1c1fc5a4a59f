use super::command_trace::{CommandTracer, describe_command};
use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
}

/// 影片長度、解析度與圖片尺寸的探測介面
///
/// 正式環境由 [`FfprobeProbe`] 實作；測試可換成固定值。
pub trait MediaProbe: Send + Sync {
    fn video_info(&self, path: &Path) -> Result<VideoInfo>;

    /// 回傳 (寬, 高)
    fn image_size(&self, path: &Path) -> Result<(u32, u32)>;
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片資訊
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    program: PathBuf,
    tracer: CommandTracer,
}

impl FfprobeProbe {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, tracer: CommandTracer) -> Self {
        Self {
            program: program.into(),
            tracer,
        }
    }

    fn run(&self, path: &Path) -> Result<(String, FfprobeOutput)> {
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path);
        let command = describe_command(&cmd);
        self.tracer.trace(&cmd);

        let output = cmd.output().map_err(|e| PipelineError::ProbeFailed {
            command: command.clone(),
            message: format!("無法執行 ffprobe: {e}"),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::ProbeFailed {
                command,
                message: format!("結束狀態 {}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let probe = parse_ffprobe_json(&stdout).map_err(|message| PipelineError::ProbeFailed {
            command: command.clone(),
            message,
        })?;
        Ok((command, probe))
    }
}

impl MediaProbe for FfprobeProbe {
    fn video_info(&self, path: &Path) -> Result<VideoInfo> {
        let (command, probe) = self.run(path)?;
        video_info_from(&probe).map_err(|message| PipelineError::ProbeFailed { command, message })
    }

    fn image_size(&self, path: &Path) -> Result<(u32, u32)> {
        let (command, probe) = self.run(path)?;
        dimensions_of(&probe)
            .map_err(|message| PipelineError::ProbeFailed { command, message })
    }
}

fn parse_ffprobe_json(raw: &str) -> std::result::Result<FfprobeOutput, String> {
    serde_json::from_str(raw).map_err(|e| format!("無法解析 ffprobe 輸出: {e}"))
}

fn video_stream(probe: &FfprobeOutput) -> std::result::Result<&StreamInfo, String> {
    probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| "找不到視訊串流".to_string())
}

fn dimensions_of(probe: &FfprobeOutput) -> std::result::Result<(u32, u32), String> {
    let stream = video_stream(probe)?;
    let width = stream.width.ok_or("無法取得寬度")?;
    let height = stream.height.ok_or("無法取得高度")?;
    Ok((width, height))
}

fn video_info_from(probe: &FfprobeOutput) -> std::result::Result<VideoInfo, String> {
    let stream = video_stream(probe)?;
    let (width, height) = dimensions_of(probe)?;

    // 優先從 format 取得長度，其次從 stream
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(stream.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or("無法取得影片長度")?;

    Ok(VideoInfo {
        duration_seconds,
        width,
        height,
    })
}
