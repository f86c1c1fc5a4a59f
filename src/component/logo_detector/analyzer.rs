use super::telemetry::{FrameSample, parse_telemetry_line};
use crate::component::logo_region::{LogoReference, SearchRegion};
use crate::error::{PipelineError, Result};
use crate::tools::{CommandTracer, CrLfLines, describe_command, spawn_stderr_collector};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

/// find_rect 的匹配門檻（越小越嚴格）
pub const MATCH_THRESHOLD: f64 = 0.2;

/// 單向、延遲產生的影格序列
pub type FrameStream<'a> = Box<dyn Iterator<Item = Result<FrameSample>> + Send + 'a>;

/// 一次偵測所需的參數
#[derive(Debug, Clone, Copy)]
pub struct AnalysisJob<'a> {
    pub logo: &'a PreparedLogo,
    pub region: SearchRegion,
    pub video: &'a Path,
    /// 設定後串流會終止子程序並回傳 [`PipelineError::Cancelled`]
    pub cancel: &'a AtomicBool,
}

/// 逐格比對標誌的外部分析器
pub trait FrameAnalyzer: Send + Sync {
    /// 將標誌轉成分析器可用的格式，`work_dir` 放暫存檔
    fn prepare_logo(&self, logo: &LogoReference, work_dir: &Path) -> Result<PreparedLogo>;

    fn analyze<'a>(&'a self, job: &AnalysisJob<'a>) -> Result<FrameStream<'a>>;

    /// 錯誤訊息中代表這次偵測的命令列
    fn describe(&self, job: &AnalysisJob<'_>) -> String {
        format!("analyze {}", job.video.display())
    }
}

/// 準備好的標誌檔；若是暫存檔，離開作用域時刪除
#[derive(Debug)]
pub struct PreparedLogo {
    path: PathBuf,
    temporary: bool,
}

impl PreparedLogo {
    /// 直接使用現有檔案，不會刪除
    #[must_use]
    pub fn existing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: false,
        }
    }

    #[must_use]
    pub fn temporary(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            temporary: true,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PreparedLogo {
    fn drop(&mut self) {
        if self.temporary && self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("無法刪除暫存標誌 {}: {e}", self.path.display());
            }
        }
    }
}

/// 以 ffprobe + lavfi find_rect 濾鏡實作的分析器
#[derive(Debug, Clone)]
pub struct FindRectAnalyzer {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    tracer: CommandTracer,
}

impl FindRectAnalyzer {
    #[must_use]
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>, tracer: CommandTracer) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            tracer,
        }
    }

    #[must_use]
    pub fn build_command(&self, job: &AnalysisJob<'_>) -> Command {
        let r = job.region;
        let graph = format!(
            "movie={},find_rect=object={}:threshold={MATCH_THRESHOLD}:xmin={}:xmax={}:ymin={}:ymax={}",
            escape_filter_value(&job.video.to_string_lossy()),
            escape_filter_value(&job.logo.path().to_string_lossy()),
            r.xmin,
            r.xmax,
            r.ymin,
            r.ymax
        );

        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "error", "-f", "lavfi", "-i"])
            .arg(graph)
            .args([
                "-show_entries",
                "frame=pts_time:frame_tags=lavfi.rect.x,lavfi.rect.y",
                "-of",
                "csv",
            ]);
        cmd
    }
}

impl FrameAnalyzer for FindRectAnalyzer {
    fn prepare_logo(&self, logo: &LogoReference, work_dir: &Path) -> Result<PreparedLogo> {
        // find_rect 只接受灰階影像
        let stem = logo
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("logo");
        let pgm_path = work_dir.join(format!("{stem}.pgm"));

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"])
            .arg(&logo.path)
            .args(["-pix_fmt", "gray"])
            .arg(&pgm_path);
        let command = describe_command(&cmd);
        self.tracer.trace(&cmd);

        let output = cmd.output().map_err(|e| PipelineError::DetectorProcessFailed {
            command: command.clone(),
            message: format!("無法執行 ffmpeg: {e}"),
        })?;
        if !output.status.success() {
            return Err(PipelineError::DetectorProcessFailed {
                command,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("已轉換標誌: {}", pgm_path.display());
        Ok(PreparedLogo::temporary(pgm_path))
    }

    fn analyze<'a>(&'a self, job: &AnalysisJob<'a>) -> Result<FrameStream<'a>> {
        let mut cmd = self.build_command(job);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let command = describe_command(&cmd);
        self.tracer.trace(&cmd);

        let mut child = cmd.spawn().map_err(|e| PipelineError::DetectorProcessFailed {
            command: command.clone(),
            message: format!("無法啟動 ffprobe: {e}"),
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take().map(spawn_stderr_collector);
        let Some(stdout) = stdout else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PipelineError::DetectorProcessFailed {
                command,
                message: "無法取得 ffprobe 標準輸出".to_string(),
            });
        };

        Ok(Box::new(FindRectStream {
            child,
            lines: CrLfLines::new(stdout),
            stderr,
            command,
            cancel: job.cancel,
            line_number: 0,
            done: false,
        }))
    }

    fn describe(&self, job: &AnalysisJob<'_>) -> String {
        describe_command(&self.build_command(job))
    }
}

/// 讀取 ffprobe 標準輸出直到結束，之後才檢查結束狀態
struct FindRectStream<'a> {
    child: Child,
    lines: CrLfLines<ChildStdout>,
    stderr: Option<JoinHandle<String>>,
    command: String,
    cancel: &'a AtomicBool,
    line_number: usize,
    done: bool,
}

impl FindRectStream<'_> {
    fn abort(&mut self) {
        self.done = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }

    fn stderr_tail(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    }

    fn finish(&mut self) -> Option<Result<FrameSample>> {
        self.done = true;
        let status = match self.child.wait() {
            Ok(status) => status,
            Err(e) => {
                return Some(Err(PipelineError::DetectorProcessFailed {
                    command: self.command.clone(),
                    message: format!("無法等待 ffprobe 結束: {e}"),
                }));
            }
        };
        let stderr = self.stderr_tail();

        if !status.success() {
            return Some(Err(PipelineError::DetectorProcessFailed {
                command: self.command.clone(),
                message: format!("結束狀態 {status}: {}", stderr.trim()),
            }));
        }
        if self.line_number == 0 {
            return Some(Err(PipelineError::DetectorProcessFailed {
                command: self.command.clone(),
                message: "沒有輸出任何影格資料".to_string(),
            }));
        }
        None
    }
}

impl Iterator for FindRectStream<'_> {
    type Item = Result<FrameSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.cancel.load(Ordering::SeqCst) {
            self.abort();
            return Some(Err(PipelineError::Cancelled));
        }

        match self.lines.next() {
            Some(Ok(line)) => {
                self.line_number += 1;
                let sample = parse_telemetry_line(&line, self.line_number);
                if sample.is_err() {
                    self.abort();
                }
                Some(sample)
            }
            Some(Err(e)) => {
                self.abort();
                Some(Err(PipelineError::DetectorProcessFailed {
                    command: self.command.clone(),
                    message: format!("讀取輸出失敗: {e}"),
                }))
            }
            None => self.finish(),
        }
    }
}

impl Drop for FindRectStream<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.abort();
        }
    }
}

/// 為 lavfi 濾鏡圖跳脫路徑
///
/// 需要兩層：先是濾鏡參數層（`\ ' :`），再是濾鏡圖層（`\ ' [ ] , ;`）。
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    let escape = |input: &str, special: &[char]| {
        let mut out = String::with_capacity(input.len());
        for c in input.chars() {
            if special.contains(&c) {
                out.push('\\');
            }
            out.push(c);
        }
        out
    };
    let option_level = escape(value, &['\\', '\'', ':']);
    escape(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}
