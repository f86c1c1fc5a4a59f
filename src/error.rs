//! 流程錯誤型別
//!
//! 函式庫層回傳 [`PipelineError`]，應用層（`main`、`LectureBuilder`）再以
//! `anyhow` 補上階段名稱。

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// `x=..,y=..` 形式的區域設定無法解析或上下界顛倒
    #[error("無效的搜尋區域 `{spec}`: {reason}")]
    InvalidRegionSpec { spec: String, reason: String },

    #[error("未知的角落代碼 `{0}`（必須是 ul、ur、ll、lr 或 x=xmin..xmax,y=ymin..ymax）")]
    UnknownCornerCode(String),

    /// `<region>:<logo.png>` 整體格式錯誤
    #[error("無效的標誌設定 `{spec}`: {reason}")]
    InvalidLogoSpec { spec: String, reason: String },

    #[error("偵測程序失敗 [{command}]: {message}")]
    DetectorProcessFailed { command: String, message: String },

    #[error("無法解析偵測輸出第 {line_number} 行: `{line}`")]
    MalformedTelemetryLine { line_number: usize, line: String },

    #[error("編碼程序失敗 [{command}]: {message}")]
    EncodeProcessFailed { command: String, message: String },

    #[error("ffprobe 探測失敗 [{command}]: {message}")]
    ProbeFailed { command: String, message: String },

    #[error("區段邊界無效: {0}")]
    InvalidBoundaries(String),

    #[error("操作已取消")]
    Cancelled,

    #[error("檔案不存在: {}", .0.display())]
    MissingFile(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// 是否因中斷信號（而非自身失敗）而結束
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
