use crate::error::{PipelineError, Result};

/// ffprobe 每個影格輸出的一行：`frame,<秒數>[,<x>,<y>]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub timestamp: f64,
    /// 找到標誌時的左上角座標
    pub position: Option<(u32, u32)>,
}

impl FrameSample {
    #[must_use]
    pub const fn no_match(timestamp: f64) -> Self {
        Self {
            timestamp,
            position: None,
        }
    }

    #[must_use]
    pub const fn matched(timestamp: f64, x: u32, y: u32) -> Self {
        Self {
            timestamp,
            position: Some((x, y)),
        }
    }

    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.position.is_some()
    }
}

/// 解析一行偵測輸出，`line_number` 從 1 起算，僅用於錯誤訊息
pub fn parse_telemetry_line(line: &str, line_number: usize) -> Result<FrameSample> {
    let malformed = || PipelineError::MalformedTelemetryLine {
        line_number,
        line: line.to_string(),
    };

    let mut fields = line.trim().split(',');
    if fields.next() != Some("frame") {
        return Err(malformed());
    }

    let timestamp = fields
        .next()
        .and_then(|t| t.trim().parse::<f64>().ok())
        .filter(|t| t.is_finite())
        .ok_or_else(malformed)?;

    // csv 輸出在沒有 tag 時可能留下空欄位
    let coords: Vec<&str> = fields.map(str::trim).filter(|f| !f.is_empty()).collect();
    match coords.as_slice() {
        [] => Ok(FrameSample::no_match(timestamp)),
        [x, y] => {
            let x = x.parse().map_err(|_| malformed())?;
            let y = y.parse().map_err(|_| malformed())?;
            Ok(FrameSample::matched(timestamp, x, y))
        }
        _ => Err(malformed()),
    }
}
