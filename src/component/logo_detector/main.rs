use super::analyzer::{AnalysisJob, FrameAnalyzer, PreparedLogo};
use super::reducer::{DetectionProgress, EventReducer};
use crate::component::logo_region::{LogoReference, SearchRegion};
use crate::error::{PipelineError, Result};
use indicatif::ProgressBar;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 在影片中尋找標誌出現的時間點
pub struct LogoDetector {
    analyzer: Arc<dyn FrameAnalyzer>,
    cancel: Arc<AtomicBool>,
}

impl LogoDetector {
    pub fn new(analyzer: Arc<dyn FrameAnalyzer>, cancel: Arc<AtomicBool>) -> Self {
        Self { analyzer, cancel }
    }

    pub fn prepare_logo(&self, logo: &LogoReference, work_dir: &Path) -> Result<PreparedLogo> {
        self.analyzer.prepare_logo(logo, work_dir)
    }

    /// 掃描整部影片，回傳每段連續匹配的起始時間
    ///
    /// `include_sentinels` 為真時結果會以 0.0 開頭、以影片結尾收尾，
    /// 可以直接當作分段邊界。進度每 5 秒（影片時間）更新一次 `progress`。
    pub fn detect(
        &self,
        logo: &PreparedLogo,
        region: SearchRegion,
        video: &Path,
        include_sentinels: bool,
        progress: &ProgressBar,
    ) -> Result<Vec<f64>> {
        debug!(
            "偵測標誌 {} 於 {}（區域 {region}）",
            logo.path().display(),
            video.display()
        );

        let job = AnalysisJob {
            logo,
            region,
            video,
            cancel: &self.cancel,
        };
        let stream = self.analyzer.analyze(&job)?;

        let mut reducer = EventReducer::new(include_sentinels);
        for sample in stream {
            if let Some(report) = reducer.push(&sample?) {
                progress.set_message(progress_message(report));
            }
        }

        let matches = reducer.match_count();
        let events = reducer
            .finish()
            .ok_or_else(|| PipelineError::DetectorProcessFailed {
                command: self.analyzer.describe(&job),
                message: "沒有輸出任何影格資料".to_string(),
            })?;

        info!("{} 偵測完成：標誌出現 {matches} 次", video.display());
        Ok(events)
    }
}

fn progress_message(report: DetectionProgress) -> String {
    format!(
        "{:.0} 秒已處理，標誌匹配 {} 次",
        report.seconds_processed, report.matches
    )
}
