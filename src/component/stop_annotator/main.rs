use super::table::StopTimeTable;
use crate::component::logo_detector::{LogoDetector, PreparedLogo};
use crate::component::logo_region::{LogoReference, SearchRegion};
use crate::error::{PipelineError, Result};
use crate::tools::progress_bar;
use indicatif::ProgressBar;
use log::{debug, error, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 平行偵測每個區段中的暫停標誌
pub struct StopAnnotator {
    detector: LogoDetector,
    cancel: Arc<AtomicBool>,
    workers: usize,
}

impl StopAnnotator {
    /// `cancel` 必須與 `detector` 使用同一個旗標，才能在失敗時停止其他區段
    pub fn new(detector: LogoDetector, cancel: Arc<AtomicBool>, workers: usize) -> Self {
        Self {
            detector,
            cancel,
            workers: workers.max(1),
        }
    }

    /// 回傳與 `segments` 一一對應的暫停時間表
    ///
    /// 任何一段失敗都會設定取消旗標，其餘執行中的偵測隨之終止；
    /// 回傳的是第一個真正的錯誤，而不是連帶產生的 [`PipelineError::Cancelled`]。
    pub fn annotate_stops(
        &self,
        segments: &[PathBuf],
        stop_logo: &LogoReference,
        region: SearchRegion,
        work_dir: &Path,
    ) -> Result<StopTimeTable> {
        let prepared = self.detector.prepare_logo(stop_logo, work_dir)?;
        let progress = progress_bar(segments.len() as u64);
        self.detect_all(segments, &prepared, region, &progress)
    }

    /// 共用的進度條只計算完成的區段數，各區段的逐格進度不顯示
    fn detect_all(
        &self,
        segments: &[PathBuf],
        prepared: &PreparedLogo,
        region: SearchRegion,
        progress: &ProgressBar,
    ) -> Result<StopTimeTable> {
        progress.set_message("偵測暫停標誌");

        let run = || -> Vec<Result<Vec<f64>>> {
            segments
                .par_iter()
                .map(|segment| {
                    if self.cancel.load(Ordering::SeqCst) {
                        return Err(PipelineError::Cancelled);
                    }
                    let result = self.detector.detect(
                        prepared,
                        region,
                        segment,
                        false,
                        &ProgressBar::hidden(),
                    );
                    match &result {
                        Ok(stops) => {
                            debug!("{}: 暫停點 {stops:?}", segment.display());
                            progress.inc(1);
                        }
                        Err(e) if !e.is_cancelled() => {
                            error!("{} 暫停點偵測失敗: {e}", segment.display());
                            self.cancel.store(true, Ordering::SeqCst);
                        }
                        Err(_) => {}
                    }
                    result
                })
                .collect()
        };

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!("無法建立執行緒池，改用預設執行緒池: {e}");
                run()
            }
        };

        match first_failure(results) {
            Ok(rows) => {
                progress.finish_with_message("暫停標誌偵測完成");
                Ok(StopTimeTable::new(rows))
            }
            Err(e) => {
                progress.abandon_with_message("暫停標誌偵測失敗");
                Err(e)
            }
        }
    }
}

/// 全部成功時依序回傳；否則優先回傳非取消的錯誤
fn first_failure(results: Vec<Result<Vec<f64>>>) -> Result<Vec<Vec<f64>>> {
    let mut rows = Vec::with_capacity(results.len());
    let mut cancelled = None;
    for result in results {
        match result {
            Ok(row) => rows.push(row),
            Err(e) if e.is_cancelled() => cancelled = Some(e),
            Err(e) => return Err(e),
        }
    }
    match cancelled {
        Some(e) => Err(e),
        None => Ok(rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::logo_detector::{
        AnalysisJob, FrameAnalyzer, FrameSample, FrameStream, PreparedLogo,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 依影片檔名回傳不同的影格序列；名稱含 `broken` 的檔案回傳程序失敗
    struct PerFileAnalyzer {
        frames: HashMap<String, Vec<FrameSample>>,
    }

    impl FrameAnalyzer for PerFileAnalyzer {
        fn prepare_logo(&self, logo: &LogoReference, _work_dir: &Path) -> Result<PreparedLogo> {
            Ok(PreparedLogo::existing(&logo.path))
        }

        fn analyze<'a>(&'a self, job: &AnalysisJob<'a>) -> Result<FrameStream<'a>> {
            let name = job.video.to_string_lossy().to_string();
            if name.contains("broken") {
                return Err(PipelineError::DetectorProcessFailed {
                    command: name,
                    message: "exit status 1".to_string(),
                });
            }
            let frames = self.frames.get(&name).cloned().unwrap_or_default();
            Ok(Box::new(frames.into_iter().map(Ok::<_, PipelineError>)))
        }
    }

    fn annotator(frames: HashMap<String, Vec<FrameSample>>, workers: usize) -> StopAnnotator {
        let cancel = Arc::new(AtomicBool::new(false));
        let detector = LogoDetector::new(Arc::new(PerFileAnalyzer { frames }), Arc::clone(&cancel));
        StopAnnotator::new(detector, cancel, workers)
    }

    fn logo() -> LogoReference {
        LogoReference {
            path: PathBuf::from("stoplogo.png"),
            width: 122,
            height: 105,
        }
    }

    fn region() -> SearchRegion {
        SearchRegion::new(0, 61, 922, 974).unwrap()
    }

    #[test]
    fn test_rows_are_index_aligned() {
        let mut frames = HashMap::new();
        frames.insert(
            "segment1.mp4".to_string(),
            vec![
                FrameSample::no_match(0.0),
                FrameSample::matched(3.531, 5, 930),
                FrameSample::matched(3.6, 5, 930),
                FrameSample::no_match(3.7),
                FrameSample::matched(9.0, 5, 930),
                FrameSample::no_match(12.0),
            ],
        );
        frames.insert(
            "segment2.mp4".to_string(),
            vec![FrameSample::no_match(0.0), FrameSample::no_match(20.0)],
        );
        frames.insert(
            "segment3.mp4".to_string(),
            vec![FrameSample::no_match(0.0), FrameSample::matched(1.0, 5, 930)],
        );

        let segments: Vec<PathBuf> = (1..=3).map(|i| PathBuf::from(format!("segment{i}.mp4"))).collect();
        let table = annotator(frames, 2)
            .annotate_stops(&segments, &logo(), region(), Path::new("."))
            .unwrap();

        assert_eq!(table.rows(), &[vec![3.53, 9.0], vec![], vec![1.0]]);
    }

    #[test]
    fn test_failure_is_reported_and_cancels() {
        let mut frames = HashMap::new();
        frames.insert(
            "segment1.mp4".to_string(),
            vec![FrameSample::no_match(0.0), FrameSample::no_match(1.0)],
        );
        let segments = vec![PathBuf::from("segment1.mp4"), PathBuf::from("broken2.mp4")];
        let annotator = annotator(frames, 1);

        let result = annotator.annotate_stops(&segments, &logo(), region(), Path::new("."));

        assert!(matches!(result, Err(PipelineError::DetectorProcessFailed { .. })));
        assert!(annotator.cancel.load(Ordering::SeqCst));
    }

    /// 在每個影格被讀出時記下共用進度條當下的訊息
    struct ProgressWatcher {
        progress: ProgressBar,
        seen: Mutex<Vec<String>>,
    }

    impl FrameAnalyzer for ProgressWatcher {
        fn prepare_logo(&self, logo: &LogoReference, _work_dir: &Path) -> Result<PreparedLogo> {
            Ok(PreparedLogo::existing(&logo.path))
        }

        fn analyze<'a>(&'a self, _job: &AnalysisJob<'a>) -> Result<FrameStream<'a>> {
            Ok(Box::new((0..=30).map(move |t| {
                self.seen.lock().unwrap().push(self.progress.message());
                Ok(FrameSample::no_match(f64::from(t)))
            })))
        }
    }

    #[test]
    fn test_progress_counts_segments_only() {
        let progress = ProgressBar::hidden();
        progress.set_length(3);
        let watcher = Arc::new(ProgressWatcher {
            progress: progress.clone(),
            seen: Mutex::new(Vec::new()),
        });
        let cancel = Arc::new(AtomicBool::new(false));
        let detector = LogoDetector::new(watcher.clone(), Arc::clone(&cancel));
        let annotator = StopAnnotator::new(detector, cancel, 2);
        let segments: Vec<PathBuf> = (1..=3).map(|i| PathBuf::from(format!("segment{i}.mp4"))).collect();
        let prepared = PreparedLogo::existing("stoplogo.pgm");

        let table = annotator
            .detect_all(&segments, &prepared, region(), &progress)
            .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(progress.position(), 3);
        let seen = watcher.seen.lock().unwrap();
        assert_eq!(seen.len(), 93);
        assert!(seen.iter().all(|message| message == "偵測暫停標誌"), "{seen:?}");
    }

    #[test]
    fn test_first_failure_prefers_real_error() {
        let results = vec![
            Ok(vec![1.0]),
            Err(PipelineError::Cancelled),
            Err(PipelineError::EncodeProcessFailed {
                command: "x".to_string(),
                message: "y".to_string(),
            }),
        ];
        assert!(matches!(
            first_failure(results),
            Err(PipelineError::EncodeProcessFailed { .. })
        ));
        assert_eq!(first_failure(vec![Ok(vec![]), Ok(vec![2.0])]).unwrap(), vec![vec![], vec![2.0]]);
    }
}
