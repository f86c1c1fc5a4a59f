use super::toolchain::Toolchain;
use crate::component::logo_detector::LogoDetector;
use crate::component::logo_region::{LogoReference, LogoSpec, SearchRegion};
use crate::component::playback_page::{
    PAGE_FILE_NAME, PlaybackPage, PlaybackPageBuilder, TableOfContents, read_toc,
};
use crate::component::segment_encoder::{SegmentEncoder, segment_file_name};
use crate::component::segment_planner::{SegmentBoundaries, plan};
use crate::component::stop_annotator::{StopAnnotator, StopTimeTable};
use crate::config::LectureJob;
use crate::error::PipelineError;
use crate::tools::{CpuMonitor, VideoInfo, ensure_directory_exists, spinner};
use anyhow::{Context, Result};
use console::style;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 暫存資料夾的名稱前綴，建立在輸出資料夾內以便最後以 rename 搬移
const STAGING_PREFIX: &str = ".lecture-staging-";

/// 一次執行的結果
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub boundaries: SegmentBoundaries,
    pub segments: Vec<PathBuf>,
    pub stops: StopTimeTable,
    pub page: PlaybackPage,
}

pub struct LectureBuilder {
    job: LectureJob,
    tools: Toolchain,
    shutdown_signal: Arc<AtomicBool>,
}

impl LectureBuilder {
    pub const fn new(job: LectureJob, tools: Toolchain, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            job,
            tools,
            shutdown_signal,
        }
    }

    /// 執行完整流程
    ///
    /// 區段與頁面先寫入輸出資料夾內的暫存資料夾，全部成功後才搬到最終位置；
    /// 任何階段失敗時，輸出資料夾維持執行前的內容。
    pub fn run(&self) -> Result<BuildSummary> {
        println!("{}", style("=== 講課影片分段 ===").cyan().bold());
        let job = &self.job;

        ensure_directory_exists(&job.output_dir)
            .with_context(|| format!("無法建立輸出資料夾: {}", job.output_dir.display()))?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&job.output_dir)
            .with_context(|| format!("無法建立暫存資料夾: {}", job.output_dir.display()))?;
        let work_dir = staging.path();
        debug!("暫存資料夾: {}", work_dir.display());

        let video = self
            .tools
            .probe
            .video_info(&job.input)
            .context("探測影片資訊失敗")?;
        info!(
            "影片 {}：{:.2} 秒，{}x{}",
            job.input.display(),
            video.duration_seconds,
            video.width,
            video.height
        );

        let detector = LogoDetector::new(
            Arc::clone(&self.tools.analyzer),
            Arc::clone(&self.shutdown_signal),
        );

        let split_events = match &job.split {
            Some(spec) => Some(
                self.detect_splits(&detector, spec, &video, work_dir)
                    .context("偵測切割標誌失敗")?,
            ),
            None => {
                println!("{}", style("未設定切割標誌，整部影片為一段").dim());
                None
            }
        };
        self.check_shutdown()?;

        let boundaries = plan(split_events.as_deref())
            .resolve(video.duration_seconds)
            .context("規劃區段失敗")?;
        let count = boundaries.segment_count();
        println!(
            "{}",
            style(format!("共 {count} 個區段，開始編碼...")).cyan()
        );

        let encoder = SegmentEncoder::new(
            Arc::clone(&self.tools.transcoder),
            Arc::clone(&self.shutdown_signal),
        );
        let staged_segments = encoder
            .encode(&job.input, &boundaries, work_dir)
            .context("編碼區段失敗")?;
        self.check_shutdown()?;

        let stops = match &job.stop {
            Some(spec) => self
                .annotate_stops(detector, spec, &video, &staged_segments, work_dir)
                .context("偵測暫停標誌失敗")?,
            None => StopTimeTable::empty(count),
        };
        self.check_shutdown()?;

        let toc = match &job.toc {
            Some(path) => read_toc(path, count)?,
            None => TableOfContents::fallback(&job.title, count),
        };
        let staged_page = PlaybackPageBuilder::new(job.css_href.clone())
            .build(&stops, &toc, work_dir)
            .context("產生播放頁面失敗")?;
        self.check_shutdown()?;

        let (segments, page) = publish(&staged_segments, staged_page, &job.output_dir)
            .context("搬移輸出檔案失敗")?;
        drop(staging);

        let summary = BuildSummary {
            boundaries,
            segments,
            stops,
            page,
        };
        print_summary(&summary);
        Ok(summary)
    }

    fn detect_splits(
        &self,
        detector: &LogoDetector,
        spec: &LogoSpec,
        video: &VideoInfo,
        work_dir: &Path,
    ) -> Result<Vec<f64>> {
        let (logo, region) = self.locate(spec, video)?;
        println!(
            "{}",
            style(format!("搜尋切割標誌 {}（{region}）", logo.path.display())).dim()
        );

        let prepared = detector.prepare_logo(&logo, work_dir)?;
        let progress = spinner("切割標誌");
        let result = detector.detect(&prepared, region, &self.job.input, true, &progress);
        progress.finish_and_clear();

        let events = result?;
        info!("切割點: {events:?}");
        Ok(events)
    }

    fn annotate_stops(
        &self,
        detector: LogoDetector,
        spec: &LogoSpec,
        video: &VideoInfo,
        segments: &[PathBuf],
        work_dir: &Path,
    ) -> Result<StopTimeTable> {
        let (logo, region) = self.locate(spec, video)?;
        println!(
            "{}",
            style(format!(
                "在 {} 個區段中搜尋暫停標誌 {}（{region}）",
                segments.len(),
                logo.path.display()
            ))
            .dim()
        );

        let workers = self
            .job
            .workers
            .unwrap_or_else(|| CpuMonitor::new().suggested_workers(segments.len()))
            .clamp(1, segments.len().max(1));
        info!("暫停標誌偵測使用 {workers} 個工作執行緒");

        let annotator = StopAnnotator::new(detector, Arc::clone(&self.shutdown_signal), workers);
        let table = annotator.annotate_stops(segments, &logo, region, work_dir)?;
        info!("暫停點: {:?}", table.rows());
        Ok(table)
    }

    /// 量測標誌尺寸並計算搜尋區域（區段與原始影片解析度相同）
    fn locate(&self, spec: &LogoSpec, video: &VideoInfo) -> Result<(LogoReference, SearchRegion)> {
        let (width, height) = self.tools.probe.image_size(&spec.logo_path)?;
        let logo = LogoReference {
            path: spec.logo_path.clone(),
            width,
            height,
        };
        let region = spec.region.resolve(logo.size(), (video.width, video.height))?;
        Ok((logo, region))
    }

    fn check_shutdown(&self) -> Result<()> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            return Err(PipelineError::Cancelled.into());
        }
        Ok(())
    }
}

/// 把暫存的區段與頁面搬到輸出資料夾
///
/// 先移除舊頁面，頁面最後才搬入；上一次執行留下、編號超出本次段數的區段會被刪除。
fn publish(
    staged_segments: &[PathBuf],
    staged_page: PlaybackPage,
    output_dir: &Path,
) -> Result<(Vec<PathBuf>, PlaybackPage)> {
    let page_path = output_dir.join(PAGE_FILE_NAME);
    if page_path.exists() {
        fs::remove_file(&page_path)
            .with_context(|| format!("無法刪除舊頁面: {}", page_path.display()))?;
    }

    let mut segments = Vec::with_capacity(staged_segments.len());
    for (i, staged) in staged_segments.iter().enumerate() {
        let target = output_dir.join(segment_file_name(i + 1));
        fs::rename(staged, &target).with_context(|| {
            format!("無法搬移 {} → {}", staged.display(), target.display())
        })?;
        segments.push(target);
    }
    remove_stale_segments(output_dir, segments.len());

    fs::rename(&staged_page.path, &page_path)
        .with_context(|| format!("無法搬移頁面到 {}", page_path.display()))?;
    info!("已輸出 {} 個區段與頁面到 {}", segments.len(), output_dir.display());

    Ok((
        segments,
        PlaybackPage {
            path: page_path,
            ..staged_page
        },
    ))
}

fn remove_stale_segments(output_dir: &Path, count: usize) {
    for index in (count + 1).. {
        let path = output_dir.join(segment_file_name(index));
        if !path.exists() {
            break;
        }
        match fs::remove_file(&path) {
            Ok(()) => debug!("已刪除舊區段: {}", path.display()),
            Err(e) => {
                warn!("無法刪除舊區段 {}: {e}", path.display());
                break;
            }
        }
    }
}

fn print_summary(summary: &BuildSummary) {
    println!();
    println!("{}", style("=== 完成 ===").cyan().bold());
    println!("  區段: {} 個", style(summary.segments.len()).green());
    for ((index, start, end), row) in summary.boundaries.ranges().zip(summary.stops.rows()) {
        println!(
            "  {index}. {start:>8.2} → {end:>8.2} 秒，暫停點 {} 個",
            row.len()
        );
    }
    println!("  頁面: {}", style(summary.page.path.display()).green());

    info!(
        "完成：{} 個區段，頁面 {}",
        summary.segments.len(),
        summary.page.path.display()
    );
}
