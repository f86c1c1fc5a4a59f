use crate::component::logo_detector::{FindRectAnalyzer, FrameAnalyzer};
use crate::component::segment_encoder::{FfmpegTranscoder, Transcoder};
use crate::config::LectureJob;
use crate::tools::{CommandTracer, FfprobeProbe, MediaProbe};
use std::sync::Arc;

/// 流程使用的外部工具，測試時可換成假的實作
#[derive(Clone)]
pub struct Toolchain {
    pub analyzer: Arc<dyn FrameAnalyzer>,
    pub transcoder: Arc<dyn Transcoder>,
    pub probe: Arc<dyn MediaProbe>,
}

impl Toolchain {
    /// 以 ffmpeg/ffprobe 實作
    #[must_use]
    pub fn ffmpeg(job: &LectureJob) -> Self {
        let tracer = CommandTracer::new(job.verbose);
        Self {
            analyzer: Arc::new(FindRectAnalyzer::new(
                &job.ffmpeg_path,
                &job.ffprobe_path,
                tracer,
            )),
            transcoder: Arc::new(FfmpegTranscoder::new(&job.ffmpeg_path, tracer)),
            probe: Arc::new(FfprobeProbe::new(&job.ffprobe_path, tracer)),
        }
    }
}
