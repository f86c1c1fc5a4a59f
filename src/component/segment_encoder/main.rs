use super::ffmpeg_command::SegmentCommand;
use super::transcoder::Transcoder;
use crate::component::segment_planner::SegmentBoundaries;
use crate::error::Result;
use crate::tools::progress_bar;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 依序將每個區段重新編碼成獨立可播放的檔案
pub struct SegmentEncoder {
    transcoder: Arc<dyn Transcoder>,
    cancel: Arc<AtomicBool>,
}

impl SegmentEncoder {
    pub fn new(transcoder: Arc<dyn Transcoder>, cancel: Arc<AtomicBool>) -> Self {
        Self { transcoder, cancel }
    }

    /// 回傳依序排列的區段檔案；任何一段失敗就中止整個流程
    pub fn encode(
        &self,
        video: &Path,
        boundaries: &SegmentBoundaries,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let count = boundaries.segment_count();
        let mut outputs = Vec::with_capacity(count);

        for (index, start, end) in boundaries.ranges() {
            let command = SegmentCommand::new(video, output_dir, index, start, end);
            info!(
                "編碼第 {index}/{count} 段：{start:.2} → {end:.2} 秒 → {}",
                command.destination_path().display()
            );

            if let Err(e) = self.encode_one(&command, count) {
                error!("第 {index} 段編碼失敗: {e}");
                remove_partial_output(command.destination_path());
                return Err(e);
            }
            outputs.push(command.destination_path().to_path_buf());
        }

        Ok(outputs)
    }

    fn encode_one(&self, command: &SegmentCommand, count: usize) -> Result<()> {
        let progress = progress_bar(command.duration().ceil() as u64);
        progress.set_message(format!("區段 {}/{count}", command.index()));

        let stream = match self.transcoder.transcode(command, &self.cancel) {
            Ok(stream) => stream,
            Err(e) => {
                progress.abandon();
                return Err(e);
            }
        };
        for heartbeat in stream {
            match heartbeat {
                Ok(heartbeat) => progress.set_position(heartbeat.seconds as u64),
                Err(e) => {
                    progress.abandon_with_message("編碼失敗");
                    return Err(e);
                }
            }
        }

        progress.finish_with_message(format!("區段 {}/{count} 完成", command.index()));
        Ok(())
    }
}

fn remove_partial_output(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("無法刪除未完成的輸出 {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::segment_encoder::{EncodeProgress, ProgressStream};
    use crate::component::segment_planner::plan;
    use crate::error::PipelineError;
    use std::sync::Mutex;

    /// 寫出空檔案並回報進度；`fail_on` 指定的區段會在寫出後失敗
    struct FakeTranscoder {
        fail_on: Option<usize>,
        seen: Mutex<Vec<(usize, String)>>,
    }

    impl Transcoder for FakeTranscoder {
        fn transcode<'a>(
            &'a self,
            command: &'a SegmentCommand,
            _cancel: &'a AtomicBool,
        ) -> Result<ProgressStream<'a>> {
            fs::write(command.destination_path(), b"partial")?;
            self.seen.lock().unwrap().push((
                command.index(),
                format!("{:.2}", command.duration()),
            ));

            let mut items = vec![Ok(EncodeProgress { seconds: 0.5 })];
            if self.fail_on == Some(command.index()) {
                items.push(Err(PipelineError::EncodeProcessFailed {
                    command: "ffmpeg".to_string(),
                    message: "boom".to_string(),
                }));
            }
            Ok(Box::new(items.into_iter()))
        }
    }

    fn encoder(fail_on: Option<usize>) -> (SegmentEncoder, Arc<FakeTranscoder>) {
        let transcoder = Arc::new(FakeTranscoder {
            fail_on,
            seen: Mutex::new(Vec::new()),
        });
        let encoder = SegmentEncoder::new(transcoder.clone(), Arc::new(AtomicBool::new(false)));
        (encoder, transcoder)
    }

    #[test]
    fn test_one_file_per_segment() {
        let tmp = tempfile::tempdir().unwrap();
        let boundaries = plan(Some(&[0.0, 10.0, 25.5, 40.0])).resolve(40.0).unwrap();
        let (encoder, transcoder) = encoder(None);

        let outputs = encoder
            .encode(Path::new("lecture.mp4"), &boundaries, tmp.path())
            .unwrap();

        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[2], tmp.path().join("segment3.mp4"));
        assert!(outputs.iter().all(|p| p.exists()));
        assert_eq!(
            *transcoder.seen.lock().unwrap(),
            vec![
                (1, "10.00".to_string()),
                (2, "15.50".to_string()),
                (3, "14.50".to_string())
            ]
        );
    }

    #[test]
    fn test_failure_aborts_and_removes_partial_output() {
        let tmp = tempfile::tempdir().unwrap();
        let boundaries = plan(Some(&[0.0, 10.0, 20.0, 30.0])).resolve(30.0).unwrap();
        let (encoder, transcoder) = encoder(Some(2));

        let result = encoder.encode(Path::new("lecture.mp4"), &boundaries, tmp.path());

        assert!(matches!(result, Err(PipelineError::EncodeProcessFailed { .. })));
        assert!(tmp.path().join("segment1.mp4").exists());
        assert!(!tmp.path().join("segment2.mp4").exists());
        assert!(!tmp.path().join("segment3.mp4").exists());
        assert_eq!(transcoder.seen.lock().unwrap().len(), 2);
    }
}
