use super::telemetry::FrameSample;

/// 結尾分段短於此秒數時併入前一段
pub const TAIL_MERGE_SECONDS: f64 = 2.0;
/// 進度最多每隔這麼多秒（影片時間）回報一次
pub const PROGRESS_INTERVAL_SECONDS: f64 = 5.0;

/// 節流後的進度回報
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionProgress {
    /// 已處理的影片秒數（對齊到回報間隔）
    pub seconds_processed: f64,
    pub matches: usize,
}

/// 將逐格的匹配結果化簡為事件時間點
///
/// 只在「未匹配 → 匹配」的上升邊緣記錄時間（四捨五入到小數兩位），
/// 連續匹配只算一次。單向、一次走完，沒有其他隱藏狀態。
#[derive(Debug)]
pub struct EventReducer {
    include_sentinels: bool,
    events: Vec<f64>,
    previous_is_match: bool,
    last_timestamp: Option<f64>,
    last_interval: i64,
}

impl EventReducer {
    #[must_use]
    pub fn new(include_sentinels: bool) -> Self {
        Self {
            include_sentinels,
            events: if include_sentinels { vec![0.0] } else { Vec::new() },
            previous_is_match: false,
            last_timestamp: None,
            last_interval: -1,
        }
    }

    /// 加入一個影格；跨過新的回報間隔時回傳進度
    pub fn push(&mut self, sample: &FrameSample) -> Option<DetectionProgress> {
        let is_match = sample.is_match();
        if is_match && !self.previous_is_match {
            self.events.push(round_centis(sample.timestamp));
        }
        self.previous_is_match = is_match;
        self.last_timestamp = Some(sample.timestamp);

        let interval = (sample.timestamp / PROGRESS_INTERVAL_SECONDS).floor() as i64;
        if interval > self.last_interval {
            self.last_interval = interval;
            return Some(DetectionProgress {
                seconds_processed: interval as f64 * PROGRESS_INTERVAL_SECONDS,
                matches: self.match_count(),
            });
        }
        None
    }

    /// 目前偵測到的匹配段數（不含開頭哨兵）
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.events.len() - usize::from(self.include_sentinels)
    }

    /// 結束串流；完全沒有影格時回傳 `None`
    ///
    /// 含哨兵時，最後一個影格的時間若距離上一個事件超過
    /// [`TAIL_MERGE_SECONDS`] 就附加為結尾，否則覆寫上一個事件，避免產生
    /// 極短的最後一段。開頭的 0.0 不會被覆寫。
    #[must_use]
    pub fn finish(mut self) -> Option<Vec<f64>> {
        let end = self.last_timestamp?;
        if self.include_sentinels {
            let only_head = self.events.len() == 1;
            match self.events.last().copied() {
                Some(last) if !only_head && end - last <= TAIL_MERGE_SECONDS => {
                    if let Some(slot) = self.events.last_mut() {
                        *slot = end;
                    }
                }
                _ => self.events.push(end),
            }
        }
        Some(self.events)
    }
}

/// 對固定的影格序列做化簡（同樣輸入永遠得到同樣結果）
#[must_use]
pub fn reduce_samples<'a, I>(samples: I, include_sentinels: bool) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a FrameSample>,
{
    let mut reducer = EventReducer::new(include_sentinels);
    for sample in samples {
        let _ = reducer.push(sample);
    }
    reducer.finish()
}

fn round_centis(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(spec: &[(f64, bool)]) -> Vec<FrameSample> {
        spec.iter()
            .map(|&(t, m)| {
                if m {
                    FrameSample::matched(t, 10, 10)
                } else {
                    FrameSample::no_match(t)
                }
            })
            .collect()
    }

    #[test]
    fn test_short_tail_overwrites_last_event() {
        let frames = samples(&[
            (0.0, false),
            (0.5, true),
            (1.0, true),
            (1.5, false),
            (2.0, false),
        ]);
        assert_eq!(reduce_samples(&frames, true).unwrap(), vec![0.0, 2.0]);
    }

    #[test]
    fn test_long_tail_appends_end() {
        let frames = samples(&[(0.0, false), (0.5, true), (1.0, true), (1.5, false), (2.6, false)]);
        assert_eq!(reduce_samples(&frames, true).unwrap(), vec![0.0, 0.5, 2.6]);
    }

    #[test]
    fn test_without_sentinels_only_rising_edges() {
        let frames = samples(&[
            (0.0, false),
            (3.531, true),
            (3.57, true),
            (3.61, false),
            (7.0, true),
            (9.0, false),
        ]);
        assert_eq!(reduce_samples(&frames, false).unwrap(), vec![3.53, 7.0]);
    }

    #[test]
    fn test_event_count_equals_stretch_count() {
        // 每段長度不同，事件數只取決於段數
        let mut spec = Vec::new();
        let mut t = 0.0;
        for stretch_len in [1, 5, 40, 2] {
            spec.push((t, false));
            t += 0.04;
            for _ in 0..stretch_len {
                spec.push((t, true));
                t += 0.04;
            }
        }
        spec.push((t, false));
        let events = reduce_samples(&samples(&spec), false).unwrap();
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_match_on_first_frame() {
        let frames = samples(&[(0.0, true), (0.04, true), (10.0, false)]);
        assert_eq!(reduce_samples(&frames, false).unwrap(), vec![0.0]);
        assert_eq!(reduce_samples(&frames, true).unwrap(), vec![0.0, 0.0, 10.0]);
    }

    #[test]
    fn test_no_matches_keeps_head_sentinel() {
        let short = samples(&[(0.0, false), (1.0, false)]);
        assert_eq!(reduce_samples(&short, true).unwrap(), vec![0.0, 1.0]);
        let long = samples(&[(0.0, false), (30.0, false)]);
        assert_eq!(reduce_samples(&long, true).unwrap(), vec![0.0, 30.0]);
        assert!(reduce_samples(&long, false).unwrap().is_empty());
    }

    #[test]
    fn test_empty_stream() {
        assert!(reduce_samples(&[], true).is_none());
    }

    #[test]
    fn test_reduction_is_idempotent() {
        let frames = samples(&[(0.0, false), (4.2, true), (4.3, false), (20.0, true), (21.0, false)]);
        assert_eq!(reduce_samples(&frames, true), reduce_samples(&frames, true));
    }

    #[test]
    fn test_progress_is_throttled() {
        let mut reducer = EventReducer::new(true);
        let mut reports = Vec::new();
        let mut t = 0.0;
        while t < 12.0 {
            let sample = if (6.0..7.0).contains(&t) {
                FrameSample::matched(t, 0, 0)
            } else {
                FrameSample::no_match(t)
            };
            if let Some(progress) = reducer.push(&sample) {
                reports.push(progress);
            }
            t += 0.5;
        }
        assert_eq!(
            reports,
            vec![
                DetectionProgress { seconds_processed: 0.0, matches: 0 },
                DetectionProgress { seconds_processed: 5.0, matches: 0 },
                DetectionProgress { seconds_processed: 10.0, matches: 1 },
            ]
        );
    }
}
