use crate::error::{PipelineError, Result};
use log::warn;

/// 分段邊界；影片長度在規劃時可能還不知道
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    At(f64),
    EndOfVideo,
}

/// 尚未代入影片長度的邊界清單
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    boundaries: Vec<Boundary>,
}

/// 沒有切割標誌時整部影片為一段；否則直接採用偵測結果（已含頭尾哨兵）
#[must_use]
pub fn plan(split_events: Option<&[f64]>) -> SegmentPlan {
    let boundaries = match split_events {
        None => vec![Boundary::At(0.0), Boundary::EndOfVideo],
        Some(events) => events.iter().copied().map(Boundary::At).collect(),
    };
    SegmentPlan { boundaries }
}

impl SegmentPlan {
    #[must_use]
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// 以影片長度取代 [`Boundary::EndOfVideo`] 並驗證邊界
    ///
    /// 相鄰的相同邊界（例如第一格就出現標誌）會合併並記錄警告；
    /// 邊界遞減或少於一段則回傳 [`PipelineError::InvalidBoundaries`]。
    pub fn resolve(&self, duration: f64) -> Result<SegmentBoundaries> {
        let mut values: Vec<f64> = Vec::with_capacity(self.boundaries.len());
        for boundary in &self.boundaries {
            let value = match *boundary {
                Boundary::At(t) => t,
                Boundary::EndOfVideo => duration,
            };
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::InvalidBoundaries(format!(
                    "無效的時間 {value}"
                )));
            }
            match values.last() {
                Some(&last) if value < last => {
                    return Err(PipelineError::InvalidBoundaries(format!(
                        "邊界遞減：{last:.2} 之後是 {value:.2}"
                    )));
                }
                Some(&last) if value == last => {
                    warn!("忽略重複的分段邊界 {value:.2}");
                }
                _ => values.push(value),
            }
        }

        if values.len() < 2 {
            return Err(PipelineError::InvalidBoundaries(format!(
                "至少需要兩個邊界，實際為 {values:?}"
            )));
        }
        Ok(SegmentBoundaries { values })
    }
}

/// 嚴格遞增的邊界，`N + 1` 個值定義 `N` 個區段
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBoundaries {
    values: Vec<f64>,
}

impl SegmentBoundaries {
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.values.len() - 1
    }

    /// 第 `index` 段（從 1 起算）的起訖時間
    #[must_use]
    pub fn range(&self, index: usize) -> Option<(f64, f64)> {
        if index == 0 || index >= self.values.len() {
            return None;
        }
        Some((self.values[index - 1], self.values[index]))
    }

    /// 依序列出 `(index, start, end)`
    pub fn ranges(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.values
            .windows(2)
            .enumerate()
            .map(|(i, pair)| (i + 1, pair[0], pair[1]))
    }
}
