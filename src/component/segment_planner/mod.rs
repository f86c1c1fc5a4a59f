//! 分段規劃
//!
//! 將切割標誌的事件時間點轉為各區段的起訖邊界

mod main;

pub use main::{Boundary, SegmentBoundaries, SegmentPlan, plan};
