//! 標誌與搜尋區域
//!
//! 將 `ul`/`ur`/`ll`/`lr` 或明確座標轉為影格中的搜尋矩形

mod logo;
mod region;

pub use logo::{LogoReference, LogoSpec};
pub use region::{Corner, Horizontal, RegionSpec, SearchRegion, Vertical, resolve_region};
