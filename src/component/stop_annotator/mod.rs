//! 暫停點標註
//!
//! 在每個區段內獨立偵測暫停標誌，得到以區段開頭為 0 的暫停時間表

mod main;
mod table;

pub use main::StopAnnotator;
pub use table::StopTimeTable;
