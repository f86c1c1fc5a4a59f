use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// 標題加上每個區段一段說明
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOfContents {
    pub title: String,
    pub blurbs: Vec<String>,
}

impl TableOfContents {
    /// 沒有目錄檔時：以影片名稱為標題，說明為 `part <i>`
    #[must_use]
    pub fn fallback(title: &str, segment_count: usize) -> Self {
        Self {
            title: title.to_string(),
            blurbs: (1..=segment_count).map(|i| format!("part {i}")).collect(),
        }
    }

    /// 解析目錄文字：以空白行分段，第一段為標題，其餘依序對應區段
    ///
    /// 說明不足時補空字串並記錄警告，過多時捨棄多餘的部分。
    #[must_use]
    pub fn parse(text: &str, segment_count: usize) -> Self {
        let text = text.replace("\r\n", "\n");
        let mut paragraphs = text.split("\n\n").map(|p| p.trim().to_string());
        let title = paragraphs.next().unwrap_or_default();
        let mut blurbs: Vec<String> = paragraphs.collect();
        // 檔尾多餘的空行不算一段
        while blurbs.last().is_some_and(String::is_empty) {
            blurbs.pop();
        }

        if blurbs.len() < segment_count {
            warn!(
                "目錄只有 {} 段說明，但影片有 {segment_count} 個區段，其餘留白",
                blurbs.len()
            );
            blurbs.resize(segment_count, String::new());
        } else if blurbs.len() > segment_count {
            warn!(
                "目錄有 {} 段說明，多於 {segment_count} 個區段，多餘的部分不會顯示",
                blurbs.len()
            );
            blurbs.truncate(segment_count);
        }

        Self { title, blurbs }
    }
}

/// 讀取目錄檔
pub fn read_toc(path: &Path, segment_count: usize) -> Result<TableOfContents> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("無法讀取目錄檔: {}", path.display()))?;
    Ok(TableOfContents::parse(&text, segment_count))
}
