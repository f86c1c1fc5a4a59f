use super::template::{PageContent, render_page};
use super::toc::TableOfContents;
use crate::component::stop_annotator::StopTimeTable;
use anyhow::{Context, Result, ensure};
use chrono::Local;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const PAGE_FILE_NAME: &str = "index.html";

/// 已寫入的播放頁面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackPage {
    pub path: PathBuf,
    pub title: String,
    pub segment_count: usize,
}

pub struct PlaybackPageBuilder {
    css_href: Option<String>,
}

impl PlaybackPageBuilder {
    #[must_use]
    pub const fn new(css_href: Option<String>) -> Self {
        Self { css_href }
    }

    /// 產生 `output_dir/index.html`；暫停時間表與目錄的列數必須相同
    pub fn build(
        &self,
        stop_table: &StopTimeTable,
        toc: &TableOfContents,
        output_dir: &Path,
    ) -> Result<PlaybackPage> {
        ensure!(
            stop_table.len() == toc.blurbs.len(),
            "暫停時間表有 {} 列，目錄有 {} 段",
            stop_table.len(),
            toc.blurbs.len()
        );

        let stoptimes_json = stop_table.to_json().context("無法序列化暫停時間表")?;
        let date = Local::now().format("%Y-%m-%d").to_string();
        let html = render_page(&PageContent {
            title: &toc.title,
            css_href: self.css_href.as_deref(),
            blurbs: &toc.blurbs,
            stoptimes_json: &stoptimes_json,
            date: &date,
        });

        let path = output_dir.join(PAGE_FILE_NAME);
        fs::write(&path, html).with_context(|| format!("無法寫入頁面: {}", path.display()))?;
        info!("已產生播放頁面: {}", path.display());

        Ok(PlaybackPage {
            path,
            title: toc.title.clone(),
            segment_count: stop_table.len(),
        })
    }
}
