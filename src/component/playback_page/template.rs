use crate::component::segment_encoder::{SEGMENT_FILE_EXTENSION, SEGMENT_FILE_PREFIX};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// 越過暫停點後多久內仍會暫停；2.0 倍速下也必須至少有一次 timeupdate 落在範圍內
pub const STOP_PAUSE_WINDOW_SECONDS: f64 = 0.6;

/// 頁面上的播放速度按鈕
pub const PLAYBACK_RATES: [f64; 8] = [0.6, 0.7, 0.85, 1.0, 1.2, 1.4, 1.7, 2.0];

pub const SKIP_SECONDS: u32 = 10;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("Invalid regex"));

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>{title}</title>
{css_block}    <meta charset="UTF-8">
  </head>
  <body>

    <h1 class="lv-title">{title}</h1>

    <video id="lv-video" class="lv-video" height=540 controls>
       Your browser does not support the video tag.
    </video>

    <br>
{buttons}
    <table class="lv-table">{toc_rows}
    </table>

    <footer class="lv-footer">
      <p>Generated {date}</p>
    </footer>
{script}
  </body>
</html>
"#;

const SCRIPT_TEMPLATE: &str = r#"
    <script>
      var lv_video = document.getElementById("lv-video")
      var lv_video_idx = 1
      var lv_stoptimes = {stoptimes}

      function lv_pause_at_stoptimes() {
        for (var t of lv_stoptimes[lv_video_idx - 1]) {
          if (lv_video.currentTime >= t && lv_video.currentTime <= t + {window}) {
            lv_video.pause()
            lv_video.currentTime += {window}
          }
        }
      }

      function lv_skip(obj, secs) {
        obj.currentTime += secs
      }

      function lv_speed(obj, factor) {
        obj.playbackRate = factor
      }

      function lv_switch_to(i, play = true) {
        lv_video.src = "{prefix}" + i + ".{extension}"
        lv_video_idx = i
        lv_video.load()
        if (play) {
          lv_video.play()
        }
      }

      lv_video.addEventListener("timeupdate", lv_pause_at_stoptimes)
      lv_switch_to(1, false)
    </script>
"#;

/// 組成頁面所需的全部資料；標題與說明視為可信任的 HTML 片段，原樣插入
#[derive(Debug, Clone)]
pub struct PageContent<'a> {
    pub title: &'a str,
    pub css_href: Option<&'a str>,
    pub blurbs: &'a [String],
    /// [`crate::component::stop_annotator::StopTimeTable`] 的 JSON
    pub stoptimes_json: &'a str,
    pub date: &'a str,
}

#[must_use]
pub fn render_page(content: &PageContent<'_>) -> String {
    let css_block = content
        .css_href
        .map(|href| format!("    <link rel=\"stylesheet\" href=\"{href}\">\n"))
        .unwrap_or_default();

    fill(
        PAGE_TEMPLATE,
        &[
            ("css_block", &css_block),
            ("buttons", &render_buttons()),
            ("toc_rows", &render_toc_rows(content.blurbs)),
            ("date", content.date),
            ("script", &render_script(content.stoptimes_json)),
            ("title", content.title),
        ],
    )
}

/// 一次掃描替換所有 `{name}`；插入的內容不會再被替換
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| (*value).to_string())
        })
        .into_owned()
}

fn render_buttons() -> String {
    let skips = [("-", "lv_skip(lv_video, -"), ("+", "lv_skip(lv_video, ")].map(|(sign, call)| {
        format!("    <button class=\"lv-button\" onclick=\"{call}{SKIP_SECONDS})\">{sign}{SKIP_SECONDS}s</button>\n")
    });
    let speeds = PLAYBACK_RATES.map(|rate| {
        format!("    <button class=\"lv-button\" onclick=\"lv_speed(lv_video, {rate})\">{rate:?}x</button>\n")
    });
    skips.into_iter().chain(speeds).collect()
}

fn render_toc_rows(blurbs: &[String]) -> String {
    blurbs
        .iter()
        .enumerate()
        .map(|(i, blurb)| {
            let index = i + 1;
            format!(
                "\n      <tr class='lv-tablerow' onclick='lv_switch_to({index})'>\
                 <td class='lv-numcell'>{index}</td><td>{blurb}</td></tr>"
            )
        })
        .collect()
}

fn render_script(stoptimes_json: &str) -> String {
    fill(
        SCRIPT_TEMPLATE,
        &[
            ("stoptimes", stoptimes_json),
            ("window", &STOP_PAUSE_WINDOW_SECONDS.to_string()),
            ("prefix", SEGMENT_FILE_PREFIX),
            ("extension", SEGMENT_FILE_EXTENSION),
        ],
    )
}
