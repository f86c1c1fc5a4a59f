use super::line_splitter::CrLfLines;
use std::collections::VecDeque;
use std::io::Read;
use std::thread::{self, JoinHandle};

/// 保留的錯誤輸出行數
pub const STDERR_TAIL_LINES: usize = 20;

/// 固定長度的最後 N 行緩衝
#[derive(Debug, Default)]
pub struct LineTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl LineTail {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    #[must_use]
    pub fn joined(&self) -> String {
        self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}

/// 在背景執行緒持續排空子程序的 stderr
///
/// 不讀取的話子程序寫滿管線就會卡住；只保留最後幾行供錯誤訊息使用。
pub fn spawn_stderr_collector<R: Read + Send + 'static>(stderr: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut tail = LineTail::new(STDERR_TAIL_LINES);
        for line in CrLfLines::new(stderr).map_while(Result::ok) {
            tail.push(line);
        }
        tail.joined()
    })
}
