use std::io::{self, Read};

/// 單次讀取的區塊大小
const READ_CHUNK: usize = 4096;
/// 單行上限，超過即強制切出，避免緩衝無限成長
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// 同時以 `\r` 與 `\n` 切行的讀取器
///
/// ffmpeg 的進度列以 `\r` 結尾、一般訊息以 `\n` 結尾，兩者混在同一條
/// stderr 中，所以不能直接用 `BufRead::lines`。空行會被略過，串流結束時
/// 未終止的最後一段仍會被送出。
pub struct CrLfLines<R: Read> {
    reader: R,
    pending: Vec<u8>,
    chunk: Box<[u8]>,
    ready: std::collections::VecDeque<String>,
    eof: bool,
}

impl<R: Read> CrLfLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            chunk: vec![0; READ_CHUNK].into_boxed_slice(),
            ready: std::collections::VecDeque::new(),
            eof: false,
        }
    }

    fn flush_pending(&mut self) {
        if !self.pending.is_empty() {
            let line = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.ready.push_back(line);
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        let read = loop {
            match self.reader.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        };

        if read == 0 {
            self.eof = true;
            self.flush_pending();
            return Ok(());
        }

        for i in 0..read {
            let byte = self.chunk[i];
            if byte == b'\r' || byte == b'\n' {
                self.flush_pending();
            } else {
                self.pending.push(byte);
                if self.pending.len() >= MAX_LINE_BYTES {
                    self.flush_pending();
                }
            }
        }
        Ok(())
    }
}

impl<R: Read> Iterator for CrLfLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.eof {
                return None;
            }
            if let Err(e) = self.fill() {
                self.eof = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// 每次只吐出少量位元組，模擬管線分段到達
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let end = (self.pos + self.step).min(self.data.len());
            let n = (end - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn collect<R: Read>(reader: R) -> Vec<String> {
        CrLfLines::new(reader).map(|l| l.unwrap()).collect()
    }

    #[test]
    fn test_mixed_terminators() {
        let input = "Input #0\nframe=1 time=00:00:01.00\rframe=2 time=00:00:02.00\r\nDone\n";
        assert_eq!(
            collect(Cursor::new(input)),
            vec![
                "Input #0",
                "frame=1 time=00:00:01.00",
                "frame=2 time=00:00:02.00",
                "Done"
            ]
        );
    }

    #[test]
    fn test_unterminated_tail_is_kept() {
        assert_eq!(collect(Cursor::new("a\rb")), vec!["a", "b"]);
    }

    #[test]
    fn test_lines_split_across_reads() {
        let reader = Trickle {
            data: b"frame,0.00\nframe,0.50,10,10\rframe,1.00\n".to_vec(),
            pos: 0,
            step: 3,
        };
        assert_eq!(
            collect(reader),
            vec!["frame,0.00", "frame,0.50,10,10", "frame,1.00"]
        );
    }

    #[test]
    fn test_overlong_line_is_bounded() {
        let input = "x".repeat(MAX_LINE_BYTES + 10);
        let lines = collect(Cursor::new(input));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), MAX_LINE_BYTES);
        assert_eq!(lines[1].len(), 10);
    }

    #[test]
    fn test_empty_input() {
        assert!(collect(Cursor::new("")).is_empty());
    }
}
