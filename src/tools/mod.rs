mod command_trace;
mod cpu_monitor;
mod ffprobe_info;
mod line_splitter;
mod path_validator;
mod progress;
mod stderr_tail;

pub use command_trace::{CommandTracer, describe_command};
pub use cpu_monitor::CpuMonitor;
pub use ffprobe_info::{FfprobeProbe, MediaProbe, VideoInfo};
pub use line_splitter::{CrLfLines, MAX_LINE_BYTES};
pub use path_validator::{ensure_directory_exists, find_in_dirs, validate_file_exists};
pub use progress::{progress_bar, spinner};
pub use stderr_tail::{LineTail, STDERR_TAIL_LINES, spawn_stderr_collector};
