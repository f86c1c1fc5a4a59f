use std::thread;
use std::time::Duration;
use sysinfo::System;

/// 依目前 CPU 使用率估算可同時執行的分析程序數量
pub struct CpuMonitor {
    system: System,
}

impl CpuMonitor {
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        // 使用率需要兩次取樣才有意義
        thread::sleep(Duration::from_millis(200));
        system.refresh_cpu_all();
        Self { system }
    }

    #[must_use]
    pub fn logical_cpus(&self) -> usize {
        self.system.cpus().len().max(1)
    }

    pub fn current_usage(&mut self) -> f32 {
        self.system.refresh_cpu_all();
        self.system.global_cpu_usage()
    }

    /// 建議的工作執行緒數，介於 1 與 `max_jobs` 之間
    pub fn suggested_workers(&mut self, max_jobs: usize) -> usize {
        let usage = self.current_usage();
        workers_for(self.logical_cpus(), usage, max_jobs)
    }
}

impl Default for CpuMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// 以閒置比例縮放 CPU 數量
fn workers_for(cpus: usize, usage_percent: f32, max_jobs: usize) -> usize {
    let idle = (100.0 - usage_percent.clamp(0.0, 100.0)) / 100.0;
    let slots = (cpus as f32 * idle).round() as usize;
    slots.clamp(1, max_jobs.max(1))
}
