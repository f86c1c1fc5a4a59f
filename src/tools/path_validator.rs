use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("檔案不存在: {}", path.display());
    }
    if !path.is_file() {
        bail!("路徑不是檔案: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// 依序在多個資料夾中尋找檔案，絕對路徑或現存的相對路徑直接採用
#[must_use]
pub fn find_in_dirs(file: &Path, dirs: &[PathBuf]) -> Option<PathBuf> {
    if file.is_absolute() || file.exists() {
        return file.exists().then(|| file.to_path_buf());
    }
    dirs.iter().map(|dir| dir.join(file)).find(|p| p.is_file())
}
