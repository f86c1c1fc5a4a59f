use crate::config::types::{Config, UserSettings};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

impl Config {
    /// 讀取目前目錄的 `settings.json`；不存在時使用預設值
    pub fn new() -> Result<Self> {
        Self::load(Path::new(SETTINGS_FILE_NAME), false)
    }

    /// `required` 為真時檔案不存在視為錯誤（使用者明確指定的設定檔）
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        Ok(Self {
            settings: Self::load_settings(path, required)?,
        })
    }

    fn load_settings(path: &Path, required: bool) -> Result<UserSettings> {
        if !path.exists() && !required {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析設定檔: {}", path.display()))
    }
}
