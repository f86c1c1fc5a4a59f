use super::region::RegionSpec;
use crate::error::{PipelineError, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// `--split-at` / `--stop-at` 的值：`<region>:<logo.png>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoSpec {
    pub region: RegionSpec,
    pub logo_path: PathBuf,
}

impl FromStr for LogoSpec {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| PipelineError::InvalidLogoSpec {
            spec: s.to_string(),
            reason: reason.to_string(),
        };

        // 區域部分不含冒號，所以在第一個冒號切開（Windows 路徑可能含冒號）
        let (region, logo) = s
            .split_once(':')
            .filter(|(r, l)| !r.is_empty() && !l.is_empty())
            .ok_or_else(|| invalid("必須是以 ':' 分隔的兩個部分"))?;

        if !has_png_extension(Path::new(logo)) {
            return Err(invalid("標誌檔案類型錯誤，必須是 *.png 或 *.PNG"));
        }

        Ok(Self {
            region: region.parse()?,
            logo_path: PathBuf::from(logo),
        })
    }
}

impl fmt::Display for LogoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match &self.region {
            RegionSpec::Explicit(region) => region.to_string(),
            RegionSpec::Corner(corner) => corner.code().to_string(),
        };
        write!(f, "{region}:{}", self.logo_path.display())
    }
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "png" || ext == "PNG")
}

/// 已確認存在並量過尺寸的標誌圖片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoReference {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl LogoReference {
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
