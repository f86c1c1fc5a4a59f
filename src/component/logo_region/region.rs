use crate::error::{PipelineError, Result};
use std::fmt;
use std::str::FromStr;

/// 影格中搜尋標誌左上角的矩形範圍（像素，含邊界）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRegion {
    pub xmin: u32,
    pub xmax: u32,
    pub ymin: u32,
    pub ymax: u32,
}

impl SearchRegion {
    /// 建立區域並檢查 `min < max`
    pub fn new(xmin: u32, xmax: u32, ymin: u32, ymax: u32) -> Result<Self> {
        let region = Self {
            xmin,
            xmax,
            ymin,
            ymax,
        };
        if xmin >= xmax || ymin >= ymax {
            return Err(PipelineError::InvalidRegionSpec {
                spec: region.to_string(),
                reason: "最小值必須小於最大值".to_string(),
            });
        }
        Ok(region)
    }
}

impl fmt::Display for SearchRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={}..{},y={}..{}",
            self.xmin, self.xmax, self.ymin, self.ymax
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Upper,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corner {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

/// 解析後的區域設定：明確座標或畫面角落
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionSpec {
    Explicit(SearchRegion),
    Corner(Corner),
}

impl FromStr for RegionSpec {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        if s.starts_with("x=") {
            return parse_explicit(s).map(Self::Explicit);
        }

        let (vertical, horizontal) = match s {
            "ul" => (Vertical::Upper, Horizontal::Left),
            "ur" => (Vertical::Upper, Horizontal::Right),
            "ll" => (Vertical::Lower, Horizontal::Left),
            "lr" => (Vertical::Lower, Horizontal::Right),
            _ => return Err(PipelineError::UnknownCornerCode(s.to_string())),
        };
        Ok(Self::Corner(Corner {
            vertical,
            horizontal,
        }))
    }
}

/// 解析 `x=<min>..<max>,y=<min>..<max>`（`...` 亦可）
fn parse_explicit(spec: &str) -> Result<SearchRegion> {
    let invalid = |reason: &str| PipelineError::InvalidRegionSpec {
        spec: spec.to_string(),
        reason: reason.to_string(),
    };

    let rest = spec.strip_prefix("x=").ok_or_else(|| invalid("缺少 x="))?;
    let (x_part, y_part) = rest
        .split_once(",y=")
        .ok_or_else(|| invalid("缺少 ,y="))?;
    let (xmin, xmax) = parse_range(x_part).ok_or_else(|| invalid("x 範圍必須是整數 min..max"))?;
    let (ymin, ymax) = parse_range(y_part).ok_or_else(|| invalid("y 範圍必須是整數 min..max"))?;

    if xmin >= xmax || ymin >= ymax {
        return Err(invalid("最小值必須小於最大值"));
    }
    Ok(SearchRegion {
        xmin,
        xmax,
        ymin,
        ymax,
    })
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    let (min, max) = range.split_once("..")?;
    let max = max.strip_prefix('.').unwrap_or(max);
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(min) || !is_digits(max) {
        return None;
    }
    Some((min.parse().ok()?, max.parse().ok()?))
}

impl RegionSpec {
    /// 依標誌尺寸與影片解析度計算實際搜尋區域
    ///
    /// 角落模式的容許誤差為標誌寬高的一半（至少 1 像素）。
    pub fn resolve(
        &self,
        logo_size: (u32, u32),
        video_size: (u32, u32),
    ) -> Result<SearchRegion> {
        let corner = match self {
            Self::Explicit(region) => return Ok(*region),
            Self::Corner(corner) => corner,
        };

        let (logo_w, logo_h) = logo_size;
        let (video_w, video_h) = video_size;
        let tol_w = (logo_w / 2).max(1);
        let tol_h = (logo_h / 2).max(1);

        let too_large = || PipelineError::InvalidRegionSpec {
            spec: corner.code().to_string(),
            reason: format!("標誌 {logo_w}x{logo_h} 對影片 {video_w}x{video_h} 而言太大"),
        };

        let (ymin, ymax) = match corner.vertical {
            Vertical::Upper => (0, tol_h),
            Vertical::Lower => {
                let ymax = video_h
                    .checked_sub(logo_h + 1)
                    .ok_or_else(too_large)?;
                (ymax.checked_sub(tol_h).ok_or_else(too_large)?, ymax)
            }
        };
        let (xmin, xmax) = match corner.horizontal {
            Horizontal::Left => (0, tol_w),
            Horizontal::Right => {
                let xmax = video_w
                    .checked_sub(logo_w + 1)
                    .ok_or_else(too_large)?;
                (xmax.checked_sub(tol_w).ok_or_else(too_large)?, xmax)
            }
        };

        if ymax > video_h || xmax > video_w {
            return Err(too_large());
        }
        SearchRegion::new(xmin, xmax, ymin, ymax)
    }
}

impl Corner {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match (self.vertical, self.horizontal) {
            (Vertical::Upper, Horizontal::Left) => "ul",
            (Vertical::Upper, Horizontal::Right) => "ur",
            (Vertical::Lower, Horizontal::Left) => "ll",
            (Vertical::Lower, Horizontal::Right) => "lr",
        }
    }
}

/// 由字串直接解析並計算搜尋區域
pub fn resolve_region(
    input: &str,
    logo_size: (u32, u32),
    video_size: (u32, u32),
) -> Result<SearchRegion> {
    input.parse::<RegionSpec>()?.resolve(logo_size, video_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_HD: (u32, u32) = (1920, 1080);
    const LOGO: (u32, u32) = (122, 105);

    #[test]
    fn test_explicit_region_is_verbatim() {
        let region = resolve_region("x=0..100,y=900..1000", LOGO, FULL_HD).unwrap();
        assert_eq!(
            region,
            SearchRegion {
                xmin: 0,
                xmax: 100,
                ymin: 900,
                ymax: 1000
            }
        );
    }

    #[test]
    fn test_explicit_region_accepts_three_dots() {
        let spec: RegionSpec = "x=10...20,y=30...40".parse().unwrap();
        assert_eq!(
            spec,
            RegionSpec::Explicit(SearchRegion {
                xmin: 10,
                xmax: 20,
                ymin: 30,
                ymax: 40
            })
        );
    }

    #[test]
    fn test_explicit_region_rejects_bad_bounds() {
        for bad in [
            "x=100..0,y=0..10",
            "x=0..10,y=5..5",
            "x=a..10,y=0..10",
            "x=0..10,y=0..",
            "x=0..10",
            "x=-1..10,y=0..10",
        ] {
            let err = bad.parse::<RegionSpec>().unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidRegionSpec { .. }),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn test_unknown_corner_code() {
        for bad in ["", "UL", "up", "lc", "left"] {
            assert!(matches!(
                bad.parse::<RegionSpec>(),
                Err(PipelineError::UnknownCornerCode(_))
            ));
        }
    }

    #[test]
    fn test_corner_upper_left() {
        let region = resolve_region("ul", LOGO, FULL_HD).unwrap();
        assert_eq!(region, SearchRegion::new(0, 61, 0, 52).unwrap());
    }

    #[test]
    fn test_corner_lower_right() {
        let region = resolve_region("lr", LOGO, FULL_HD).unwrap();
        // xmax = 1920 - 122 - 1, ymax = 1080 - 105 - 1
        assert_eq!(region, SearchRegion::new(1736, 1797, 922, 974).unwrap());
    }

    #[test]
    fn test_corner_lower_left_and_upper_right() {
        let ll = resolve_region("ll", LOGO, FULL_HD).unwrap();
        assert_eq!((ll.xmin, ll.xmax, ll.ymin, ll.ymax), (0, 61, 922, 974));
        let ur = resolve_region("ur", LOGO, FULL_HD).unwrap();
        assert_eq!((ur.xmin, ur.xmax, ur.ymin, ur.ymax), (1736, 1797, 0, 52));
    }

    #[test]
    fn test_corners_stay_inside_frame() {
        let sizes = [(1, 1), (2, 3), (64, 64), (121, 99), (300, 200)];
        let videos = [(1280, 720), (1920, 1080), (800, 600)];
        for code in ["ul", "ur", "ll", "lr"] {
            for &logo in &sizes {
                for &video in &videos {
                    let r = resolve_region(code, logo, video).unwrap();
                    assert!(r.xmin < r.xmax && r.ymin < r.ymax, "{code} {logo:?} {video:?}");
                    assert!(r.xmax <= video.0 && r.ymax <= video.1);
                }
            }
        }
    }

    #[test]
    fn test_logo_larger_than_video() {
        let err = resolve_region("lr", (2000, 50), FULL_HD).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRegionSpec { .. }));
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let region = SearchRegion::new(1, 2, 3, 4).unwrap();
        assert_eq!(region.to_string(), "x=1..2,y=3..4");
        assert_eq!(
            region.to_string().parse::<RegionSpec>().unwrap(),
            RegionSpec::Explicit(region)
        );
    }
}
