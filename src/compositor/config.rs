//! # 配置模块
//!
//! ## 设计思路
//!
//! 样式参数（`StyleConfig`）按次传入，资源上限（`CompositorLimits`）随合成器常驻。
//! 两者分离后，前端调整字号/颜色不会影响背景图的安全阈值，反之亦然。
//!
//! ## 实现思路
//!
//! - 排版常量集中定义在本模块，行距附加量取 8px、段间距取 12px。
//! - `StyleConfig::validate` 在排版前执行，拒绝会产生负绘制区域的参数组合。
//! - `ResizeQuality` 作为高层语义映射到缩放滤镜，与旧版性能档位保持同样的字符串协议。

use image::imageops::FilterType;

use super::color::InkColor;
use super::source::{BackgroundSource, FontSource};
use super::ComposeError;

/// 默认画布宽度（像素）。
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
/// 默认内边距（像素）。
pub const DEFAULT_PADDING: u32 = 40;
/// 默认字号。
pub const DEFAULT_POINT_SIZE: u32 = 20;
/// 默认墨水颜色。
pub const DEFAULT_INK_COLOR: &str = "#333333";
/// 按字符列换行时的列宽。
pub const WRAP_COLUMNS: usize = 70;
/// 行高 = 字母 `A` 包围盒底边 + 该附加量。
pub const LINE_MARGIN: u32 = 8;
/// 段落之间额外的垂直间距。
pub const PARAGRAPH_SPACING: u32 = 12;

/// 换行策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    /// 按字符数换行（默认，70 列）。
    Columns(usize),
    /// 按已解析字体的像素宽度换行，可用宽度为 `canvas_width - 2 * padding`。
    Pixels,
}

impl Default for WrapMode {
    fn default() -> Self {
        Self::Columns(WRAP_COLUMNS)
    }
}

/// 单次合成的样式参数。
#[derive(Debug, Clone)]
pub struct StyleConfig {
    /// 字体来源；加载失败时静默回退到内置字体。
    pub font: FontSource,
    /// 字号（正整数）。
    pub point_size: u32,
    /// 文字颜色。
    pub ink_color: InkColor,
    /// 画布宽度（像素）。
    pub canvas_width: u32,
    /// 四周内边距（像素）。
    pub padding: u32,
    /// 可选背景图，会被拉伸到画布尺寸。
    pub background: Option<BackgroundSource>,
    /// 换行策略。
    pub wrap: WrapMode,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font: FontSource::Builtin,
            point_size: DEFAULT_POINT_SIZE,
            ink_color: InkColor::default(),
            canvas_width: DEFAULT_CANVAS_WIDTH,
            padding: DEFAULT_PADDING,
            background: None,
            wrap: WrapMode::default(),
        }
    }
}

impl StyleConfig {
    /// 校验样式参数的前置条件。
    ///
    /// # 示例
    /// ```rust
    /// use journal_canvas::compositor::StyleConfig;
    ///
    /// let style = StyleConfig { canvas_width: 60, padding: 40, ..Default::default() };
    /// assert!(style.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.canvas_width == 0 {
            return Err(ComposeError::InvalidStyleConfig(
                "canvas_width 必须大于 0".to_string(),
            ));
        }
        if self.point_size == 0 {
            return Err(ComposeError::InvalidStyleConfig(
                "point_size 必须大于 0".to_string(),
            ));
        }

        let horizontal_padding = self.padding.checked_mul(2).ok_or_else(|| {
            ComposeError::InvalidStyleConfig(format!("padding 过大：{}", self.padding))
        })?;
        if self.canvas_width <= horizontal_padding {
            return Err(ComposeError::InvalidStyleConfig(format!(
                "canvas_width（{}）必须大于 2 × padding（{}），否则没有可绘制区域",
                self.canvas_width, horizontal_padding
            )));
        }

        if let WrapMode::Columns(0) = self.wrap {
            return Err(ComposeError::InvalidStyleConfig(
                "换行列宽必须大于 0".to_string(),
            ));
        }

        Ok(())
    }

    /// 文字可用的水平宽度（像素）。调用前需已通过 `validate`。
    pub fn text_area_width(&self) -> u32 {
        self.canvas_width.saturating_sub(self.padding.saturating_mul(2))
    }
}

/// 背景图资源上限与缩放策略。
#[derive(Debug, Clone)]
pub struct CompositorLimits {
    /// 读取背景图原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 输出画布的像素上限（`width * height`）。
    pub max_canvas_pixels: u64,
    /// 背景图拉伸滤镜。
    pub resize_filter: FilterType,
}

impl Default for CompositorLimits {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_canvas_pixels: 64_000_000,
            resize_filter: FilterType::Triangle,
        }
    }
}

/// 背景图缩放质量档位（面向产品/用户语义）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeQuality {
    Quality,
    Balanced,
    Speed,
}

impl ResizeQuality {
    /// 从外部字符串解析档位。
    pub fn parse(profile: &str) -> Result<Self, ComposeError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ComposeError::InvalidFormat(format!(
                "未知缩放档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串，供设置文件持久化。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl CompositorLimits {
    /// 分配输出画布前检查尺寸，超限时返回 `ResourceLimit`。
    pub fn check_canvas(&self, width: u32, height: u32) -> Result<(), ComposeError> {
        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.max_canvas_pixels {
            return Err(ComposeError::ResourceLimit(format!(
                "画布像素过大：{}x{}（限制：{} 像素）",
                width, height, self.max_canvas_pixels
            )));
        }

        pixels
            .checked_mul(4)
            .and_then(|bytes| usize::try_from(bytes).ok())
            .map(|_| ())
            .ok_or_else(|| {
                ComposeError::ResourceLimit(format!("画布内存超出寻址范围：{}x{}", width, height))
            })
    }

    /// 基于当前滤镜反推档位。
    pub fn infer_resize_quality(&self) -> ResizeQuality {
        match self.resize_filter {
            FilterType::CatmullRom | FilterType::Lanczos3 => ResizeQuality::Quality,
            FilterType::Nearest => ResizeQuality::Speed,
            FilterType::Triangle | FilterType::Gaussian => ResizeQuality::Balanced,
        }
    }

    /// 应用指定档位到实际滤镜。
    pub fn apply_resize_quality(&mut self, quality: ResizeQuality) {
        self.resize_filter = match quality {
            ResizeQuality::Quality => FilterType::CatmullRom,
            ResizeQuality::Balanced => FilterType::Triangle,
            ResizeQuality::Speed => FilterType::Nearest,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_check_rejects_oversized_output() {
        let limits = CompositorLimits::default();
        assert!(limits.check_canvas(800, 120).is_ok());
        assert!(matches!(
            limits.check_canvas(u32::MAX, 1_500_000_100),
            Err(ComposeError::ResourceLimit(_))
        ));

        let tight = CompositorLimits {
            max_canvas_pixels: 800 * 100,
            ..Default::default()
        };
        assert!(tight.check_canvas(800, 100).is_ok());
        assert!(matches!(
            tight.check_canvas(800, 101),
            Err(ComposeError::ResourceLimit(_))
        ));
    }

    #[test]
    fn default_style_is_valid() {
        let style = StyleConfig::default();
        assert!(style.validate().is_ok());
        assert_eq!(style.text_area_width(), 720);
    }

    #[test]
    fn zero_width_is_rejected() {
        let style = StyleConfig {
            canvas_width: 0,
            ..Default::default()
        };
        assert!(matches!(
            style.validate(),
            Err(ComposeError::InvalidStyleConfig(_))
        ));
    }

    #[test]
    fn padding_consuming_whole_width_is_rejected() {
        let style = StyleConfig {
            canvas_width: 80,
            padding: 40,
            ..Default::default()
        };
        assert!(matches!(
            style.validate(),
            Err(ComposeError::InvalidStyleConfig(_))
        ));

        let style = StyleConfig {
            canvas_width: 81,
            padding: 40,
            ..Default::default()
        };
        assert!(style.validate().is_ok());
    }

    #[test]
    fn zero_padding_is_allowed() {
        let style = StyleConfig {
            canvas_width: 1,
            padding: 0,
            ..Default::default()
        };
        assert!(style.validate().is_ok());
    }

    #[test]
    fn huge_padding_does_not_overflow() {
        let style = StyleConfig {
            padding: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(
            style.validate(),
            Err(ComposeError::InvalidStyleConfig(_))
        ));
    }

    #[test]
    fn zero_point_size_and_zero_columns_are_rejected() {
        let style = StyleConfig {
            point_size: 0,
            ..Default::default()
        };
        assert!(style.validate().is_err());

        let style = StyleConfig {
            wrap: WrapMode::Columns(0),
            ..Default::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn resize_quality_round_trips_through_limits() {
        let mut limits = CompositorLimits::default();
        assert_eq!(limits.infer_resize_quality(), ResizeQuality::Balanced);

        for quality in [ResizeQuality::Quality, ResizeQuality::Speed, ResizeQuality::Balanced] {
            limits.apply_resize_quality(quality);
            assert_eq!(limits.infer_resize_quality(), quality);
            assert_eq!(ResizeQuality::parse(quality.as_str()).ok(), Some(quality));
        }

        assert!(ResizeQuality::parse("ultra").is_err());
    }
}
