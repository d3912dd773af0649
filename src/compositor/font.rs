//! # 字体解析模块
//!
//! ## 设计思路
//!
//! 字体加载失败属于“可吸收”的错误：任何失败都替换为内置回退字体，调用方只会在日志里看到告警。
//! 内置字体来自 `typst-assets` 打包的字体集，首次使用时解析一次，之后只读共享。
//!
//! ## 实现思路
//!
//! - 字号按“每 em 像素数”解释，再换算成 `ab_glyph` 的 `PxScale`（按 ascent - descent 计高）。
//! - 行高取字母 `A` 轮廓包围盒底边（以行顶为原点，基线在 ascent 处）再加固定附加量。

use std::path::Path;

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use once_cell::sync::Lazy;

use super::config::LINE_MARGIN;
use super::source::FontSource;
use super::ComposeError;

/// 字体加载失败原因。仅在本模块内部流转，最终被回退字体吸收。
#[derive(Debug, thiserror::Error)]
enum FontResolutionFailure {
    #[error("无法读取字体文件 {path}：{reason}")]
    Unreadable { path: String, reason: String },

    #[error("字体数据无效：{0}")]
    InvalidFont(String),
}

static FALLBACK_FONT: Lazy<Option<FontArc>> = Lazy::new(|| {
    let font = typst_assets::fonts().find_map(|data| FontArc::try_from_slice(data).ok());
    if font.is_none() {
        log::error!("❌ 内置字体集中没有可解析的字体");
    }
    font
});

/// 已解析、可直接绘制的字体。
#[derive(Clone)]
pub struct ResolvedFont {
    font: FontArc,
    scale: PxScale,
    is_fallback: bool,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("scale", &self.scale)
            .field("is_fallback", &self.is_fallback)
            .finish()
    }
}

impl ResolvedFont {
    /// 按来源解析字体；失败时返回内置字体。
    ///
    /// 仅当内置字体本身不可用时才返回错误，这在正常构建中不会发生。
    pub fn resolve(source: &FontSource, point_size: u32) -> Result<Self, ComposeError> {
        match Self::try_load(source) {
            Ok(Some(font)) => Ok(Self::with_size(font, point_size, false)),
            Ok(None) => Self::builtin(point_size, false),
            Err(failure) => {
                log::warn!(
                    "⚠️ 字体加载失败，回退到内置字体 - 来源: {} 原因: {}",
                    source.describe(),
                    failure
                );
                Self::fallback(point_size)
            }
        }
    }

    /// 内置回退字体。
    pub fn fallback(point_size: u32) -> Result<Self, ComposeError> {
        Self::builtin(point_size, true)
    }

    fn builtin(point_size: u32, is_fallback: bool) -> Result<Self, ComposeError> {
        let font = FALLBACK_FONT
            .as_ref()
            .cloned()
            .ok_or_else(|| ComposeError::Decode("内置字体不可用".to_string()))?;
        Ok(Self::with_size(font, point_size, is_fallback))
    }

    fn try_load(source: &FontSource) -> Result<Option<FontArc>, FontResolutionFailure> {
        match source {
            FontSource::Builtin => Ok(None),
            FontSource::Path(path) => Self::load_from_path(path).map(Some),
            FontSource::Bytes(bytes) => FontArc::try_from_vec(bytes.clone())
                .map(Some)
                .map_err(|e| FontResolutionFailure::InvalidFont(e.to_string())),
        }
    }

    fn load_from_path(path: &Path) -> Result<FontArc, FontResolutionFailure> {
        let bytes = std::fs::read(path).map_err(|e| FontResolutionFailure::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        FontArc::try_from_vec(bytes).map_err(|e| FontResolutionFailure::InvalidFont(e.to_string()))
    }

    fn with_size(font: FontArc, point_size: u32, is_fallback: bool) -> Self {
        let scale = em_scale(&font, point_size);
        Self {
            font,
            scale,
            is_fallback,
        }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    pub fn scale(&self) -> PxScale {
        self.scale
    }

    /// 是否因加载失败而改用内置字体。显式选择 `FontSource::Builtin` 时为 `false`。
    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    /// 单行高度：字母 `A` 包围盒底边 + `LINE_MARGIN`。
    pub fn line_height(&self) -> u32 {
        let scaled = self.font.as_scaled(self.scale);
        let ascent = scaled.ascent();
        let glyph = scaled
            .glyph_id('A')
            .with_scale_and_position(self.scale, point(0.0, ascent));

        let bottom = self
            .font
            .outline_glyph(glyph)
            .map(|outlined| outlined.px_bounds().max.y)
            .unwrap_or(ascent);

        bottom.ceil().max(0.0) as u32 + LINE_MARGIN
    }

    /// 按字形步进与字距累计一行文字的像素宽度。
    pub fn text_width(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0;
        let mut previous = None;

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }

        width
    }
}

/// 将字号（每 em 像素数）换算为 `PxScale`。
fn em_scale(font: &FontArc, point_size: u32) -> PxScale {
    let size = point_size as f32;
    match font.units_per_em() {
        Some(units_per_em) if units_per_em > 0.0 => {
            PxScale::from(size * font.height_unscaled() / units_per_em)
        }
        _ => PxScale::from(size),
    }
}

/// 内置字体的原始字节，供需要“同一份字体文件”的调用方（如设置默认值、测试）使用。
pub fn builtin_font_bytes() -> Option<&'static [u8]> {
    typst_assets::fonts().find(|data| FontArc::try_from_slice(data).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_falls_back_silently() {
        let source = FontSource::path("/definitely/not/here/Roboto.ttf");
        let font = ResolvedFont::resolve(&source, 20).expect("fallback must succeed");
        assert!(font.is_fallback());
    }

    #[test]
    fn garbage_bytes_fall_back_silently() {
        let source = FontSource::Bytes(b"not a font at all".to_vec());
        let font = ResolvedFont::resolve(&source, 20).expect("fallback must succeed");
        assert!(font.is_fallback());
    }

    #[test]
    fn requested_builtin_is_not_a_fallback() {
        let font = ResolvedFont::resolve(&FontSource::Builtin, 20).expect("builtin");
        assert!(!font.is_fallback());
        assert_eq!(font.line_height(), ResolvedFont::fallback(20).expect("fallback").line_height());
    }

    #[test]
    fn builtin_bytes_load_as_a_real_font() {
        let bytes = builtin_font_bytes().expect("builtin font bytes");
        let font = ResolvedFont::resolve(&FontSource::Bytes(bytes.to_vec()), 20).expect("font");
        assert!(!font.is_fallback());

        let fallback = ResolvedFont::fallback(20).expect("fallback");
        assert_eq!(font.line_height(), fallback.line_height());
    }

    #[test]
    fn line_height_grows_with_point_size() {
        let small = ResolvedFont::fallback(12).expect("font");
        let large = ResolvedFont::fallback(48).expect("font");
        assert!(small.line_height() > LINE_MARGIN);
        assert!(large.line_height() > small.line_height());
    }

    #[test]
    fn text_width_is_additive_for_longer_text() {
        let font = ResolvedFont::fallback(20).expect("font");
        assert_eq!(font.text_width(""), 0.0);
        assert!(font.text_width("Hello world") > font.text_width("Hello"));
    }
}
