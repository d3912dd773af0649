//! # 排版测量模块
//!
//! ## 设计思路
//!
//! 把“测量”与“绘制”拆开：本模块只根据文本、样式和已解析字体算出画布尺寸与每行坐标，
//! 不触碰像素。这样高度公式可以单独测试，绘制阶段也只需按坐标逐行落笔。
//!
//! 高度公式：
//!
//! ```text
//! height = line_height × max(1, 总行数)
//!        + PARAGRAPH_SPACING × (段落数 - 1)
//!        + 2 × padding
//! ```

use super::config::{StyleConfig, WrapMode, PARAGRAPH_SPACING};
use super::font::ResolvedFont;
use super::wrap::{split_paragraphs, wrap_columns, wrap_pixels};
use super::ComposeError;

/// 一行已定位的文字。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedLine {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

/// 排版汇总指标。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutMetrics {
    pub width: u32,
    pub height: u32,
    pub line_height: u32,
    pub paragraph_spacing: u32,
    pub padding: u32,
    /// 段落数（含空段落）。
    pub paragraph_count: usize,
    /// 实际换行得到的行数（未做最少一行的钳制）。
    pub line_count: usize,
}

impl LayoutMetrics {
    /// 段落间隙数量。
    pub fn paragraph_gaps(&self) -> usize {
        self.paragraph_count.saturating_sub(1)
    }
}

/// 完整排版方案：每段的换行结果加上尺寸指标。
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    pub paragraphs: Vec<Vec<String>>,
    pub metrics: LayoutMetrics,
}

impl LayoutPlan {
    /// 计算排版方案。`style` 需已通过 `validate`。
    pub fn build(text: &str, style: &StyleConfig, font: &ResolvedFont) -> Result<Self, ComposeError> {
        let paragraphs: Vec<Vec<String>> = split_paragraphs(text)
            .into_iter()
            .map(|paragraph| match style.wrap {
                WrapMode::Columns(columns) => wrap_columns(paragraph, columns),
                WrapMode::Pixels => wrap_pixels(paragraph, style.text_area_width() as f32, |line| {
                    font.text_width(line)
                }),
            })
            .collect();

        let line_height = font.line_height();
        let line_count: usize = paragraphs.iter().map(Vec::len).sum();
        let height = Self::canvas_height(line_height, line_count, paragraphs.len(), style.padding)?;

        log::debug!(
            "📐 排版测量 - 段落: {} 行数: {} 行高: {} 画布: {}x{}",
            paragraphs.len(),
            line_count,
            line_height,
            style.canvas_width,
            height
        );

        Ok(Self {
            metrics: LayoutMetrics {
                width: style.canvas_width,
                height,
                line_height,
                paragraph_spacing: PARAGRAPH_SPACING,
                padding: style.padding,
                paragraph_count: paragraphs.len(),
                line_count,
            },
            paragraphs,
        })
    }

    /// 画布高度。总行数至少按一行计，空文本也得到可用的最小画布。
    fn canvas_height(
        line_height: u32,
        line_count: usize,
        paragraph_count: usize,
        padding: u32,
    ) -> Result<u32, ComposeError> {
        let lines = line_count.max(1) as u64;
        let gaps = paragraph_count.saturating_sub(1) as u64;

        let height = (line_height as u64)
            .checked_mul(lines)
            .and_then(|h| h.checked_add(gaps.checked_mul(PARAGRAPH_SPACING as u64)?))
            .and_then(|h| h.checked_add((padding as u64).checked_mul(2)?));

        height
            .and_then(|h| u32::try_from(h).ok())
            .filter(|&h| h > 0)
            .ok_or_else(|| {
                ComposeError::InvalidStyleConfig(format!(
                    "画布高度越界：{} 行 × {}px，{} 个段落",
                    line_count, line_height, paragraph_count
                ))
            })
    }

    /// 按绘制顺序给出每行坐标：从 `(padding, padding)` 开始，
    /// 每行下移 `line_height`，每段结束再下移 `paragraph_spacing`。
    pub fn positioned_lines(&self) -> Vec<PositionedLine> {
        let m = &self.metrics;
        let x = m.padding as i32;
        let mut y = m.padding as i64;
        let mut out = Vec::with_capacity(m.line_count);

        for paragraph in &self.paragraphs {
            for line in paragraph {
                out.push(PositionedLine {
                    x,
                    y: y.min(i32::MAX as i64) as i32,
                    text: line.clone(),
                });
                y += m.line_height as i64;
            }
            y += m.paragraph_spacing as i64;
        }

        out
    }
}
