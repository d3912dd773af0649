//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `Compositor` 只负责流程编排与资源上限管理，不关心文本从哪里来、图片最终去哪里。
//! 处理链路固定为：
//! 1. 校验样式参数
//! 2. 解析字体（失败静默回退）
//! 3. 分段、换行、测量画布尺寸，并按 `max_canvas_pixels` 检查画布大小
//! 4. 构建底图（拉伸背景图或纯白画布）
//! 5. 逐行绘制文字
//!
//! ## 实现思路
//!
//! - 资源上限通过 `Arc<RwLock<CompositorLimits>>` 支持运行时切换缩放档位。
//! - 单次合成内使用同一份上限快照，避免处理中途配置漂移。
//! - 记录 `font/layout/canvas/draw/total` 阶段耗时，便于性能诊断。
//! - 每次调用都分配新画布，不共享可变状态，可在多线程中并发调用。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use super::font::ResolvedFont;
use super::layout::{LayoutMetrics, LayoutPlan};
use super::{CompositorLimits, ComposeError, ResizeQuality, StyleConfig};

const BLANK_CANVAS: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 合成结果：画好文字的 RGBA 画布与排版指标。
#[derive(Debug, Clone)]
pub struct LayoutResult {
    pub image: RgbaImage,
    pub metrics: LayoutMetrics,
    /// 所选字体加载失败、改用内置字体时为 `true`。
    pub used_fallback_font: bool,
}

impl LayoutResult {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// 排版合成器。
pub struct Compositor {
    pub(super) limits: Arc<RwLock<CompositorLimits>>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(CompositorLimits::default())
    }
}

impl Compositor {
    /// 根据资源上限创建合成器。
    ///
    /// # 示例
    /// ```rust
    /// use journal_canvas::compositor::{Compositor, CompositorLimits, StyleConfig};
    ///
    /// let compositor = Compositor::new(CompositorLimits::default());
    /// let result = compositor.compose("Hello world.", &StyleConfig::default())?;
    /// assert_eq!(result.width(), 800);
    /// # Ok::<(), journal_canvas::compositor::ComposeError>(())
    /// ```
    pub fn new(limits: CompositorLimits) -> Self {
        Self {
            limits: Arc::new(RwLock::new(limits)),
        }
    }

    /// 获取资源上限快照，保证单次合成使用一致参数。
    pub(super) fn limits_snapshot(&self) -> Result<CompositorLimits, ComposeError> {
        self.limits
            .read()
            .map(|limits| limits.clone())
            .map_err(|_| ComposeError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 切换背景图缩放档位。
    pub fn set_resize_quality(&self, quality: ResizeQuality) -> Result<(), ComposeError> {
        let mut limits = self
            .limits
            .write()
            .map_err(|_| ComposeError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        limits.apply_resize_quality(quality);

        log::info!(
            "⚙️ 已切换背景缩放档位：{:?}（filter={:?}）",
            quality,
            limits.resize_filter
        );

        Ok(())
    }

    /// 获取当前生效的缩放档位。
    pub fn resize_quality(&self) -> Result<ResizeQuality, ComposeError> {
        Ok(self.limits_snapshot()?.infer_resize_quality())
    }

    /// 只做测量，不绘制。
    pub fn measure(&self, text: &str, style: &StyleConfig) -> Result<LayoutPlan, ComposeError> {
        style.validate()?;
        let font = ResolvedFont::resolve(&style.font, style.point_size)?;
        LayoutPlan::build(text, style, &font)
    }

    /// 合成主入口：文本 + 样式 → 画好文字的画布。
    pub fn compose(&self, text: &str, style: &StyleConfig) -> Result<LayoutResult, ComposeError> {
        style.validate()?;
        let limits = self.limits_snapshot()?;
        let total_start = Instant::now();

        let font_start = Instant::now();
        let font = ResolvedFont::resolve(&style.font, style.point_size)?;
        let font_elapsed = font_start.elapsed();

        let layout_start = Instant::now();
        let plan = LayoutPlan::build(text, style, &font)?;
        let layout_elapsed = layout_start.elapsed();
        limits.check_canvas(plan.metrics.width, plan.metrics.height)?;

        let canvas_start = Instant::now();
        let mut canvas = self.base_canvas(style, &plan.metrics, &limits)?;
        let canvas_elapsed = canvas_start.elapsed();

        let draw_start = Instant::now();
        let ink = style.ink_color.to_rgba();
        for line in plan.positioned_lines() {
            draw_text_mut(&mut canvas, ink, line.x, line.y, font.scale(), font.font(), &line.text);
        }
        let draw_elapsed = draw_start.elapsed();

        log::info!(
            "✅ 图片合成完成 - {}x{} 行数={} 段落={} font={}ms layout={}ms canvas={}ms draw={}ms total={}ms",
            plan.metrics.width,
            plan.metrics.height,
            plan.metrics.line_count,
            plan.metrics.paragraph_count,
            font_elapsed.as_millis(),
            layout_elapsed.as_millis(),
            canvas_elapsed.as_millis(),
            draw_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(LayoutResult {
            image: canvas,
            metrics: plan.metrics,
            used_fallback_font: font.is_fallback(),
        })
    }

    /// 底图：背景图拉伸到画布尺寸，否则纯白。
    fn base_canvas(
        &self,
        style: &StyleConfig,
        metrics: &LayoutMetrics,
        limits: &CompositorLimits,
    ) -> Result<RgbaImage, ComposeError> {
        match &style.background {
            Some(source) => {
                let background = self.load_background(source, limits)?;
                Ok(Self::stretch_to_canvas(
                    &background,
                    metrics.width,
                    metrics.height,
                    limits.resize_filter,
                ))
            }
            None => Ok(RgbaImage::from_pixel(metrics.width, metrics.height, BLANK_CANVAS)),
        }
    }
}

/// 使用默认资源上限合成一次。
pub fn compose(text: &str, style: &StyleConfig) -> Result<LayoutResult, ComposeError> {
    Compositor::default().compose(text, style)
}
