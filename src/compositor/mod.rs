//! # 排版合成模块（compositor）
//!
//! ## 设计思路
//!
//! 该模块把“字体解析 → 分段换行 → 尺寸测量 → 底图构建 → 逐行绘制”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。整个合成过程是纯同步函数：除读取字体与背景图外没有副作用，
//! 相同输入（含字体文件字节）得到逐字节相同的输出。
//!
//! - `handler`：编排整条流水线，持有资源上限
//! - `font`：字体加载与回退、行高测量
//! - `wrap`：分段与贪心换行
//! - `layout`：画布高度公式与每行坐标
//! - `background`：背景图加载校验、解码、拉伸
//! - `color`：墨水颜色解析
//! - `config/error/source`：配置、错误、输入来源模型
//!
//! ## 调用链
//!
//! ```text
//! compose(text, style)
//!    ↓
//! handler.rs（校验 + 阶段耗时日志）
//!    ├─ font.rs（解析字体，失败回退内置字体）
//!    ├─ layout.rs ── wrap.rs（分段换行 + 高度测量）
//!    ├─ background.rs（可选背景图：校验 + 解码 + 拉伸）
//!    └─ imageproc::draw_text_mut（逐行绘制）
//!    ↓
//! LayoutResult
//! ```

mod background;
mod color;
mod config;
mod error;
mod font;
mod handler;
pub mod layout;
mod source;
pub mod wrap;

pub use color::InkColor;
pub use config::{
    CompositorLimits, ResizeQuality, StyleConfig, WrapMode, DEFAULT_CANVAS_WIDTH,
    DEFAULT_INK_COLOR, DEFAULT_PADDING, DEFAULT_POINT_SIZE, LINE_MARGIN, PARAGRAPH_SPACING,
    WRAP_COLUMNS,
};
pub use error::ComposeError;
pub use font::{builtin_font_bytes, ResolvedFont};
pub use handler::{compose, Compositor, LayoutResult};
pub use layout::{LayoutMetrics, LayoutPlan, PositionedLine};
pub use source::{BackgroundSource, FontSource};
