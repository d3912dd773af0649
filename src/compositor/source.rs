//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `FontSource` / `BackgroundSource` 表示外部来源语义
//! - `RawImageData` 表示已加载但未解码的背景图字节

use std::path::PathBuf;

use image::DynamicImage;

/// 字体来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// 本地字体文件路径（ttf / otf）。
    Path(PathBuf),
    /// 已在内存中的字体文件字节。
    Bytes(Vec<u8>),
    /// 内置回退字体。
    Builtin,
}

impl FontSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// 日志中使用的简短描述。
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            Self::Builtin => "<builtin>".to_string(),
        }
    }
}

/// 背景图来源。
#[derive(Debug, Clone)]
pub enum BackgroundSource {
    /// 本地文件路径来源。
    FilePath(String),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64(String),
    /// 上传得到的原始文件字节。
    Bytes(Vec<u8>),
    /// 已解码的图像。
    Image(DynamicImage),
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}
