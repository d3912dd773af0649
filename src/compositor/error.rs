//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载排版合成链路中的所有错误来源，避免字符串拼接式错误处理。
//! 字体加载失败不在此列：它在 `font` 模块内部被回退字体吸收，永远不会返回给调用方。

/// 排版合成统一错误类型。
///
/// 该类型会在应用层被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// 样式参数不满足前置条件（画布宽度、内边距、字号、画布高度溢出）。
    #[error("样式配置无效：{0}")]
    InvalidStyleConfig(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// PNG 编码失败。
    #[error("编码错误：{0}")]
    Encode(String),
}
