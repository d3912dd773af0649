//! # 日记出图工具：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              外层界面（聊天 + 外观控件，不在本 crate）     │
//! │        ↕ 消息 / 外观设置            ↕ 图片 / 下载         │
//! └───────┼─────────────────────────────┼────────────────────┘
//!         ↕                             ↕
//! ┌───────┼─────────────────────────────┼────────────────────┐
//! │       ↕            后端 (Rust)      ↕                    │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ session ──── 会话状态机 + Summarizer 接口             │
//! │  │                                                       │
//! │  ├─ compositor ─ 字体·换行·测量·背景·绘制                 │
//! │  │                                                       │
//! │  ├─ settings ─── 外观设置 (settings.json)                 │
//! │  └─ export ───── PNG 编码 + journal_<时间戳>.png          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`compositor`] | 把日记正文排版并绘制到画布上 |
//! | [`session`] | 对话收集 → 生成 → 审阅 → 导出 的显式状态机 |
//! | [`settings`] | 外观设置的持久化与到 `StyleConfig` 的转换 |
//! | [`export`] | PNG 编码、文件命名、导出目录 |

pub mod compositor;
pub mod error;
pub mod export;
pub mod session;
pub mod settings;
