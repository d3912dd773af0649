//! 会话状态模块
//!
//! # 设计思路
//!
//! 对话记录、生成的日记正文、当前阶段全部收进一个显式的 `JournalSession` 值里，
//! 每个请求接收旧状态、返回新状态，不依赖任何全局可变变量。阶段迁移是一个小状态机：
//!
//! ```text
//! Collecting ──"done"──▶ Summarizing ──summary──▶ Reviewing ◀──▶ Exporting
//!     ▲  │                                              │
//!     │  └─ 其他输入：追加助手回复，留在 Collecting         │
//!     └──────────────────── StartOver ◀─────────────────┘
//! ```
//!
//! # 实现思路
//!
//! - 语言模型是外部协作方，通过 `Summarizer` trait 注入；本 crate 不含网络客户端。
//! - 非法迁移返回 `AppError::Session`，旧状态保持不变。
//! - 生成的正文带 `Date: YYYY-MM-DD HH:MM:SS` 前缀，与合成器的段落规则配合（前缀独占一段）。

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::compositor::{Compositor, LayoutResult, StyleConfig};
use crate::error::AppError;

/// 会话开场白。
pub const GREETING: &str = "Hey! How was your day today?";
/// 结束对话、触发生成的指令（忽略大小写与首尾空白）。
pub const FINISH_COMMAND: &str = "done";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Collecting,
    Summarizing,
    Reviewing,
    Exporting,
}

/// 外部语言模型协作方。
pub trait Summarizer {
    /// 对话中的共情回复或追问。
    fn reply(&self, history: &[ChatMessage]) -> Result<String, AppError>;

    /// 把整段对话写成第一人称的反思日记。
    fn summarize(&self, history: &[ChatMessage]) -> Result<String, AppError>;
}

/// 单个请求可触发的事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    UserMessage(String),
    Summarize,
    EditBlog(String),
    Export,
    ExportFinished,
    StartOver,
}

/// 一次会话的完整状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalSession {
    phase: SessionPhase,
    messages: Vec<ChatMessage>,
    blog: Option<String>,
}

impl Default for JournalSession {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Collecting,
            messages: vec![ChatMessage::assistant(GREETING)],
            blog: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn blog(&self) -> Option<&str> {
        self.blog.as_deref()
    }

    /// `Role: content` 逐行拼接的对话记录。
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn expect_phase(&self, expected: SessionPhase, action: &str) -> Result<(), AppError> {
        if self.phase != expected {
            return Err(AppError::Session(format!(
                "当前阶段 {:?} 不允许{}（需要 {:?}）",
                self.phase, action, expected
            )));
        }
        Ok(())
    }

    /// 用户发言。输入 `done` 时进入 `Summarizing`，否则追加助手回复。
    pub fn submit<S>(&self, input: &str, summarizer: &S) -> Result<Self, AppError>
    where
        S: Summarizer + ?Sized,
    {
        self.expect_phase(SessionPhase::Collecting, "发送消息")?;

        let mut next = self.clone();
        next.messages.push(ChatMessage::user(input));

        if input.trim().eq_ignore_ascii_case(FINISH_COMMAND) {
            log::info!("📝 对话结束，准备生成日记 - 消息数: {}", next.messages.len());
            next.phase = SessionPhase::Summarizing;
            return Ok(next);
        }

        let reply = summarizer.reply(&next.messages)?;
        next.messages.push(ChatMessage::assistant(reply));
        Ok(next)
    }

    /// 调用摘要服务生成正文，进入 `Reviewing`。
    pub fn summarize<S, Tz>(&self, summarizer: &S, now: &DateTime<Tz>) -> Result<Self, AppError>
    where
        S: Summarizer + ?Sized,
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        self.expect_phase(SessionPhase::Summarizing, "生成日记")?;

        let summary = summarizer.summarize(&self.messages)?;
        let mut next = self.clone();
        next.blog = Some(format!(
            "Date: {}\n\n{}",
            now.format("%Y-%m-%d %H:%M:%S"),
            summary.trim()
        ));
        next.phase = SessionPhase::Reviewing;

        log::info!("✅ 日记生成完成 - 字数: {}", summary.chars().count());
        Ok(next)
    }

    /// 用户在审阅阶段修改正文。
    pub fn edit_blog(&self, text: impl Into<String>) -> Result<Self, AppError> {
        self.expect_phase(SessionPhase::Reviewing, "编辑正文")?;
        let mut next = self.clone();
        next.blog = Some(text.into());
        Ok(next)
    }

    pub fn begin_export(&self) -> Result<Self, AppError> {
        self.expect_phase(SessionPhase::Reviewing, "导出")?;
        let mut next = self.clone();
        next.phase = SessionPhase::Exporting;
        Ok(next)
    }

    pub fn finish_export(&self) -> Result<Self, AppError> {
        self.expect_phase(SessionPhase::Exporting, "结束导出")?;
        let mut next = self.clone();
        next.phase = SessionPhase::Reviewing;
        Ok(next)
    }

    /// 按当前正文出图。仅在已有正文的阶段可用。
    pub fn render(&self, compositor: &Compositor, style: &StyleConfig) -> Result<LayoutResult, AppError> {
        let blog = match (self.phase, self.blog.as_deref()) {
            (SessionPhase::Reviewing | SessionPhase::Exporting, Some(blog)) => blog,
            _ => {
                return Err(AppError::Session(format!(
                    "当前阶段 {:?} 没有可出图的正文",
                    self.phase
                )))
            }
        };
        Ok(compositor.compose(blog, style)?)
    }
}

/// 请求处理入口：旧状态 + 事件 → 新状态。
pub fn handle_event<S, Tz>(
    state: &JournalSession,
    event: SessionEvent,
    summarizer: &S,
    now: &DateTime<Tz>,
) -> Result<JournalSession, AppError>
where
    S: Summarizer + ?Sized,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match event {
        SessionEvent::UserMessage(input) => state.submit(&input, summarizer),
        SessionEvent::Summarize => state.summarize(summarizer, now),
        SessionEvent::EditBlog(text) => state.edit_blog(text),
        SessionEvent::Export => state.begin_export(),
        SessionEvent::ExportFinished => state.finish_export(),
        SessionEvent::StartOver => Ok(JournalSession::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    struct Echo;

    impl Summarizer for Echo {
        fn reply(&self, history: &[ChatMessage]) -> Result<String, AppError> {
            Ok(format!("heard {} messages", history.len()))
        }

        fn summarize(&self, _history: &[ChatMessage]) -> Result<String, AppError> {
            Ok("  Today was quiet.  ".to_string())
        }
    }

    #[test]
    fn starts_collecting_with_greeting() {
        let session = JournalSession::new();
        assert_eq!(session.phase(), SessionPhase::Collecting);
        assert_eq!(session.messages(), &[ChatMessage::assistant(GREETING)]);
        assert!(session.blog().is_none());
    }

    #[test]
    fn ordinary_message_gets_a_reply() {
        let session = JournalSession::new().submit("I went hiking", &Echo).expect("submit");
        assert_eq!(session.phase(), SessionPhase::Collecting);
        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2], ChatMessage::assistant("heard 2 messages"));
    }

    #[test]
    fn done_is_case_and_space_insensitive() {
        let session = JournalSession::new().submit("  DoNe ", &Echo).expect("submit");
        assert_eq!(session.phase(), SessionPhase::Summarizing);
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn summary_is_prefixed_with_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 21, 0, 9).unwrap();
        let session = JournalSession::new()
            .submit("done", &Echo)
            .and_then(|s| s.summarize(&Echo, &now))
            .expect("summarize");

        assert_eq!(session.phase(), SessionPhase::Reviewing);
        assert_eq!(session.blog(), Some("Date: 2024-05-06 21:00:09\n\nToday was quiet."));
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let session = JournalSession::new();
        assert!(matches!(session.begin_export(), Err(AppError::Session(_))));
        assert!(matches!(session.edit_blog("x"), Err(AppError::Session(_))));
        assert!(matches!(
            session.summarize(&Echo, &Utc::now()),
            Err(AppError::Session(_))
        ));
    }

    #[test]
    fn transcript_uses_role_labels() {
        let session = JournalSession::new().submit("fine", &Echo).expect("submit");
        assert_eq!(
            session.transcript(),
            "Assistant: Hey! How was your day today?\nUser: fine\nAssistant: heard 2 messages"
        );
    }
}
