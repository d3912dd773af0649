// Full request flow: chat → summarize → review → render → export.
use std::cell::Cell;

use chrono::{TimeZone, Utc};
use journal_canvas::compositor::{Compositor, StyleConfig};
use journal_canvas::error::AppError;
use journal_canvas::export;
use journal_canvas::session::{
    handle_event, ChatMessage, JournalSession, Role, SessionEvent, SessionPhase, Summarizer,
};

struct ScriptedModel {
    calls: Cell<u32>,
}

impl Summarizer for ScriptedModel {
    fn reply(&self, history: &[ChatMessage]) -> Result<String, AppError> {
        self.calls.set(self.calls.get() + 1);
        let last = history.last().map(|m| m.content.as_str()).unwrap_or_default();
        Ok(format!("That sounds meaningful: {last}"))
    }

    fn summarize(&self, history: &[ChatMessage]) -> Result<String, AppError> {
        self.calls.set(self.calls.get() + 1);
        let said: Vec<&str> = history
            .iter()
            .filter(|m| m.role == Role::User && m.content != "done")
            .map(|m| m.content.as_str())
            .collect();
        Ok(format!("Today {}.\n\nI feel grateful.", said.join(" and ")))
    }
}

struct FailingModel;

impl Summarizer for FailingModel {
    fn reply(&self, _history: &[ChatMessage]) -> Result<String, AppError> {
        Err(AppError::Summarizer("quota exceeded".to_string()))
    }

    fn summarize(&self, _history: &[ChatMessage]) -> Result<String, AppError> {
        Err(AppError::Summarizer("quota exceeded".to_string()))
    }
}

#[test]
fn chat_to_exported_png() {
    let model = ScriptedModel { calls: Cell::new(0) };
    let now = Utc.with_ymd_and_hms(2024, 7, 14, 18, 30, 0).unwrap();

    let mut state = JournalSession::new();
    for event in [
        SessionEvent::UserMessage("I cooked dinner for my sister".to_string()),
        SessionEvent::UserMessage("done".to_string()),
        SessionEvent::Summarize,
    ] {
        state = handle_event(&state, event, &model, &now).expect("transition");
    }

    assert_eq!(state.phase(), SessionPhase::Reviewing);
    assert_eq!(model.calls.get(), 2);
    let blog = state.blog().expect("blog").to_string();
    assert!(blog.starts_with("Date: 2024-07-14 18:30:00\n\nToday I cooked dinner"));

    state = handle_event(&state, SessionEvent::Export, &model, &now).expect("export");
    assert_eq!(state.phase(), SessionPhase::Exporting);

    let result = state
        .render(&Compositor::default(), &StyleConfig::default())
        .expect("render");
    // 日期前缀 + 两段正文
    assert_eq!(result.metrics.paragraph_count, 3);

    let tmp = tempfile::tempdir().expect("tempdir");
    let path = export::save_png(&result, tmp.path(), &now).expect("save");
    assert!(path.ends_with("journal_20240714_183000.png"));

    state = handle_event(&state, SessionEvent::ExportFinished, &model, &now).expect("finish");
    assert_eq!(state.phase(), SessionPhase::Reviewing);

    state = handle_event(&state, SessionEvent::StartOver, &model, &now).expect("reset");
    assert_eq!(state, JournalSession::new());
}

#[test]
fn edited_blog_is_what_gets_rendered() {
    let model = ScriptedModel { calls: Cell::new(0) };
    let now = Utc::now();
    let state = JournalSession::new()
        .submit("done", &model)
        .and_then(|s| s.summarize(&model, &now))
        .and_then(|s| s.edit_blog("Just one line."))
        .expect("flow");

    assert_eq!(state.blog(), Some("Just one line."));
    let result = state
        .render(&Compositor::default(), &StyleConfig::default())
        .expect("render");
    assert_eq!(result.metrics.line_count, 1);
}

#[test]
fn render_before_summary_is_rejected() {
    let state = JournalSession::new();
    let result = state.render(&Compositor::default(), &StyleConfig::default());
    assert!(matches!(result, Err(AppError::Session(_))));
}

#[test]
fn model_failure_leaves_previous_state_usable() {
    let state = JournalSession::new();
    let result = state.submit("hello", &FailingModel);
    assert!(matches!(result, Err(AppError::Summarizer(_))));
    assert_eq!(state.messages().len(), 1);

    let summarizing = state.submit("done", &FailingModel).expect("done needs no model call");
    assert!(summarizing.summarize(&FailingModel, &Utc::now()).is_err());
    assert_eq!(summarizing.phase(), SessionPhase::Summarizing);
}

#[test]
fn session_state_round_trips_through_json() {
    let model = ScriptedModel { calls: Cell::new(0) };
    let state = JournalSession::new().submit("rainy day", &model).expect("submit");
    let json = serde_json::to_string(&state).expect("serialize");
    let restored: JournalSession = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, state);
}
