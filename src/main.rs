//! # 日记出图工具：命令行入口
//!
//! 用法：`journal-canvas <post.txt> [settings.json]`
//!
//! 本文件仅负责日志初始化、参数读取与调用编排，业务逻辑见 `lib.rs` 架构文档。

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use journal_canvas::compositor::Compositor;
use journal_canvas::error::AppError;
use journal_canvas::{export, settings};

fn run(post_path: &Path, settings_path: &Path) -> Result<PathBuf, AppError> {
    let app_settings = settings::load_settings_from_path(settings_path);
    log::info!("setup: settings loaded from {}", settings_path.display());

    let text = std::fs::read_to_string(post_path)?;
    let style = app_settings.to_style_config()?;

    let compositor = Compositor::default();
    compositor.set_resize_quality(app_settings.resize_quality()?)?;

    let result = compositor.compose(&text, &style)?;
    if result.used_fallback_font {
        log::warn!("所选字体不可用，已使用内置字体: {}", app_settings.font_path().display());
    }

    let dir = export::resolve_output_dir(app_settings.output_dir.as_deref())?;
    export::save_png(&result, &dir, &Local::now())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args_os().skip(1);
    let Some(post_path) = args.next().map(PathBuf::from) else {
        eprintln!("用法: journal-canvas <post.txt> [settings.json]");
        return ExitCode::from(2);
    };
    let settings_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(settings::SETTINGS_FILE_NAME));

    match run(&post_path, &settings_path) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("出图失败: {err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
