//! 导出模块
//!
//! # 设计思路
//!
//! 合成结果可以直接展示，也可以编码成 PNG 供下载。本模块负责三件事：
//! 编码 PNG 字节、按时间戳生成文件名、把文件落到导出目录。
//!
//! # 实现思路
//!
//! - 文件名固定为 `journal_<YYYYMMDD_HHMMSS>.png`，时间由调用方传入，便于测试。
//! - 优先使用用户配置的导出目录，未配置时回退到当前目录下的 `exports`。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use image::ImageFormat;

use crate::compositor::{ComposeError, LayoutResult};
use crate::error::AppError;

/// 未配置导出目录时使用的子目录名。
pub const DEFAULT_EXPORT_DIR: &str = "exports";

/// 导出文件名：`journal_<YYYYMMDD_HHMMSS>.png`。
///
/// # 示例
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use journal_canvas::export::export_file_name;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
/// assert_eq!(export_file_name(&now), "journal_20240309_070501.png");
/// ```
pub fn export_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("journal_{}.png", now.format("%Y%m%d_%H%M%S"))
}

/// 将合成结果编码为 PNG 字节。
pub fn encode_png(result: &LayoutResult) -> Result<Vec<u8>, ComposeError> {
    let mut cursor = Cursor::new(Vec::new());
    result
        .image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| ComposeError::Encode(format!("PNG 编码失败：{}", e)))?;
    Ok(cursor.into_inner())
}

/// 获取导出目录
///
/// # 参数
/// * `custom_dir` - 用户自定义目录（可选）
///
/// # 返回
/// - `Ok(PathBuf)`：可用的导出目录
/// - `Err(AppError::Storage)`：无法获取或创建目录
pub fn resolve_output_dir(custom_dir: Option<&str>) -> Result<PathBuf, AppError> {
    if let Some(dir) = custom_dir {
        if !dir.is_empty() {
            let path = PathBuf::from(dir);
            if !path.exists() {
                fs::create_dir_all(&path).map_err(|e| {
                    AppError::Storage(format!("创建自定义目录 '{}' 失败: {}", dir, e))
                })?;
            }
            return Ok(path);
        }
    }

    let cwd = std::env::current_dir()
        .map_err(|e| AppError::Storage(format!("获取当前目录失败: {}", e)))?;
    let export_dir = cwd.join(DEFAULT_EXPORT_DIR);
    if !export_dir.exists() {
        fs::create_dir_all(&export_dir)
            .map_err(|e| AppError::Storage(format!("创建导出目录失败: {}", e)))?;
    }
    Ok(export_dir)
}

/// 编码并写入 PNG 文件，返回写入路径。
pub fn save_png<Tz: TimeZone>(
    result: &LayoutResult,
    dir: &Path,
    now: &DateTime<Tz>,
) -> Result<PathBuf, AppError>
where
    Tz::Offset: std::fmt::Display,
{
    let bytes = encode_png(result)?;
    let file_path = dir.join(export_file_name(now));
    fs::write(&file_path, &bytes)?;

    log::info!(
        "💾 已导出图片 - 路径: {} 大小: {}KB",
        file_path.display(),
        bytes.len() / 1024
    );

    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::{compose, StyleConfig};
    use chrono::{Local, Utc};

    #[test]
    fn file_name_follows_convention() {
        let now = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(export_file_name(&now), "journal_20251231_235958.png");

        let local = Local::now();
        let name = export_file_name(&local);
        assert!(name.starts_with("journal_") && name.ends_with(".png"));
        assert_eq!(name.len(), "journal_YYYYMMDD_HHMMSS.png".len());
    }

    #[test]
    fn encoded_png_has_signature_and_dimensions() {
        let result = compose("Exported line.", &StyleConfig::default()).expect("compose");
        let bytes = encode_png(&result).expect("encode");
        assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!(decoded.width(), result.width());
        assert_eq!(decoded.height(), result.height());
    }

    #[test]
    fn save_creates_custom_dir_and_writes_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let custom = tmp.path().join("nested").join("out");
        let dir = resolve_output_dir(custom.to_str()).expect("dir");
        assert!(dir.exists());

        let result = compose("Saved.", &StyleConfig::default()).expect("compose");
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let path = save_png(&result, &dir, &now).expect("save");

        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("journal_20240102_030405.png"));
        assert!(path.exists());
    }
}
