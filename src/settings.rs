//! 外观设置模块
//!
//! # 设计思路
//!
//! 界面上的外观控件（字体、字号、颜色、背景图）以 JSON 形式持久化到 `settings.json`，
//! 每次请求时再转换为一次性的 `StyleConfig`。设置文件缺失或损坏时回退默认值，不阻塞出图。
//!
//! # 实现思路
//!
//! - 字体只能从固定的命名集合中选择，映射到 `fonts/` 目录下的字体文件。
//! - 字号按滑块范围钳制到 12–48。
//! - 颜色字符串在转换时解析，非法颜色作为调用方输入错误返回。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compositor::{
    BackgroundSource, FontSource, InkColor, ResizeQuality, StyleConfig, WrapMode,
    DEFAULT_CANVAS_WIDTH, DEFAULT_INK_COLOR, DEFAULT_PADDING, DEFAULT_POINT_SIZE, WRAP_COLUMNS,
};
use crate::error::AppError;

/// 字号滑块下限。
pub const MIN_FONT_SIZE: u32 = 12;
/// 字号滑块上限。
pub const MAX_FONT_SIZE: u32 = 48;
/// 默认设置文件名。
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// 可选字体（固定集合）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontChoice {
    #[serde(rename = "Roboto")]
    Roboto,
    #[serde(rename = "Great Vibes")]
    GreatVibes,
}

impl FontChoice {
    pub const ALL: [FontChoice; 2] = [FontChoice::Roboto, FontChoice::GreatVibes];

    /// 界面展示名。
    pub fn label(self) -> &'static str {
        match self {
            Self::Roboto => "Roboto",
            Self::GreatVibes => "Great Vibes",
        }
    }

    /// 字体目录下的文件名。
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Roboto => "Roboto-VariableFont_wdth,wght.ttf",
            Self::GreatVibes => "GreatVibes-Regular.ttf",
        }
    }
}

/// 换行策略的持久化写法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapSetting {
    Columns,
    Pixels,
}

/// 持久化的外观设置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub font: FontChoice,
    /// 字体文件所在目录。
    pub font_dir: String,
    pub font_size: u32,
    /// 颜色选择器输出（`#RRGGBB`），也接受命名颜色与 `rgb()`。
    pub font_color: String,
    /// 可选背景图路径（png / jpg / jpeg）。
    pub background_image: Option<String>,
    pub canvas_width: u32,
    pub padding: u32,
    pub wrap: WrapSetting,
    pub wrap_columns: usize,
    /// 背景缩放档位：quality / balanced / speed。
    pub resize_quality: String,
    /// 导出目录，未设置时使用当前目录下的 `exports`。
    pub output_dir: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            font: FontChoice::Roboto,
            font_dir: "fonts".to_string(),
            font_size: DEFAULT_POINT_SIZE,
            font_color: DEFAULT_INK_COLOR.to_string(),
            background_image: None,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            padding: DEFAULT_PADDING,
            wrap: WrapSetting::Columns,
            wrap_columns: WRAP_COLUMNS,
            resize_quality: ResizeQuality::Balanced.as_str().to_string(),
            output_dir: None,
        }
    }
}

impl AppSettings {
    /// 当前所选字体文件的完整路径。
    pub fn font_path(&self) -> PathBuf {
        Path::new(&self.font_dir).join(self.font.file_name())
    }

    /// 钳制到滑块范围后的字号。
    pub fn clamped_font_size(&self) -> u32 {
        self.font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    }

    /// 解析缩放档位。
    pub fn resize_quality(&self) -> Result<ResizeQuality, AppError> {
        Ok(ResizeQuality::parse(&self.resize_quality)?)
    }

    /// 转换为单次合成使用的样式参数。
    pub fn to_style_config(&self) -> Result<StyleConfig, AppError> {
        let ink_color: InkColor = self.font_color.parse()?;

        let background = self
            .background_image
            .as_deref()
            .filter(|path| !path.trim().is_empty())
            .map(|path| BackgroundSource::FilePath(path.to_string()));

        let wrap = match self.wrap {
            WrapSetting::Columns => WrapMode::Columns(self.wrap_columns),
            WrapSetting::Pixels => WrapMode::Pixels,
        };

        Ok(StyleConfig {
            font: FontSource::Path(self.font_path()),
            point_size: self.clamped_font_size(),
            ink_color,
            canvas_width: self.canvas_width,
            padding: self.padding,
            background,
            wrap,
        })
    }
}

/// 读取设置文件；文件不存在或内容损坏时返回默认设置。
pub fn load_settings_from_path(path: &Path) -> AppSettings {
    if !path.exists() {
        return AppSettings::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("⚠️ 解析设置文件失败，使用默认设置: {}", e);
                AppSettings::default()
            }
        },
        Err(e) => {
            log::warn!("⚠️ 读取设置文件失败，使用默认设置: {}", e);
            AppSettings::default()
        }
    }
}

/// 写入设置文件（必要时创建父目录）。
pub fn save_settings_to_path(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Settings(format!("创建设置目录失败: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}
