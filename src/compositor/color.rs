//! 墨水颜色解析：十六进制（#RGB / #RRGGBB / #RRGGBBAA）、`rgb()` / `rgba()` 函数写法，
//! 以及常用的 CSS 命名颜色。颜色选择器输出的是 `#RRGGBB`，其余写法来自手写设置文件。

use std::str::FromStr;

use image::Rgba;
use once_cell::sync::Lazy;
use regex::Regex;

use super::ComposeError;

static RGB_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?i)rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*(\d{1,3})\s*)?\)$")
        .expect("rgb() pattern is valid")
});

/// 按名称排序，便于二分查找。
const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("brown", [165, 42, 42, 255]),
    ("darkblue", [0, 0, 139, 255]),
    ("darkgray", [169, 169, 169, 255]),
    ("darkgreen", [0, 100, 0, 255]),
    ("darkred", [139, 0, 0, 255]),
    ("dimgray", [105, 105, 105, 255]),
    ("gold", [255, 215, 0, 255]),
    ("gray", [128, 128, 128, 255]),
    ("green", [0, 128, 0, 255]),
    ("grey", [128, 128, 128, 255]),
    ("indigo", [75, 0, 130, 255]),
    ("lightgray", [211, 211, 211, 255]),
    ("maroon", [128, 0, 0, 255]),
    ("navy", [0, 0, 128, 255]),
    ("olive", [128, 128, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("pink", [255, 192, 203, 255]),
    ("purple", [128, 0, 128, 255]),
    ("red", [255, 0, 0, 255]),
    ("silver", [192, 192, 192, 255]),
    ("slategray", [112, 128, 144, 255]),
    ("teal", [0, 128, 128, 255]),
    ("white", [255, 255, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
];

/// 文字颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkColor(pub Rgba<u8>);

impl InkColor {
    pub const WHITE: InkColor = InkColor(Rgba([255, 255, 255, 255]));

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Rgba([r, g, b, 255]))
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        self.0
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::rgb(0x33, 0x33, 0x33)
    }
}

impl FromStr for InkColor {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)
            .map(InkColor)
            .ok_or_else(|| ComposeError::InvalidFormat(format!("无法识别的颜色：{}", s)))
    }
}

fn parse_color(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(caps) = RGB_FUNCTION.captures(s) {
        let channel = |idx: usize| -> Option<u8> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse::<u8>().ok(),
                None => Some(255),
            }
        };
        return Some(Rgba([channel(1)?, channel(2)?, channel(3)?, channel(4)?]));
    }

    let lower = s.to_ascii_lowercase();
    NAMED_COLORS
        .binary_search_by_key(&lower.as_str(), |&(name, _)| name)
        .ok()
        .map(|idx| Rgba(NAMED_COLORS[idx].1))
}

fn parse_hex(hex: &str) -> Option<Rgba<u8>> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    let nibble = |idx: usize| byte(idx..idx + 1).map(|n| n << 4 | n);

    match hex.len() {
        3 => Some(Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        6 => Some(Rgba([byte(0..2)?, byte(2..4)?, byte(4..6)?, 255])),
        8 => Some(Rgba([byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?])),
        _ => None,
    }
}
