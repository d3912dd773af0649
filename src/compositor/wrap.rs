//! # 分段与换行模块
//!
//! ## 设计思路
//!
//! 文本按空行（`"\n\n"`）分段，每段独立做贪心换行：
//! 单词依次装入当前行，下一个单词放不下时另起一行。
//! 单词本身超过行宽时独占一行，绝不拆开。
//!
//! ## 实现思路
//!
//! - 段内所有空白（含单个换行、制表符）折叠为单个空格。
//! - 只含空白的段落换行结果为空，但仍计为一个段落（影响段间距数量）。
//! - 列宽模式按字符数判断；像素模式由调用方提供测量函数。

/// 段落分隔符。
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// 按空行切分段落。空文本返回一个空段落。
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split(PARAGRAPH_SEPARATOR).collect()
}

/// 按字符列宽贪心换行。
///
/// # 示例
/// ```rust
/// use journal_canvas::compositor::wrap::wrap_columns;
///
/// let lines = wrap_columns("the quick brown fox", 10);
/// assert_eq!(lines, vec!["the quick", "brown fox"]);
/// ```
pub fn wrap_columns(paragraph: &str, columns: usize) -> Vec<String> {
    wrap_greedy(paragraph, |line| line.chars().count() <= columns)
}

/// 按像素宽度贪心换行，`measure` 返回一行文字的像素宽度。
pub fn wrap_pixels<F>(paragraph: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    wrap_greedy(paragraph, |line| measure(line) <= max_width)
}

fn wrap_greedy<F>(paragraph: &str, fits: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate_len = current.len() + 1 + word.len();
        let mut candidate = String::with_capacity(candidate_len);
        candidate.push_str(&current);
        candidate.push(' ');
        candidate.push_str(word);

        if fits(&candidate) {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
