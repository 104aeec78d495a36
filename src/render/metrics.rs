//! Helvetica 字宽表与自动换行
//!
//! 宽度单位为 1/1000 em, 只覆盖 ASCII 可见字符, 其余字符按数字宽度估算。

use super::layout::Font;

const FALLBACK_WIDTH: u16 = 556;

/// Helvetica 字宽, 下标为 `字符 - 0x20`
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// 粗体整体约宽 5%
const BOLD_FACTOR: f32 = 1.05;

fn char_width(c: char) -> u16 {
    let code = c as u32;
    if (0x20..0x7f).contains(&code) {
        HELVETICA_WIDTHS[(code - 0x20) as usize]
    } else {
        FALLBACK_WIDTH
    }
}

/// 文本宽度 (pt)
pub fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    let width = units as f32 * size / 1000.0;
    match font {
        Font::Regular => width,
        Font::Bold => width * BOLD_FACTOR,
    }
}

/// 按宽度折行; 单词超宽时按字符拆分。至少返回一行。
pub fn wrap_text(text: &str, max_width: f32, font: Font, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, font, size) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                current.push(c);
                if text_width(&current, font, size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, c.to_string()));
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        // "Hello" = 722 + 556 + 222 + 222 + 556
        let width = text_width("Hello", Font::Regular, 10.0);
        assert!((width - 22.78).abs() < 0.01);
        assert!(text_width("Hello", Font::Bold, 10.0) > width);
        assert_eq!(text_width("", Font::Regular, 10.0), 0.0);
    }

    #[test]
    fn test_wrap_short_text_is_single_line() {
        assert_eq!(wrap_text("B-1001", 100.0, Font::Regular, 8.0), vec!["B-1001"]);
        assert_eq!(wrap_text("", 100.0, Font::Regular, 8.0), vec![""]);
    }

    #[test]
    fn test_wrap_breaks_on_words_then_chars() {
        let lines = wrap_text("LOT 2025 ALPHA BRAVO", 40.0, Font::Regular, 8.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, Font::Regular, 8.0) <= 40.0);
        }

        let long = "1A4000000000000000012345";
        let lines = wrap_text(long, 40.0, Font::Regular, 8.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), long);
    }
}
