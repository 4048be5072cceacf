//! # Text Wrapping
//!
//! Greedy line breaking for text drawn with a maximum width. Break points come
//! from UAX#14; a word wider than the whole line is split where it overflows.
//! Widths are in points and come from the standard font metrics.

use crate::font::FontContext;
use crate::style::FontWeight;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// Leading between wrapped lines as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.15;

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width in points, trailing whitespace excluded.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Each entry is the opportunity *before* that char. The break `linebreaks`
/// always reports at the very end of the text is dropped.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        let mut char_idx = 0;
        for (byte_idx, _) in text.char_indices() {
            map[byte_idx] = char_idx;
            char_idx += 1;
        }
        map[text.len()] = char_idx;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn make_line(chars: &[char], widths: &[f64]) -> BrokenLine {
    let mut end = chars.len();
    while end > 0 && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    BrokenLine {
        text: chars[..end].iter().collect(),
        width: widths[..end].iter().sum(),
    }
}

/// Break `text` into lines no wider than `max_width` points.
pub fn break_into_lines(
    font_context: &FontContext,
    text: &str,
    max_width: f64,
    font_family: &str,
    font_weight: FontWeight,
    font_size: f64,
) -> Vec<BrokenLine> {
    if text.is_empty() {
        return vec![BrokenLine {
            text: String::new(),
            width: 0.0,
        }];
    }

    let metrics = font_context.resolve(font_family, font_weight).metrics();
    let chars: Vec<char> = text.chars().collect();
    let widths: Vec<f64> = chars
        .iter()
        .map(|&ch| {
            if is_newline(ch) {
                0.0
            } else {
                metrics.char_width(ch, font_size)
            }
        })
        .collect();
    let break_opps = compute_break_opportunities(text);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break_point: Option<usize> = None;

    for i in 0..chars.len() {
        match break_opps[i] {
            Some(BreakOpportunity::Mandatory) => {
                lines.push(make_line(&chars[line_start..i], &widths[line_start..i]));
                line_start = i;
                line_width = 0.0;
                last_break_point = None;
            }
            Some(BreakOpportunity::Allowed) => last_break_point = Some(i),
            None => {}
        }

        line_width += widths[i];
        if line_width > max_width && i > line_start && !chars[i].is_whitespace() {
            let split = match last_break_point {
                Some(bp) if bp > line_start => bp,
                _ => i,
            };
            lines.push(make_line(&chars[line_start..split], &widths[line_start..split]));
            line_start = split;
            line_width = widths[split..=i].iter().sum();
            last_break_point = None;
        }
    }

    lines.push(make_line(&chars[line_start..], &widths[line_start..]));
    lines
}
