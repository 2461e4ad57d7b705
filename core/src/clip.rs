//! Clipping of long unchanged fragments.
//!
//! An unchanged run longer than the configured minima keeps only the
//! context next to the surrounding changes; the interior is discarded
//! and replaced by omission indicators and a fragment-block break. Cut
//! positions prefer natural boundaries, in order: heading end, paragraph
//! break, line break, blank run, fixed character count; a maximum line
//! count caps whichever candidate wins.
//!
//! All configured thresholds are code-point counts; regex match
//! positions are byte offsets and are converted through a per-fragment
//! character table before any comparison.

use regex::Regex;

use crate::config::ClipConfig;
use crate::fragment::{Fragment, FragmentKind};
use crate::patterns::{is_blank_char, is_newline_char, SplitPatterns};

struct CharTable {
    byte_of: Vec<usize>,
    total_bytes: usize,
    newline_positions: Vec<usize>,
}

impl CharTable {
    fn new(text: &str) -> Self {
        let mut byte_of = Vec::new();
        let mut newline_positions = Vec::new();
        for (i, (byte, c)) in text.char_indices().enumerate() {
            byte_of.push(byte);
            if is_newline_char(c) {
                newline_positions.push(i);
            }
        }
        Self {
            byte_of,
            total_bytes: text.len(),
            newline_positions,
        }
    }

    fn char_count(&self) -> usize {
        self.byte_of.len()
    }

    fn char_to_byte(&self, pos: usize) -> usize {
        self.byte_of.get(pos).copied().unwrap_or(self.total_bytes)
    }

    fn byte_to_char(&self, byte: usize) -> usize {
        self.byte_of.partition_point(|&b| b < byte)
    }

    /// Character position just after the nth newline (1-based).
    fn pos_after_newline(&self, n: usize) -> Option<usize> {
        if n == 0 {
            return None;
        }
        self.newline_positions.get(n - 1).map(|&p| p + 1)
    }

    /// Smallest position whose suffix holds at most `n` newlines.
    fn pos_keeping_last_lines(&self, n: usize) -> Option<usize> {
        let total = self.newline_positions.len();
        if total <= n {
            return None;
        }
        Some(self.newline_positions[total - n - 1] + 1)
    }

    fn newlines_between(&self, from: usize, to: usize) -> usize {
        let lo = self.newline_positions.partition_point(|&p| p < from);
        let hi = self.newline_positions.partition_point(|&p| p < to);
        hi - lo
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipPoint {
    pos: usize,
    marker: Option<FragmentKind>,
}

pub(crate) fn clip_fragments(
    units: Vec<Fragment>,
    cfg: &ClipConfig,
    patterns: &SplitPatterns,
) -> Vec<Fragment> {
    let total = units.len();
    let mut out: Vec<Fragment> = Vec::with_capacity(total);

    for (i, fragment) in units.into_iter().enumerate() {
        if fragment.kind != FragmentKind::Same || fragment.color.is_some() {
            out.push(fragment);
            continue;
        }
        let table = CharTable::new(&fragment.text);
        if table.char_count() <= cfg.clip_chars_left.min(cfg.clip_chars_right) {
            out.push(fragment);
            continue;
        }

        let is_first = i == 0;
        let is_last = i + 1 == total;
        let left = if is_first {
            None
        } else {
            clip_left(&fragment.text, &table, cfg, patterns)
        };
        let right = if is_last {
            None
        } else {
            clip_right(&fragment.text, &table, cfg, patterns)
        };

        match (is_first, is_last, left, right) {
            (false, false, Some(l), Some(r)) => {
                if !gap_is_clippable(&table, cfg, l.pos, r.pos) {
                    out.push(fragment);
                    continue;
                }
                push_left_piece(&mut out, &fragment.text, &table, l);
                out.push(Fragment::structural(FragmentKind::FragmentEnd));
                out.push(Fragment::structural(FragmentKind::FragmentSeparator));
                out.push(Fragment::structural(FragmentKind::FragmentStart));
                push_right_piece(&mut out, &fragment.text, &table, r);
            }
            (true, false, _, Some(r)) => {
                if !gap_is_clippable(&table, cfg, 0, r.pos) {
                    out.push(fragment);
                    continue;
                }
                push_right_piece(&mut out, &fragment.text, &table, r);
            }
            (false, true, Some(l), _) => {
                if !gap_is_clippable(&table, cfg, l.pos, table.char_count()) {
                    out.push(fragment);
                    continue;
                }
                push_left_piece(&mut out, &fragment.text, &table, l);
            }
            _ => out.push(fragment),
        }
    }
    out
}

/// The omitted middle must be worth the cut.
fn gap_is_clippable(table: &CharTable, cfg: &ClipConfig, from: usize, to: usize) -> bool {
    if to <= from {
        return false;
    }
    if to - from < cfg.clip_skip_chars {
        return false;
    }
    table.newlines_between(from, to) >= cfg.clip_skip_lines
}

fn push_left_piece(out: &mut Vec<Fragment>, text: &str, table: &CharTable, point: ClipPoint) {
    let piece = &text[..table.char_to_byte(point.pos)];
    let trimmed = trim_trailing(piece, point.marker.is_some());
    out.push(Fragment::new(trimmed, FragmentKind::Same, None));
    if let Some(marker) = point.marker {
        out.push(Fragment::structural(marker));
    }
}

fn push_right_piece(out: &mut Vec<Fragment>, text: &str, table: &CharTable, point: ClipPoint) {
    if let Some(marker) = point.marker {
        out.push(Fragment::structural(marker));
    }
    let piece = &text[table.char_to_byte(point.pos)..];
    let trimmed = trim_leading(piece, point.marker.is_some());
    out.push(Fragment::new(trimmed, FragmentKind::Same, None));
}

fn trim_trailing(piece: &str, trim_blanks: bool) -> String {
    piece
        .trim_end_matches(|c: char| is_newline_char(c) || (trim_blanks && is_blank_char(c)))
        .to_owned()
}

fn trim_leading(piece: &str, trim_blanks: bool) -> String {
    piece
        .trim_start_matches(|c: char| is_newline_char(c) || (trim_blanks && is_blank_char(c)))
        .to_owned()
}

fn clip_left(
    text: &str,
    table: &CharTable,
    cfg: &ClipConfig,
    patterns: &SplitPatterns,
) -> Option<ClipPoint> {
    let count = table.char_count();
    let mut choice = first_heading_end(&patterns.clip_heading, text, table)
        .filter(|&end| end <= cfg.clip_heading_left && end > 0)
        .map(|end| ClipPoint {
            pos: end,
            marker: None,
        });

    if choice.is_none() {
        choice = window_end_from_start(
            &patterns.clip_paragraph,
            text,
            table,
            cfg.clip_paragraph_left_min,
            cfg.clip_paragraph_left_max,
        )
        .map(|end| ClipPoint {
            pos: end,
            marker: None,
        });
    }
    if choice.is_none() {
        choice = window_end_from_start(
            &patterns.clip_line,
            text,
            table,
            cfg.clip_line_left_min,
            cfg.clip_line_left_max,
        )
        .map(|end| ClipPoint {
            pos: end,
            marker: None,
        });
    }
    if choice.is_none() {
        choice = window_end_from_start(
            &patterns.clip_blank,
            text,
            table,
            cfg.clip_blank_left_min,
            cfg.clip_blank_left_max,
        )
        .map(|end| ClipPoint {
            pos: end,
            marker: Some(FragmentKind::OmitBlankLeft),
        });
    }
    if choice.is_none() && cfg.clip_chars_left < count {
        choice = Some(ClipPoint {
            pos: cfg.clip_chars_left,
            marker: Some(FragmentKind::OmitChars),
        });
    }

    // The kept piece may span at most clip_lines_left_max lines.
    if let Some(cap) = table.pos_after_newline(cfg.clip_lines_left_max) {
        match &mut choice {
            Some(point) if cap < point.pos => {
                *point = ClipPoint {
                    pos: cap,
                    marker: None,
                };
            }
            _ => {}
        }
    }
    choice
}

fn clip_right(
    text: &str,
    table: &CharTable,
    cfg: &ClipConfig,
    patterns: &SplitPatterns,
) -> Option<ClipPoint> {
    let count = table.char_count();
    let mut choice = first_heading_start_in_tail(&patterns.clip_heading, text, table, cfg)
        .map(|start| ClipPoint {
            pos: start,
            marker: None,
        });

    if choice.is_none() {
        choice = window_end_from_end(
            &patterns.clip_paragraph,
            text,
            table,
            cfg.clip_paragraph_right_min,
            cfg.clip_paragraph_right_max,
        )
        .map(|end| ClipPoint {
            pos: end,
            marker: None,
        });
    }
    if choice.is_none() {
        choice = window_end_from_end(
            &patterns.clip_line,
            text,
            table,
            cfg.clip_line_right_min,
            cfg.clip_line_right_max,
        )
        .map(|end| ClipPoint {
            pos: end,
            marker: None,
        });
    }
    if choice.is_none() {
        choice = window_end_from_end(
            &patterns.clip_blank,
            text,
            table,
            cfg.clip_blank_right_min,
            cfg.clip_blank_right_max,
        )
        .map(|end| ClipPoint {
            pos: end,
            marker: Some(FragmentKind::OmitBlankRight),
        });
    }
    if choice.is_none() && cfg.clip_chars_right < count {
        choice = Some(ClipPoint {
            pos: count - cfg.clip_chars_right,
            marker: Some(FragmentKind::OmitChars),
        });
    }

    if let Some(cap) = table.pos_keeping_last_lines(cfg.clip_lines_right_max) {
        match &mut choice {
            Some(point) if cap > point.pos => {
                *point = ClipPoint {
                    pos: cap,
                    marker: None,
                };
            }
            _ => {}
        }
    }
    choice
}

/// End position (in chars) of the first heading line.
fn first_heading_end(re: &Regex, text: &str, table: &CharTable) -> Option<usize> {
    re.find(text).map(|m| table.byte_to_char(m.end()))
}

/// Start position of the earliest heading inside the right window.
fn first_heading_start_in_tail(
    re: &Regex,
    text: &str,
    table: &CharTable,
    cfg: &ClipConfig,
) -> Option<usize> {
    let count = table.char_count();
    for m in re.find_iter(text) {
        let start = table.byte_to_char(m.start());
        if count - start <= cfg.clip_heading_right && start > 0 {
            return Some(start);
        }
    }
    None
}

/// First break whose end lands between `min` and `max` characters from
/// the start of the fragment.
fn window_end_from_start(
    re: &Regex,
    text: &str,
    table: &CharTable,
    min: usize,
    max: usize,
) -> Option<usize> {
    for m in re.find_iter(text) {
        let end = table.byte_to_char(m.end());
        if end > max {
            break;
        }
        if end >= min {
            return Some(end);
        }
    }
    None
}

/// First break whose end lands between `min` and `max` characters from
/// the end of the fragment.
fn window_end_from_end(
    re: &Regex,
    text: &str,
    table: &CharTable,
    min: usize,
    max: usize,
) -> Option<usize> {
    let count = table.char_count();
    for m in re.find_iter(text) {
        let end = table.byte_to_char(m.end());
        let from_end = count - end;
        if from_end > max {
            continue;
        }
        if from_end >= min {
            return Some(end);
        }
        break;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffConfig;

    fn patterns() -> SplitPatterns {
        SplitPatterns::new()
    }

    fn small_clip_config() -> ClipConfig {
        let mut cfg = DiffConfig::default().clip;
        cfg.clip_heading_left = 30;
        cfg.clip_heading_right = 30;
        cfg.clip_paragraph_left_min = 10;
        cfg.clip_paragraph_left_max = 30;
        cfg.clip_paragraph_right_min = 10;
        cfg.clip_paragraph_right_max = 30;
        cfg.clip_line_left_min = 10;
        cfg.clip_line_left_max = 25;
        cfg.clip_line_right_min = 10;
        cfg.clip_line_right_max = 25;
        cfg.clip_blank_left_min = 8;
        cfg.clip_blank_left_max = 25;
        cfg.clip_blank_right_min = 8;
        cfg.clip_blank_right_max = 25;
        cfg.clip_chars_left = 15;
        cfg.clip_chars_right = 15;
        cfg.clip_skip_chars = 10;
        cfg.clip_skip_lines = 1;
        cfg
    }

    fn same(text: &str) -> Fragment {
        Fragment::new(text, FragmentKind::Same, None)
    }

    fn ins(text: &str) -> Fragment {
        Fragment::new(text, FragmentKind::Insert, None)
    }

    #[test]
    fn short_fragments_pass_through() {
        let cfg = small_clip_config();
        let units = vec![ins("x"), same("short"), ins("y")];
        let clipped = clip_fragments(units.clone(), &cfg, &patterns());
        assert_eq!(clipped, units);
    }

    #[test]
    fn interior_fragment_splits_into_two_pieces() {
        let cfg = small_clip_config();
        let line = "lorem ipsum dolor sit amet\n";
        let middle: String = line.repeat(8);
        let units = vec![ins("x"), same(&middle), ins("y")];
        let clipped = clip_fragments(units, &cfg, &patterns());

        let separators = clipped
            .iter()
            .filter(|f| f.kind == FragmentKind::FragmentSeparator)
            .count();
        assert_eq!(separators, 1, "one block break expected: {clipped:?}");
        let kept: usize = clipped
            .iter()
            .filter(|f| f.kind == FragmentKind::Same)
            .map(|f| f.text.chars().count())
            .sum();
        assert!(kept < middle.chars().count(), "interior text discarded");
    }

    #[test]
    fn first_fragment_clips_left_side_only() {
        let cfg = small_clip_config();
        let head: String = "first line of context\n".repeat(6);
        let units = vec![same(&head), ins("y")];
        let clipped = clip_fragments(units, &cfg, &patterns());

        assert!(clipped
            .iter()
            .all(|f| f.kind != FragmentKind::FragmentSeparator));
        let kept = &clipped
            .iter()
            .find(|f| f.kind == FragmentKind::Same)
            .expect("kept piece")
            .text;
        assert!(kept.chars().count() < head.chars().count());
        // The kept piece is the tail, adjoining the insertion.
        assert!(head.trim_end().ends_with(kept.trim_end()));
    }

    #[test]
    fn moved_fragments_are_never_clipped() {
        let cfg = small_clip_config();
        let long: String = "word ".repeat(50);
        let mut fragment = same(&long);
        fragment.color = Some(1);
        let units = vec![ins("x"), fragment.clone(), ins("y")];
        let clipped = clip_fragments(units, &cfg, &patterns());
        assert!(clipped.contains(&fragment));
    }

    #[test]
    fn tight_gap_skips_clipping() {
        let mut cfg = small_clip_config();
        cfg.clip_skip_chars = 100_000;
        let line = "lorem ipsum dolor sit amet\n";
        let middle: String = line.repeat(8);
        let units = vec![ins("x"), same(&middle), ins("y")];
        let clipped = clip_fragments(units.clone(), &cfg, &patterns());
        assert_eq!(clipped, units);
    }

    #[test]
    fn multibyte_text_clips_on_char_boundaries() {
        let cfg = small_clip_config();
        let line = "áéíóú ñandú öökö üüü\n";
        let middle: String = line.repeat(10);
        let units = vec![ins("x"), same(&middle), ins("y")];
        // Must not panic slicing inside a multibyte char.
        let clipped = clip_fragments(units, &cfg, &patterns());
        assert!(clipped.len() >= 3);
    }
}
