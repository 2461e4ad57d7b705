//! Split patterns and Unicode character sets.
//!
//! Each refinement level owns a regex that captures the separated text;
//! the gaps between matches (separators) become tokens of their own, so
//! whitespace and punctuation are individually matchable. The chunk level
//! treats wiki grammatical atoms (`[[…]]`, `{{…}}`, `[…]`, HTML-like
//! tags, bare URLs) as indivisible so later refinement cannot fragment
//! wiki syntax.
//!
//! The character sets below are explicit code-point lists; `\w` and the
//! `\p{..}` classes cover the letter ranges. Sentence splitting needs a
//! trailing-context test that the regex engine does not support, so it is
//! implemented as a scanner over the same sets.

use regex::Regex;

/// Blank characters (horizontal whitespace), as a regex class body.
const BLANKS: &str = r" \t\x0B\u{00A0}\u{1680}\u{180E}\u{2000}-\u{200B}\u{202F}\u{205F}\u{3000}";

/// All vertical break characters, as a regex class body.
const NEW_LINES_ALL: &str = r"\n\r\x0B\x0C\u{0085}\u{2028}\u{2029}";

/// Explicit paragraph separators besides doubled newlines.
const NEW_PARAGRAPHS: &str = r"\u{2029}\u{000C}";

/// Unicode full stop characters.
const FULL_STOPS: [char; 21] = [
    '.', '\u{0589}', '\u{06D4}', '\u{0701}', '\u{0702}', '\u{0964}', '\u{0DF4}', '\u{1362}',
    '\u{166E}', '\u{1803}', '\u{1809}', '\u{2CF9}', '\u{2CFE}', '\u{2E3C}', '\u{3002}',
    '\u{A4FF}', '\u{A60E}', '\u{A6F3}', '\u{FE52}', '\u{FF0E}', '\u{FF61}',
];

/// Unicode exclamation mark characters.
const EXCLAMATION_MARKS: [char; 9] = [
    '!', '\u{01C3}', '\u{055C}', '\u{07F9}', '\u{1944}', '\u{203C}', '\u{2048}', '\u{FE57}',
    '\u{FF01}',
];

/// Unicode question mark characters.
const QUESTION_MARKS: [char; 14] = [
    '?', '\u{037E}', '\u{055E}', '\u{061F}', '\u{1367}', '\u{1945}', '\u{2047}', '\u{2049}',
    '\u{2CFA}', '\u{2CFB}', '\u{2E2E}', '\u{A60F}', '\u{A6F7}', '\u{FF1F}',
];

pub(crate) fn is_blank_char(c: char) -> bool {
    matches!(c,
        ' ' | '\t'
        | '\u{000B}'
        | '\u{00A0}'
        | '\u{1680}'
        | '\u{180E}'
        | '\u{2000}'..='\u{200B}'
        | '\u{202F}'
        | '\u{205F}'
        | '\u{3000}')
}

pub(crate) fn is_newline_char(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

pub(crate) fn is_sentence_stop_char(c: char) -> bool {
    FULL_STOPS.contains(&c) || EXCLAMATION_MARKS.contains(&c) || QUESTION_MARKS.contains(&c)
}

/// Whitespace-only tokens cannot serve as unique anchors.
pub(crate) fn is_whitespace_only(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| is_blank_char(c) || is_newline_char(c))
}

/// Token granularity, from coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SplitLevel {
    Paragraph,
    Line,
    Sentence,
    Chunk,
    Word,
    Character,
}

/// The compiled regex set shared by both text versions of a diff run.
#[derive(Debug)]
pub(crate) struct SplitPatterns {
    paragraph: Regex,
    line: Regex,
    chunk: Regex,
    word: Regex,
    count_words: Regex,
    count_chunks: Regex,
    pub(crate) clip_heading: Regex,
    pub(crate) clip_paragraph: Regex,
    pub(crate) clip_line: Regex,
    pub(crate) clip_blank: Regex,
}

impl SplitPatterns {
    pub(crate) fn new() -> Self {
        let chunk_pattern = concat!(
            r"\[\[[^\[\]\n]+\]\]",
            r"|\{\{[^{}\n]+\}\}",
            r"|\[[^\[\]\n]+\]",
            r"|</?[^<>\[\]{}\n]+>",
            r"|\b(https?:)?//[^\x00-\x20\x22\[\]\x7F]+",
        );
        Self {
            paragraph: Regex::new(&format!(r"(\r\n|\n|\r){{2,}}|[{NEW_PARAGRAPHS}]"))
                .expect("paragraph split pattern"),
            line: Regex::new(&format!(r"\r\n|[{NEW_LINES_ALL}]")).expect("line split pattern"),
            chunk: Regex::new(chunk_pattern).expect("chunk split pattern"),
            word: Regex::new(concat!(
                r"\w+(['’]\w*)*",
                r"|\[\[|\]\]|\{\{|\}\}",
                r"|&\w+;",
                r"|'''|''",
                r"|==+",
                r"|\{\||\|\}|\|-",
                r"|(?s:.)",
            ))
            .expect("word split pattern"),
            count_words: Regex::new(r"\w+(['’]\w*)*").expect("word count pattern"),
            count_chunks: Regex::new(chunk_pattern).expect("chunk count pattern"),
            clip_heading: Regex::new(r"(?m)^(==+[^\n]+==+|\{\||\|\})[^\n]*")
                .expect("clip heading pattern"),
            clip_paragraph: Regex::new(&format!(r"(\r\n|\n|\r){{2,}}|[{NEW_PARAGRAPHS}]"))
                .expect("clip paragraph pattern"),
            clip_line: Regex::new(&format!(r"\r\n|[{NEW_LINES_ALL}]")).expect("clip line pattern"),
            clip_blank: Regex::new(&format!(r"[{BLANKS}]+")).expect("clip blank pattern"),
        }
    }

    /// Split `text` into pieces at the given level. Regex matches and the
    /// gaps between them both become pieces; nothing is dropped.
    pub(crate) fn split_pieces(&self, level: SplitLevel, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        match level {
            SplitLevel::Character => text.chars().map(String::from).collect(),
            SplitLevel::Sentence => split_sentence_pieces(text),
            SplitLevel::Paragraph => split_with_regex(&self.paragraph, text),
            SplitLevel::Line => split_with_regex(&self.line, text),
            SplitLevel::Chunk => split_with_regex(&self.chunk, text),
            SplitLevel::Word => split_with_regex(&self.word, text),
        }
    }

    /// Word-like matches plus wiki atoms, used for the uniqueness
    /// heuristic and the per-version occurrence map.
    pub(crate) fn words_and_chunks<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut out: Vec<&'t str> = self
            .count_words
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();
        out.extend(self.count_chunks.find_iter(text).map(|m| m.as_str()));
        out
    }

    /// Number of word-like tokens in `text`.
    pub(crate) fn word_count(&self, text: &str) -> usize {
        self.count_words.find_iter(text).count()
    }
}

fn split_with_regex(re: &Regex, text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut pos = 0usize;
    for m in re.find_iter(text) {
        if m.start() > pos {
            pieces.push(text[pos..m.start()].to_owned());
        }
        if !m.as_str().is_empty() {
            pieces.push(m.as_str().to_owned());
        }
        pos = m.end();
    }
    if pos < text.len() {
        pieces.push(text[pos..].to_owned());
    }
    pieces
}

/// Sentence scanner: a sentence runs from the first non-blank character
/// to a sentence-terminator run that is followed by a blank or the end of
/// the text. Blank runs between sentences become their own pieces.
fn split_sentence_pieces(text: &str) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let len = chars.len();
    let byte_at = |i: usize| -> usize {
        if i < len {
            chars[i].0
        } else {
            text.len()
        }
    };

    let mut pieces = Vec::new();
    let mut i = 0usize;
    while i < len {
        let blank_start = i;
        while i < len && is_blank_char(chars[i].1) {
            i += 1;
        }
        if i > blank_start {
            pieces.push(text[byte_at(blank_start)..byte_at(i)].to_owned());
        }
        if i >= len {
            break;
        }

        let sentence_start = i;
        let mut sentence_end = len;
        let mut j = i;
        while j < len {
            if is_sentence_stop_char(chars[j].1) {
                let mut k = j;
                while k + 1 < len && is_sentence_stop_char(chars[k + 1].1) {
                    k += 1;
                }
                if k + 1 >= len || is_blank_char(chars[k + 1].1) {
                    sentence_end = k + 1;
                    break;
                }
                j = k + 1;
            } else {
                j += 1;
            }
        }
        pieces.push(text[byte_at(sentence_start)..byte_at(sentence_end)].to_owned());
        i = sentence_end;
    }
    pieces
}
