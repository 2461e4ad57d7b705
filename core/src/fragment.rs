//! Fragment stream model.
//!
//! The fragment stream is the engine's stable output contract. Renderers
//! (HTML, terminal, JSON) are replaceable consumers of this stream and
//! must tolerate empty-text units and honor the container nesting:
//!
//! ```text
//! stream       := '{' container '}'
//! container    := fragments (',' fragments)*
//! fragments    := '[' unit* ']'
//! unit         := '=' TEXT | '-' TEXT | '+' TEXT
//!               | '(<' COLOR | '(>' COLOR | ')' COLOR
//!               | '<' TEXT COLOR | '>' TEXT COLOR
//!               | '~' | ' ~' | '~ '
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker type of a single fragment unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentKind {
    /// Unchanged text, present in both revisions.
    #[serde(rename = "=")]
    Same,
    /// Text present only in the old revision.
    #[serde(rename = "-")]
    Delete,
    /// Text present only in the new revision.
    #[serde(rename = "+")]
    Insert,
    /// Move mark: the original location of a group rendered earlier.
    #[serde(rename = "<")]
    MarkLeft,
    /// Move mark: the original location of a group rendered later.
    #[serde(rename = ">")]
    MarkRight,
    /// Opens a moved group whose mark lies before it.
    #[serde(rename = "(<")]
    MovedOpenLeft,
    /// Opens a moved group whose mark lies after it.
    #[serde(rename = "(>")]
    MovedOpenRight,
    /// Closes a moved group.
    #[serde(rename = ")")]
    MovedClose,
    /// Omission indicator for a character-count clip.
    #[serde(rename = "~")]
    OmitChars,
    /// Omission indicator for a blank clip on the left side of a cut.
    #[serde(rename = " ~")]
    OmitBlankLeft,
    /// Omission indicator for a blank clip on the right side of a cut.
    #[serde(rename = "~ ")]
    OmitBlankRight,
    #[serde(rename = "[")]
    FragmentStart,
    #[serde(rename = "]")]
    FragmentEnd,
    #[serde(rename = ",")]
    FragmentSeparator,
    #[serde(rename = "{")]
    ContainerStart,
    #[serde(rename = "}")]
    ContainerEnd,
}

impl FragmentKind {
    /// The literal marker as it appears in the stream grammar.
    pub fn marker(self) -> &'static str {
        match self {
            FragmentKind::Same => "=",
            FragmentKind::Delete => "-",
            FragmentKind::Insert => "+",
            FragmentKind::MarkLeft => "<",
            FragmentKind::MarkRight => ">",
            FragmentKind::MovedOpenLeft => "(<",
            FragmentKind::MovedOpenRight => "(>",
            FragmentKind::MovedClose => ")",
            FragmentKind::OmitChars => "~",
            FragmentKind::OmitBlankLeft => " ~",
            FragmentKind::OmitBlankRight => "~ ",
            FragmentKind::FragmentStart => "[",
            FragmentKind::FragmentEnd => "]",
            FragmentKind::FragmentSeparator => ",",
            FragmentKind::ContainerStart => "{",
            FragmentKind::ContainerEnd => "}",
        }
    }

    /// Structural markers carry no text and delimit the stream.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            FragmentKind::FragmentStart
                | FragmentKind::FragmentEnd
                | FragmentKind::FragmentSeparator
                | FragmentKind::ContainerStart
                | FragmentKind::ContainerEnd
        )
    }

    pub fn is_mark(self) -> bool {
        matches!(self, FragmentKind::MarkLeft | FragmentKind::MarkRight)
    }

    pub fn is_omission(self) -> bool {
        matches!(
            self,
            FragmentKind::OmitChars | FragmentKind::OmitBlankLeft | FragmentKind::OmitBlankRight
        )
    }
}

/// One typed unit of the output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub kind: FragmentKind,
    /// Move index for moved-group envelopes and marks, `None` elsewhere.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<u32>,
}

impl Fragment {
    pub fn new(text: impl Into<String>, kind: FragmentKind, color: Option<u32>) -> Self {
        Self {
            text: text.into(),
            kind,
            color,
        }
    }

    pub fn structural(kind: FragmentKind) -> Self {
        Self {
            text: String::new(),
            kind,
            color: None,
        }
    }
}

/// Complete result of one diff run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffReport {
    pub version: String,
    pub fragments: Vec<Fragment>,
    /// Set when the `unit_testing` self-check found that the fragment
    /// stream does not reproduce the inputs. Indicates an engine bug,
    /// never bad input.
    pub error: bool,
    /// Per-phase timings, present when the `timer` option is set.
    #[cfg(feature = "perf-metrics")]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metrics: Option<crate::perf::DiffMetrics>,
}

impl DiffReport {
    pub const SCHEMA_VERSION: &'static str = "1";

    pub fn new(fragments: Vec<Fragment>) -> DiffReport {
        DiffReport {
            version: Self::SCHEMA_VERSION.to_string(),
            fragments,
            error: false,
            #[cfg(feature = "perf-metrics")]
            metrics: None,
        }
    }

    /// True when the stream is the single-`=` "no change" result.
    pub fn is_unchanged(&self) -> bool {
        let mut content = self
            .fragments
            .iter()
            .filter(|f| !f.kind.is_structural());
        match (content.next(), content.next()) {
            (None, _) => true,
            (Some(first), None) => first.kind == FragmentKind::Same,
            _ => false,
        }
    }

    /// Concatenation of every new-revision fragment: `=` and `+` units,
    /// including those inside moved-group envelopes.
    pub fn new_view(&self) -> String {
        self.fragments
            .iter()
            .filter(|f| matches!(f.kind, FragmentKind::Same | FragmentKind::Insert))
            .map(|f| f.text.as_str())
            .collect()
    }

    /// Concatenation of every old-revision fragment. Moved groups count at
    /// their mark position (the mark text is the group's old-side text),
    /// not at their rendered position.
    pub fn old_view(&self) -> String {
        let mut out = String::new();
        let mut moved_depth = 0usize;
        for fragment in &self.fragments {
            match fragment.kind {
                FragmentKind::MovedOpenLeft | FragmentKind::MovedOpenRight => moved_depth += 1,
                FragmentKind::MovedClose => moved_depth = moved_depth.saturating_sub(1),
                FragmentKind::MarkLeft | FragmentKind::MarkRight => out.push_str(&fragment.text),
                FragmentKind::Same | FragmentKind::Delete if moved_depth == 0 => {
                    out.push_str(&fragment.text)
                }
                _ => {}
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// Token arena or linked-list invariants failed; not expected under
    /// valid input.
    #[error("tokenizer invariant violated: {0}")]
    Tokenizer(String),
    /// Matcher link symmetry failed; not expected under valid input.
    #[error("matcher invariant violated: {0}")]
    Matcher(String),
    /// The fragment stream does not reproduce the inputs.
    #[error("projection self-check failed for the {side} view")]
    Projection { side: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(units: Vec<Fragment>) -> Vec<Fragment> {
        let mut fragments = vec![
            Fragment::structural(FragmentKind::ContainerStart),
            Fragment::structural(FragmentKind::FragmentStart),
        ];
        fragments.extend(units);
        fragments.push(Fragment::structural(FragmentKind::FragmentEnd));
        fragments.push(Fragment::structural(FragmentKind::ContainerEnd));
        fragments
    }

    #[test]
    fn unchanged_report_detected() {
        let report = DiffReport::new(wrap(vec![Fragment::new(
            "abc",
            FragmentKind::Same,
            None,
        )]));
        assert!(report.is_unchanged());
    }

    #[test]
    fn changed_report_not_unchanged() {
        let report = DiffReport::new(wrap(vec![
            Fragment::new("a", FragmentKind::Same, None),
            Fragment::new("b", FragmentKind::Insert, None),
        ]));
        assert!(!report.is_unchanged());
    }

    #[test]
    fn views_project_simple_edit() {
        let report = DiffReport::new(wrap(vec![
            Fragment::new("the quick ", FragmentKind::Same, None),
            Fragment::new("brown", FragmentKind::Delete, None),
            Fragment::new("red", FragmentKind::Insert, None),
            Fragment::new(" fox", FragmentKind::Same, None),
        ]));
        assert_eq!(report.new_view(), "the quick red fox");
        assert_eq!(report.old_view(), "the quick brown fox");
    }

    #[test]
    fn old_view_counts_moved_groups_at_mark() {
        let report = DiffReport::new(wrap(vec![
            Fragment::new("C D ", FragmentKind::Same, None),
            Fragment::new("A B", FragmentKind::MarkRight, Some(1)),
            Fragment::new("", FragmentKind::MovedOpenLeft, Some(1)),
            Fragment::new("A B", FragmentKind::Same, Some(1)),
            Fragment::new("", FragmentKind::MovedClose, Some(1)),
        ]));
        assert_eq!(report.new_view(), "C D A B");
        assert_eq!(report.old_view(), "C D A B");
    }

    #[test]
    fn markers_round_trip_through_serde() {
        let fragment = Fragment::new("x", FragmentKind::MovedOpenLeft, Some(2));
        let json = serde_json::to_string(&fragment).expect("serialize fragment");
        assert!(json.contains("\"(<\""));
        let parsed: Fragment = serde_json::from_str(&json).expect("deserialize fragment");
        assert_eq!(parsed, fragment);
    }
}
