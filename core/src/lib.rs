//! Inline text diff with block-move detection.
//!
//! This crate compares two revisions of a text (typically wiki markup)
//! and produces a structured fragment stream describing insertions,
//! deletions, and blocks of text that were moved between locations. A
//! presentation layer renders the stream as an inline diff; the crate
//! ships plain-text and JSON renderers, HTML is left to consumers.
//!
//! The matcher follows Heckel's unique-token anchoring, refined
//! stepwise from paragraphs down to words (and characters where the gap
//! shapes allow), with gap sliding to natural text boundaries. Moved
//! blocks are separated from fixed ones per crossing section by a
//! longest increasing subsequence over group character lengths.
//!
//! # Quick Start
//!
//! ```
//! use inline_diff::{diff, render_text};
//!
//! let report = diff("the quick brown fox", "the quick red fox");
//! println!("{}", render_text(&report, false));
//! assert_eq!(report.new_view(), "the quick red fox");
//! ```

mod assemble;
pub(crate) mod blocks;
mod clip;
mod config;
mod engine;
mod fragment;
pub(crate) mod matching;
mod output;
pub(crate) mod patterns;
#[cfg(feature = "perf-metrics")]
#[doc(hidden)]
pub mod perf;
pub(crate) mod tokens;

pub use config::{
    BlockConfig, ClipConfig, ConfigError, DebugConfig, DiffConfig, DiffConfigBuilder,
    OutputConfig, RefineConfig,
};
pub use engine::{diff, InlineDiff};
pub use fragment::{DiffError, DiffReport, Fragment, FragmentKind};
pub use output::json::{serialize_diff_report, serialize_diff_report_pretty};
pub use output::text::render_text;
