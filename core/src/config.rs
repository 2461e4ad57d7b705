//! Engine options.
//!
//! `DiffConfig` groups the knobs by pipeline stage: refinement depth and
//! recursion (`refine`), block-move detection and unlinking (`blocks`),
//! unchanged-region clipping thresholds (`clip`), renderer switches
//! (`output`), and diagnostics (`debug`). The sub-structs serialize
//! flattened, so a config file is one flat key/value object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    /// Refine unresolved same-shape gaps down to character level.
    pub char_diff: bool,
    /// Re-run each matching pass once with an empty symbol table to pick up
    /// tokens that become unique only after earlier pairs have been linked.
    pub repeated_diff: bool,
    /// Recurse into still-unresolved sub-gaps between linked borders.
    pub recursive_diff: bool,
    /// Maximum recursion depth for sub-gap matching.
    pub recursion_max: u32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            char_diff: true,
            repeated_diff: true,
            recursive_diff: true,
            recursion_max: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockConfig {
    /// Detect moved blocks and render them with move marks. When false,
    /// moved groups are emitted as a deletion at the original position and
    /// an insertion at the new position.
    pub show_block_moves: bool,
    /// Unlink weak groups and re-run block detection to avoid pathological
    /// fragmentation in highly different texts.
    pub unlink_blocks: bool,
    /// Maximum number of unlink/re-detect cycles.
    pub unlink_max: u32,
    /// Minimum word count for a group to resist unlinking; also the word
    /// count at which a matched token counts as a unique anchor.
    pub block_min_length: u32,
    /// Renderer hint: color moved blocks by move index.
    pub colored_blocks: bool,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            show_block_moves: true,
            unlink_blocks: true,
            unlink_max: 5,
            block_min_length: 3,
            colored_blocks: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Disable clipping of long unchanged regions entirely.
    pub full_diff: bool,
    /// All thresholds below are Unicode code-point counts, not bytes.
    pub clip_heading_left: usize,
    pub clip_heading_right: usize,
    pub clip_paragraph_left_min: usize,
    pub clip_paragraph_left_max: usize,
    pub clip_paragraph_right_min: usize,
    pub clip_paragraph_right_max: usize,
    pub clip_line_left_min: usize,
    pub clip_line_left_max: usize,
    pub clip_line_right_min: usize,
    pub clip_line_right_max: usize,
    pub clip_blank_left_min: usize,
    pub clip_blank_left_max: usize,
    pub clip_blank_right_min: usize,
    pub clip_blank_right_max: usize,
    pub clip_chars_left: usize,
    pub clip_chars_right: usize,
    pub clip_lines_left_max: usize,
    pub clip_lines_right_max: usize,
    /// Clipping is skipped when the omitted middle spans fewer newlines.
    pub clip_skip_lines: usize,
    /// Clipping is skipped when the omitted middle is shorter than this.
    pub clip_skip_chars: usize,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            full_diff: false,
            clip_heading_left: 1500,
            clip_heading_right: 1500,
            clip_paragraph_left_min: 500,
            clip_paragraph_left_max: 1500,
            clip_paragraph_right_min: 500,
            clip_paragraph_right_max: 1500,
            clip_line_left_min: 500,
            clip_line_left_max: 1000,
            clip_line_right_min: 500,
            clip_line_right_max: 1000,
            clip_blank_left_min: 500,
            clip_blank_left_max: 1000,
            clip_blank_right_min: 500,
            clip_blank_right_max: 1000,
            clip_chars_left: 500,
            clip_chars_right: 500,
            clip_lines_left_max: 10,
            clip_lines_right_max: 10,
            clip_skip_lines: 5,
            clip_skip_chars: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Render ASCII stand-ins instead of Unicode arrows and ellipses.
    pub no_unicode_symbols: bool,
    /// Drop one trailing newline from both inputs before tokenization.
    pub strip_trailing_newline: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_unicode_symbols: false,
            strip_trailing_newline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    /// Log intermediate token and block state.
    pub debug: bool,
    /// Collect per-phase wall-clock timings (requires the `perf-metrics`
    /// feature; observational only).
    pub timer: bool,
    /// Run the projection self-check and flag the report on failure.
    pub unit_testing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DiffConfig {
    #[serde(flatten)]
    pub refine: RefineConfig,
    #[serde(flatten)]
    pub blocks: BlockConfig,
    #[serde(flatten)]
    pub clip: ClipConfig,
    #[serde(flatten)]
    pub output: OutputConfig,
    #[serde(flatten)]
    pub debug: DebugConfig,
}

impl DiffConfig {
    pub fn fastest() -> Self {
        let mut cfg = Self::default();
        cfg.refine.char_diff = false;
        cfg.refine.recursive_diff = false;
        cfg.refine.repeated_diff = false;
        cfg.blocks.unlink_max = 2;
        cfg
    }

    pub fn balanced() -> Self {
        Self::default()
    }

    pub fn most_precise() -> Self {
        let mut cfg = Self::default();
        cfg.refine.recursion_max = 20;
        cfg.blocks.unlink_max = 10;
        cfg.clip.full_diff = true;
        cfg
    }

    pub fn builder() -> DiffConfigBuilder {
        DiffConfigBuilder {
            inner: DiffConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_zero(self.blocks.block_min_length as u64, "block_min_length")?;
        ensure_non_zero(self.refine.recursion_max as u64, "recursion_max")?;

        let window_pairs: [(&'static str, usize, usize); 6] = [
            (
                "clip_paragraph_left",
                self.clip.clip_paragraph_left_min,
                self.clip.clip_paragraph_left_max,
            ),
            (
                "clip_paragraph_right",
                self.clip.clip_paragraph_right_min,
                self.clip.clip_paragraph_right_max,
            ),
            (
                "clip_line_left",
                self.clip.clip_line_left_min,
                self.clip.clip_line_left_max,
            ),
            (
                "clip_line_right",
                self.clip.clip_line_right_min,
                self.clip.clip_line_right_max,
            ),
            (
                "clip_blank_left",
                self.clip.clip_blank_left_min,
                self.clip.clip_blank_left_max,
            ),
            (
                "clip_blank_right",
                self.clip.clip_blank_right_min,
                self.clip.clip_blank_right_max,
            ),
        ];
        for (field, min, max) in window_pairs {
            if min > max {
                return Err(ConfigError::InvertedClipWindow { field, min, max });
            }
        }

        ensure_non_zero(self.clip.clip_chars_left as u64, "clip_chars_left")?;
        ensure_non_zero(self.clip.clip_chars_right as u64, "clip_chars_right")?;
        ensure_non_zero(self.clip.clip_lines_left_max as u64, "clip_lines_left_max")?;
        ensure_non_zero(
            self.clip.clip_lines_right_max as u64,
            "clip_lines_right_max",
        )?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero (got {value})")]
    NonPositiveLimit { field: &'static str, value: u64 },
    #[error("{field} window is inverted (min {min} > max {max})")]
    InvertedClipWindow {
        field: &'static str,
        min: usize,
        max: usize,
    },
}

fn ensure_non_zero(value: u64, field: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositiveLimit { field, value });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct DiffConfigBuilder {
    inner: DiffConfig,
}

impl DiffConfigBuilder {
    pub fn new() -> Self {
        DiffConfig::builder()
    }

    pub fn full_diff(mut self, value: bool) -> Self {
        self.inner.clip.full_diff = value;
        self
    }

    pub fn show_block_moves(mut self, value: bool) -> Self {
        self.inner.blocks.show_block_moves = value;
        self
    }

    pub fn char_diff(mut self, value: bool) -> Self {
        self.inner.refine.char_diff = value;
        self
    }

    pub fn repeated_diff(mut self, value: bool) -> Self {
        self.inner.refine.repeated_diff = value;
        self
    }

    pub fn recursive_diff(mut self, value: bool) -> Self {
        self.inner.refine.recursive_diff = value;
        self
    }

    pub fn recursion_max(mut self, value: u32) -> Self {
        self.inner.refine.recursion_max = value;
        self
    }

    pub fn unlink_blocks(mut self, value: bool) -> Self {
        self.inner.blocks.unlink_blocks = value;
        self
    }

    pub fn unlink_max(mut self, value: u32) -> Self {
        self.inner.blocks.unlink_max = value;
        self
    }

    pub fn block_min_length(mut self, value: u32) -> Self {
        self.inner.blocks.block_min_length = value;
        self
    }

    pub fn colored_blocks(mut self, value: bool) -> Self {
        self.inner.blocks.colored_blocks = value;
        self
    }

    pub fn no_unicode_symbols(mut self, value: bool) -> Self {
        self.inner.output.no_unicode_symbols = value;
        self
    }

    pub fn strip_trailing_newline(mut self, value: bool) -> Self {
        self.inner.output.strip_trailing_newline = value;
        self
    }

    pub fn clip_chars_left(mut self, value: usize) -> Self {
        self.inner.clip.clip_chars_left = value;
        self
    }

    pub fn clip_chars_right(mut self, value: usize) -> Self {
        self.inner.clip.clip_chars_right = value;
        self
    }

    pub fn clip_skip_lines(mut self, value: usize) -> Self {
        self.inner.clip.clip_skip_lines = value;
        self
    }

    pub fn clip_skip_chars(mut self, value: usize) -> Self {
        self.inner.clip.clip_skip_chars = value;
        self
    }

    pub fn unit_testing(mut self, value: bool) -> Self {
        self.inner.debug.unit_testing = value;
        self
    }

    pub fn timer(mut self, value: bool) -> Self {
        self.inner.debug.timer = value;
        self
    }

    pub fn build(self) -> Result<DiffConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
