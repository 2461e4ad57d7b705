//! Diff engine orchestration.
//!
//! `InlineDiff` owns a validated configuration and the compiled split
//! patterns; one `diff` call runs the whole pipeline synchronously:
//! tokenize and match through the refinement schedule (paragraph → line
//! → sentence → chunk → word, optionally character), slide gaps, detect
//! blocks with optional unlink cycles, place deletions/insertions/move
//! marks, assemble the fragment stream, and clip unchanged regions.
//!
//! Each call owns all of its state; concurrent calls on one instance
//! are independent. Token arenas are released as soon as block
//! detection has cached the block texts.

use log::debug;

use crate::assemble::assemble;
use crate::blocks::detect::{get_groups, get_same_blocks, get_sections};
use crate::blocks::fixed_chain::set_fixed;
use crate::blocks::position::{
    get_del_blocks, get_ins_blocks, insert_marks, position_del_blocks, set_ins_groups,
};
use crate::blocks::unlink::unlink_blocks;
use crate::blocks::{reseat_groups, sort_and_reseat, Block, Group};
use crate::clip::clip_fragments;
use crate::config::{ConfigError, DiffConfig};
use crate::fragment::{DiffError, DiffReport, Fragment, FragmentKind};
use crate::matching::char_refine::refine_to_chars;
use crate::matching::matcher::calculate_diff;
use crate::matching::slide::slide_gaps;
use crate::matching::MatchContext;
use crate::patterns::{SplitLevel, SplitPatterns};
use crate::tokens::VersionText;

#[cfg(feature = "perf-metrics")]
use crate::perf::{DiffMetrics, Phase};

/// Compare two texts with the default configuration.
pub fn diff(old: &str, new: &str) -> DiffReport {
    InlineDiff::with_defaults().diff(old, new)
}

pub struct InlineDiff {
    config: DiffConfig,
    patterns: SplitPatterns,
}

impl InlineDiff {
    pub fn new(config: DiffConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            patterns: SplitPatterns::new(),
        })
    }

    pub fn with_defaults() -> Self {
        Self::new(DiffConfig::default()).expect("default config is valid")
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Infallible front end: internal invariant failures produce an
    /// empty report with the error flag set instead of an `Err`.
    pub fn diff(&self, old: &str, new: &str) -> DiffReport {
        match self.try_diff(old, new) {
            Ok(report) => report,
            Err(e) => {
                log::error!("diff failed: {e}");
                let mut report = DiffReport::new(wrap(Vec::new()));
                report.error = true;
                report
            }
        }
    }

    pub fn try_diff(&self, old: &str, new: &str) -> Result<DiffReport, DiffError> {
        let strip = self.config.output.strip_trailing_newline;
        let mut old_text = VersionText::new(old, &self.patterns, strip);
        let mut new_text = VersionText::new(new, &self.patterns, strip);

        #[cfg(feature = "perf-metrics")]
        let mut metrics: Option<DiffMetrics> = self.config.debug.timer.then(DiffMetrics::default);
        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.start_phase(Phase::Total);
        }

        // Trivial cases bypass the pipeline.
        if new_text.text == old_text.text {
            let units = vec![Fragment::new(new_text.text.clone(), FragmentKind::Same, None)];
            return Ok(self.finish(
                units,
                &new_text.text,
                &old_text.text,
                #[cfg(feature = "perf-metrics")]
                metrics,
            ));
        }
        if old_text.text.is_empty() {
            let units = vec![Fragment::new(
                new_text.text.clone(),
                FragmentKind::Insert,
                None,
            )];
            return Ok(self.finish(
                units,
                &new_text.text,
                &old_text.text,
                #[cfg(feature = "perf-metrics")]
                metrics,
            ));
        }
        if new_text.text.is_empty() {
            let units = vec![Fragment::new(
                old_text.text.clone(),
                FragmentKind::Delete,
                None,
            )];
            return Ok(self.finish(
                units,
                &new_text.text,
                &old_text.text,
                #[cfg(feature = "perf-metrics")]
                metrics,
            ));
        }

        // Tokenize and match through the refinement schedule.
        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.start_phase(Phase::Match);
        }
        {
            let mut ctx = MatchContext {
                new_text: &mut new_text,
                old_text: &mut old_text,
                config: &self.config,
                patterns: &self.patterns,
            };

            ctx.new_text.split_initial(SplitLevel::Paragraph, ctx.patterns);
            ctx.old_text.split_initial(SplitLevel::Paragraph, ctx.patterns);
            calculate_diff(&mut ctx, SplitLevel::Paragraph, false);

            for level in [SplitLevel::Line, SplitLevel::Sentence, SplitLevel::Chunk] {
                ctx.new_text.split_refine(level, ctx.patterns);
                ctx.old_text.split_refine(level, ctx.patterns);
                calculate_diff(&mut ctx, level, false);
            }

            ctx.new_text.split_refine(SplitLevel::Word, ctx.patterns);
            ctx.old_text.split_refine(SplitLevel::Word, ctx.patterns);
            calculate_diff(&mut ctx, SplitLevel::Word, true);
        }
        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.end_phase(Phase::Match);
            m.start_phase(Phase::Slide);
        }

        slide_gaps(&mut new_text, &mut old_text);
        slide_gaps(&mut old_text, &mut new_text);

        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.end_phase(Phase::Slide);
            m.start_phase(Phase::CharRefine);
        }

        if self.config.refine.char_diff {
            let mut ctx = MatchContext {
                new_text: &mut new_text,
                old_text: &mut old_text,
                config: &self.config,
                patterns: &self.patterns,
            };
            if refine_to_chars(&mut ctx) {
                calculate_diff(&mut ctx, SplitLevel::Character, true);
                slide_gaps(&mut new_text, &mut old_text);
                slide_gaps(&mut old_text, &mut new_text);
            }
        }

        new_text.enumerate();
        old_text.enumerate();

        if self.config.debug.debug {
            debug!(
                "tokenization done: {} new tokens, {} old tokens",
                new_text.token_ids().len(),
                old_text.token_ids().len()
            );
        }

        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.end_phase(Phase::CharRefine);
            m.tokens_new = new_text.token_ids().len() as u64;
            m.tokens_old = old_text.token_ids().len() as u64;
        }

        if self.config.debug.unit_testing {
            new_text.check_consistency()?;
            old_text.check_consistency()?;
            check_link_symmetry(&new_text, &old_text)?;
        }

        // Block detection with optional unlink cycles.
        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.start_phase(Phase::BlockDetect);
        }
        let block_min_length = self.config.blocks.block_min_length;
        let (mut blocks, mut groups) = detect_all(&new_text, &old_text, &self.patterns);
        let mut unlink_cycles = 0u32;
        while self.config.blocks.unlink_blocks && unlink_cycles < self.config.blocks.unlink_max {
            if !groups
                .iter()
                .any(|g| g.max_words as u32 >= block_min_length)
            {
                break;
            }
            if !unlink_blocks(
                &mut new_text,
                &mut old_text,
                &blocks,
                &groups,
                block_min_length,
            ) {
                break;
            }
            unlink_cycles += 1;
            slide_gaps(&mut new_text, &mut old_text);
            slide_gaps(&mut old_text, &mut new_text);
            let redone = detect_all(&new_text, &old_text, &self.patterns);
            blocks = redone.0;
            groups = redone.1;
        }
        if self.config.debug.debug {
            debug!(
                "block detection: {} same blocks, {} groups, {} unlink cycles",
                blocks.len(),
                groups.len(),
                unlink_cycles
            );
        }

        blocks.extend(get_del_blocks(&old_text, &self.patterns));
        position_del_blocks(&mut blocks, &groups);
        sort_and_reseat(&mut blocks, &mut groups);

        blocks.extend(get_ins_blocks(&new_text, &self.patterns));
        sort_and_reseat(&mut blocks, &mut groups);
        set_ins_groups(&mut blocks, &mut groups);
        reseat_groups(&blocks, &mut groups);

        insert_marks(&mut blocks, &mut groups);
        sort_and_reseat(&mut blocks, &mut groups);

        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.end_phase(Phase::BlockDetect);
            m.blocks_detected = blocks.len() as u32;
            m.groups_detected = groups.len() as u32;
            m.moves_detected = groups.iter().filter(|g| g.color.is_some()).count() as u32;
            m.unlink_cycles = unlink_cycles;
        }

        // Block texts are cached; the arenas can go.
        new_text.release();
        old_text.release();

        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.start_phase(Phase::Assemble);
        }
        let units = assemble(&blocks, &groups, self.config.blocks.show_block_moves);
        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.end_phase(Phase::Assemble);
        }

        Ok(self.finish(
            units,
            &new_text.text,
            &old_text.text,
            #[cfg(feature = "perf-metrics")]
            metrics,
        ))
    }

    /// Self-check, clipping, and container wrapping.
    fn finish(
        &self,
        units: Vec<Fragment>,
        new_norm: &str,
        old_norm: &str,
        #[cfg(feature = "perf-metrics")] mut metrics: Option<DiffMetrics>,
    ) -> DiffReport {
        let mut error = false;
        if self.config.debug.unit_testing {
            let probe = DiffReport::new(wrap(units.clone()));
            if probe.new_view() != new_norm {
                log::error!("projection self-check failed for the new view");
                error = true;
            }
            if probe.old_view() != old_norm {
                log::error!("projection self-check failed for the old view");
                error = true;
            }
        }

        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.start_phase(Phase::Clip);
        }
        let units = if self.config.clip.full_diff {
            units
        } else {
            clip_fragments(units, &self.config.clip, &self.patterns)
        };
        #[cfg(feature = "perf-metrics")]
        if let Some(m) = metrics.as_mut() {
            m.end_phase(Phase::Clip);
            m.end_phase(Phase::Total);
        }

        let mut report = DiffReport::new(wrap(units));
        report.error = error;
        #[cfg(feature = "perf-metrics")]
        {
            report.metrics = metrics;
        }
        report
    }
}

fn wrap(units: Vec<Fragment>) -> Vec<Fragment> {
    let mut fragments = Vec::with_capacity(units.len() + 4);
    fragments.push(Fragment::structural(FragmentKind::ContainerStart));
    fragments.push(Fragment::structural(FragmentKind::FragmentStart));
    fragments.extend(units);
    fragments.push(Fragment::structural(FragmentKind::FragmentEnd));
    fragments.push(Fragment::structural(FragmentKind::ContainerEnd));
    fragments
}

fn detect_all(
    new_text: &VersionText,
    old_text: &VersionText,
    patterns: &SplitPatterns,
) -> (Vec<Block>, Vec<Group>) {
    let mut blocks = get_same_blocks(new_text, old_text, patterns);
    let sections = get_sections(&mut blocks);
    let mut groups = get_groups(&mut blocks);
    set_fixed(&mut blocks, &mut groups, &sections);
    (blocks, groups)
}

fn check_link_symmetry(new_text: &VersionText, old_text: &VersionText) -> Result<(), DiffError> {
    for id in new_text.token_ids() {
        if let Some(other) = new_text.tok(id).link {
            if old_text.tok(other).link != Some(id) {
                return Err(DiffError::Matcher(format!(
                    "asymmetric link new {} -> old {}",
                    id.0, other.0
                )));
            }
        }
    }
    for id in old_text.token_ids() {
        if let Some(other) = old_text.tok(id).link {
            if new_text.tok(other).link != Some(id) {
                return Err(DiffError::Matcher(format!(
                    "asymmetric link old {} -> new {}",
                    id.0, other.0
                )));
            }
        }
    }
    Ok(())
}
