//! Per-phase wall-clock metrics.
//!
//! Collected only when the `timer` option is set; observational only and
//! never affects outputs.

use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Total,
    Match,
    Slide,
    CharRefine,
    BlockDetect,
    Assemble,
    Clip,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DiffMetrics {
    pub match_time_ms: u64,
    pub slide_time_ms: u64,
    pub char_refine_time_ms: u64,
    pub block_detect_time_ms: u64,
    pub assemble_time_ms: u64,
    pub clip_time_ms: u64,
    pub total_time_ms: u64,
    pub tokens_new: u64,
    pub tokens_old: u64,
    pub blocks_detected: u32,
    pub groups_detected: u32,
    pub moves_detected: u32,
    pub unlink_cycles: u32,
    #[serde(skip)]
    phase_start: HashMap<Phase, Instant>,
}

impl DiffMetrics {
    pub fn start_phase(&mut self, phase: Phase) {
        self.phase_start.insert(phase, Instant::now());
    }

    pub fn end_phase(&mut self, phase: Phase) {
        if let Some(start) = self.phase_start.remove(&phase) {
            let elapsed = start.elapsed().as_millis() as u64;
            match phase {
                Phase::Match => self.match_time_ms += elapsed,
                Phase::Slide => self.slide_time_ms += elapsed,
                Phase::CharRefine => self.char_refine_time_ms += elapsed,
                Phase::BlockDetect => self.block_detect_time_ms += elapsed,
                Phase::Assemble => self.assemble_time_ms += elapsed,
                Phase::Clip => self.clip_time_ms += elapsed,
                Phase::Total => self.total_time_ms += elapsed,
            }
        }
    }

    pub fn phase_guard(&mut self, phase: Phase) -> PhaseGuard<'_> {
        PhaseGuard::new(self, phase)
    }
}

pub struct PhaseGuard<'a> {
    metrics: &'a mut DiffMetrics,
    phase: Phase,
}

impl<'a> PhaseGuard<'a> {
    pub fn new(metrics: &'a mut DiffMetrics, phase: Phase) -> Self {
        metrics.start_phase(phase);
        Self { metrics, phase }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.metrics.end_phase(self.phase);
    }
}
