//! Configure the engine: disable clipping and block moves, tighten the
//! unlink threshold.

use inline_diff::{render_text, DiffConfig, InlineDiff};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DiffConfig::builder()
        .full_diff(true)
        .show_block_moves(false)
        .block_min_length(2)
        .build()?;
    let engine = InlineDiff::new(config)?;

    let report = engine.diff(
        "alpha beta gamma delta",
        "gamma delta alpha beta",
    );
    println!("{}", render_text(&report, true));
    println!("changed: {}", !report.is_unchanged());
    Ok(())
}
