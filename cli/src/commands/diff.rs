use crate::OutputFormat;
use anyhow::{bail, Context, Result};
use inline_diff::{render_text, serialize_diff_report, DiffConfig, InlineDiff};
use std::fs;
use std::process::ExitCode;

#[allow(clippy::too_many_arguments)]
pub fn run(
    old_path: &str,
    new_path: &str,
    format: OutputFormat,
    full: bool,
    no_moves: bool,
    no_char_diff: bool,
    ascii: bool,
    fast: bool,
    precise: bool,
    quiet: bool,
) -> Result<ExitCode> {
    if fast && precise {
        bail!("Cannot use both --fast and --precise flags together");
    }

    let mut config = if fast {
        DiffConfig::fastest()
    } else if precise {
        DiffConfig::most_precise()
    } else {
        DiffConfig::balanced()
    };
    if full {
        config.clip.full_diff = true;
    }
    if no_moves {
        config.blocks.show_block_moves = false;
    }
    if no_char_diff {
        config.refine.char_diff = false;
    }
    if ascii {
        config.output.no_unicode_symbols = true;
    }

    let old_text = fs::read_to_string(old_path)
        .with_context(|| format!("failed to read old text from {old_path}"))?;
    let new_text = fs::read_to_string(new_path)
        .with_context(|| format!("failed to read new text from {new_path}"))?;

    let engine = InlineDiff::new(config).context("invalid configuration")?;
    let report = engine.diff(&old_text, &new_text);
    if report.error {
        bail!("diff engine reported an internal error");
    }

    let changed = !report.is_unchanged();
    if quiet {
        if changed {
            println!("texts differ");
        } else {
            println!("texts are identical");
        }
    } else {
        match format {
            OutputFormat::Text => {
                println!(
                    "{}",
                    render_text(&report, engine.config().output.no_unicode_symbols)
                );
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serialize_diff_report(&report).context("failed to serialize report")?
                );
            }
        }
    }

    Ok(if changed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
