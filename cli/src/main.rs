use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(name = "inline-diff")]
#[command(about = "Compare two texts and show an inline diff with block moves")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compare two text files")]
    Diff {
        #[arg(help = "Path to the old/base text")]
        old: String,
        #[arg(help = "Path to the new/changed text")]
        new: String,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(long, help = "Keep unchanged regions instead of clipping them")]
        full: bool,
        #[arg(long, help = "Show moved blocks as plain deletion plus insertion")]
        no_moves: bool,
        #[arg(long, help = "Disable character-level refinement")]
        no_char_diff: bool,
        #[arg(long, help = "ASCII markers instead of Unicode symbols")]
        ascii: bool,
        #[arg(long, help = "Use fastest diff preset (less precise)")]
        fast: bool,
        #[arg(long, help = "Use most precise diff preset (slower)")]
        precise: bool,
        #[arg(long, short, help = "Quiet mode: only report whether texts differ")]
        quiet: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Diff {
            old,
            new,
            format,
            full,
            no_moves,
            no_char_diff,
            ascii,
            fast,
            precise,
            quiet,
        } => commands::diff::run(
            &old,
            &new,
            format,
            full,
            no_moves,
            no_char_diff,
            ascii,
            fast,
            precise,
            quiet,
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}
