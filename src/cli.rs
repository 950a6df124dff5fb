use crate::calendar::YearMonth;
use crate::screen::Screen;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskcal", version, about = "Notes, tasks and a month calendar in the terminal")]
pub struct Cli {
    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<String>,
    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Write logs to this file (required to see logs while the TUI is running)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the interactive TUI
    Tui {
        /// Screen to open first (notes, tasks or calendar)
        #[arg(long, default_value_t = Screen::START)]
        screen: Screen,
    },
    /// Print a month grid
    Calendar {
        /// Month to show in YYYY-MM format (defaults to the current month)
        #[arg(long)]
        month: Option<YearMonth>,
    },
    /// List the screen routes and their titles
    Routes,
}
