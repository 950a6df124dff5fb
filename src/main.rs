mod calendar;
mod cli;
mod commands;
mod logging;
mod model;
mod screen;
mod store;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui {
        screen: screen::Screen::START,
    });
    let sink = match command {
        cli::Command::Tui { .. } => logging::Sink::Tui,
        _ => logging::Sink::Stderr,
    };
    logging::init(args.verbose, args.log_file.as_deref(), sink)?;
    let today = commands::resolve_today(args.today.as_deref())?;
    match command {
        cli::Command::Tui { screen } => commands::tui(screen, today),
        cli::Command::Calendar { month } => commands::calendar(month, today),
        cli::Command::Routes => commands::routes(),
    }
}
