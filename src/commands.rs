use crate::calendar::{month_cells, parse_date, CalendarCell, YearMonth, WEEKDAY_LABELS};
use crate::screen::Screen;
use crate::store::{NoteStore, TaskStore};
use crate::ui;
use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use log::info;

pub fn resolve_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(value) => parse_date(value).context("parsing --today"),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn calendar(month: Option<YearMonth>, today: NaiveDate) -> Result<()> {
    let month = month.unwrap_or_else(|| YearMonth::of(today));
    let cells = month_cells(
        month.year(),
        month.month(),
        today.year(),
        today.month(),
        today.day(),
    )?;
    print!("{}", render_grid(month, &cells));
    Ok(())
}

pub fn routes() -> Result<()> {
    for route in Screen::ALL.iter().map(Screen::route) {
        let title = Screen::title_for_route(route).unwrap_or(route);
        println!("{}\t{}", route, title);
    }
    Ok(())
}

pub fn tui(screen: Screen, today: NaiveDate) -> Result<()> {
    info!("starting tui on {} with today={}", screen, today);
    let notes = NoteStore::new();
    let tasks = TaskStore::new();
    ui::run(notes, tasks, screen, today)?;
    info!("tui closed");
    Ok(())
}

/// Plain-text month grid, one week per line, today wrapped in brackets.
pub fn render_grid(month: YearMonth, cells: &[CalendarCell]) -> String {
    let mut out = String::new();
    out.push_str(&month.label());
    out.push('\n');
    let header: Vec<String> = WEEKDAY_LABELS.iter().map(|d| format!("{:>4}", d)).collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');
    for week in cells.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match (cell.day, cell.is_today) {
                (Some(day), true) => format!("[{:>2}]", day),
                (Some(day), false) => format!("{:>4}", day),
                (None, _) => "    ".to_string(),
            })
            .collect();
        out.push_str(row.join(" ").trim_end());
        out.push('\n');
    }
    out
}
