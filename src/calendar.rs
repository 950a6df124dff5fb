use chrono::{Datelike, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CalendarError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("invalid month (use YYYY-MM): {0}")]
    InvalidYearMonth(String),
    #[error("invalid date (use YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("{year}-{month:02} is outside the supported date range")]
    OutOfRange { year: i32, month: u32 },
}

/// A calendar month, used as the unit of navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(CalendarError::OutOfRange { year, month });
        }
        Ok(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Validated in `new`; `of` starts from a real date.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Day number of the last day of the month.
    pub fn days_in_month(&self) -> u32 {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            // December of chrono's final year has no following month.
            .unwrap_or(31)
    }

    /// Weekday of the 1st, counting Sunday as 0.
    pub fn first_weekday_from_sunday(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn succ(&self) -> Option<Self> {
        if self.month == 12 {
            YearMonth::new(self.year.checked_add(1)?, 1).ok()
        } else {
            YearMonth::new(self.year, self.month + 1).ok()
        }
    }

    pub fn pred(&self) -> Option<Self> {
        if self.month == 1 {
            YearMonth::new(self.year.checked_sub(1)?, 12).ok()
        } else {
            YearMonth::new(self.year, self.month - 1).ok()
        }
    }

    /// Header text such as `February 2024`.
    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (year, month) = raw
            .split_once('-')
            .ok_or_else(|| CalendarError::InvalidYearMonth(raw.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| CalendarError::InvalidYearMonth(raw.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| CalendarError::InvalidYearMonth(raw.to_string()))?;
        YearMonth::new(year, month)
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate, CalendarError> {
    let raw = input.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| CalendarError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCell {
    pub day: Option<u32>,
    pub is_today: bool,
}

/// Sunday-first month grid padded to whole weeks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    pub month: YearMonth,
    pub first_day_of_week: u32,
    pub days_in_month: u32,
    pub cells: Vec<CalendarCell>,
}

impl CalendarGrid {
    pub fn build(month: YearMonth, today: NaiveDate) -> Self {
        let first_day_of_week = month.first_weekday_from_sunday();
        let days_in_month = month.days_in_month();
        let total_cells = (first_day_of_week + days_in_month).div_ceil(7) * 7;
        let today_in_month = YearMonth::of(today) == month;

        let cells = (0..total_cells)
            .map(|i| {
                let day = (i + 1)
                    .checked_sub(first_day_of_week)
                    .filter(|d| (1..=days_in_month).contains(d));
                CalendarCell {
                    day,
                    is_today: today_in_month && day == Some(today.day()),
                }
            })
            .collect();

        CalendarGrid {
            month,
            first_day_of_week,
            days_in_month,
            cells,
        }
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }
}

/// Flat form of the grid query keyed on plain numbers.
pub fn month_cells(
    year: i32,
    month: u32,
    today_year: i32,
    today_month: u32,
    today_day: u32,
) -> Result<Vec<CalendarCell>, CalendarError> {
    let target = YearMonth::new(year, month)?;
    let today = NaiveDate::from_ymd_opt(today_year, today_month, today_day).ok_or_else(|| {
        CalendarError::InvalidDate(format!("{today_year:04}-{today_month:02}-{today_day:02}"))
    })?;
    Ok(CalendarGrid::build(target, today).cells)
}
