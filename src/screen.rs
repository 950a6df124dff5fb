use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Notes,
    Tasks,
    Calendar,
}

/// Route name and display title for every screen, in navigation order.
const ROUTES: [(Screen, &str, &str); 3] = [
    (Screen::Notes, "notes", "Notes"),
    (Screen::Tasks, "tasks", "Tasks"),
    (Screen::Calendar, "calendar", "Calendar"),
];

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Notes, Screen::Tasks, Screen::Calendar];

    pub const START: Screen = Screen::Notes;

    fn entry(&self) -> (Screen, &'static str, &'static str) {
        ROUTES[self.position()]
    }

    pub fn position(&self) -> usize {
        match self {
            Screen::Notes => 0,
            Screen::Tasks => 1,
            Screen::Calendar => 2,
        }
    }

    pub fn route(&self) -> &'static str {
        self.entry().1
    }

    pub fn title(&self) -> &'static str {
        self.entry().2
    }

    pub fn from_route(route: &str) -> Option<Screen> {
        ROUTES
            .iter()
            .find(|(_, name, _)| *name == route)
            .map(|(screen, _, _)| *screen)
    }

    pub fn title_for_route(route: &str) -> Option<&'static str> {
        Screen::from_route(route).map(|s| s.title())
    }

    pub fn next(&self) -> Screen {
        Screen::ALL[(self.position() + 1) % Screen::ALL.len()]
    }

    pub fn prev(&self) -> Screen {
        Screen::ALL[(self.position() + Screen::ALL.len() - 1) % Screen::ALL.len()]
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown screen `{0}` (expected notes, tasks or calendar)")]
pub struct UnknownRoute(pub String);

impl FromStr for Screen {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::from_route(&s.trim().to_lowercase()).ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_table_round_trips() {
        for screen in Screen::ALL {
            assert_eq!(Screen::from_route(screen.route()), Some(screen));
        }
        assert_eq!(Screen::title_for_route("tasks"), Some("Tasks"));
        assert_eq!(Screen::title_for_route("settings"), None);
    }

    #[test]
    fn cycling_wraps_in_navigation_order() {
        assert_eq!(Screen::START, Screen::Notes);
        assert_eq!(Screen::Notes.next(), Screen::Tasks);
        assert_eq!(Screen::Calendar.next(), Screen::Notes);
        assert_eq!(Screen::Notes.prev(), Screen::Calendar);
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(" Calendar ".parse::<Screen>(), Ok(Screen::Calendar));
        assert!("home".parse::<Screen>().is_err());
    }
}
