use chrono::{Local, TimeZone};

pub type NoteId = u64;
pub type TaskId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub is_completed: bool,
}

impl Note {
    pub fn new(id: NoteId, title: String, content: String, timestamp: i64) -> Self {
        Note {
            id,
            title,
            content,
            timestamp,
        }
    }

    /// Creation time rendered in the local timezone, e.g. `Mar 04, 2024 09:15`.
    pub fn created_label(&self) -> String {
        match Local.timestamp_millis_opt(self.timestamp).single() {
            Some(dt) => dt.format("%b %d, %Y %H:%M").to_string(),
            None => String::from("unknown time"),
        }
    }
}

impl Task {
    pub fn new(id: TaskId, title: String) -> Self {
        Task {
            id,
            title,
            is_completed: false,
        }
    }

    pub fn toggled(&self) -> Self {
        Task {
            is_completed: !self.is_completed,
            ..self.clone()
        }
    }
}

/// Next identity for a store: one past the current maximum, 0 when empty.
/// Ids freed by deleting the maximum are handed out again.
pub fn next_id<I>(ids: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    ids.into_iter().max().map_or(0, |max| max + 1)
}

pub fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

/// A mutation applied to an ordered store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent<T> {
    Inserted { index: usize, record: T },
    Replaced { index: usize, record: T },
    Removed { index: usize, record: T },
}

impl<T> StoreEvent<T> {
    pub fn index(&self) -> usize {
        match self {
            StoreEvent::Inserted { index, .. }
            | StoreEvent::Replaced { index, .. }
            | StoreEvent::Removed { index, .. } => *index,
        }
    }

    pub fn record(&self) -> &T {
        match self {
            StoreEvent::Inserted { record, .. }
            | StoreEvent::Replaced { record, .. }
            | StoreEvent::Removed { record, .. } => record,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StoreEvent::Inserted { .. } => "inserted",
            StoreEvent::Replaced { .. } => "replaced",
            StoreEvent::Removed { .. } => "removed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn FnMut(&StoreEvent<T>)>;

/// Push-based subscriber list owned by a store.
pub struct Observers<T> {
    next: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T> Observers<T> {
    pub fn new() -> Self {
        Observers {
            next: 0,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent<T>) + 'static,
    {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn notify(&mut self, event: &StoreEvent<T>) {
        log::trace!(
            "fanning out {} event at index {} to {} listener(s)",
            event.kind(),
            event.index(),
            self.listeners.len()
        );
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn next_id_starts_at_zero_and_follows_max() {
        assert_eq!(next_id(Vec::<u64>::new()), 0);
        assert_eq!(next_id(vec![0, 4, 2]), 5);
    }

    #[test]
    fn blank_detection_trims_whitespace() {
        assert!(is_blank(""));
        assert!(is_blank("  \t\n"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn toggled_keeps_identity() {
        let task = Task::new(7, "Water plants".into());
        let done = task.toggled();
        assert_eq!(done.id, 7);
        assert_eq!(done.title, "Water plants");
        assert!(done.is_completed);
        assert!(!done.toggled().is_completed);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::new();
        let sink = Rc::clone(&seen);
        let id = observers.subscribe(move |event: &StoreEvent<u32>| {
            sink.borrow_mut().push(*event.record());
        });
        observers.notify(&StoreEvent::Inserted {
            index: 0,
            record: 1,
        });
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(&StoreEvent::Inserted {
            index: 0,
            record: 2,
        });
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(format!("{:?}", observers), "Observers { listeners: 0 }");
    }

    #[test]
    fn created_label_handles_out_of_range_timestamps() {
        let note = Note::new(0, "t".into(), "c".into(), i64::MAX);
        assert_eq!(note.created_label(), "unknown time");
    }
}
