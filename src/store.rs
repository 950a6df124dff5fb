use crate::model::{
    is_blank, next_id, Note, NoteId, Observers, StoreEvent, SubscriptionId, Task, TaskId,
};
use chrono::Utc;
use log::debug;

const SEED_TASKS: [&str; 3] = ["Complete homework", "Buy groceries", "Call dentist"];

/// Newest-first collection of notes.
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
    observers: Observers<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        NoteStore::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Inserts a note at the head of the list. Returns `None` and leaves the
    /// store untouched when either field is blank.
    pub fn add_note(&mut self, title: &str, content: &str) -> Option<Note> {
        self.add_note_at(title, content, Utc::now().timestamp_millis())
    }

    pub fn add_note_at(&mut self, title: &str, content: &str, timestamp: i64) -> Option<Note> {
        if is_blank(title) || is_blank(content) {
            debug!("rejected note with blank title or content");
            return None;
        }
        let id = next_id(self.notes.iter().map(|n| n.id));
        let note = Note::new(id, title.to_string(), content.to_string(), timestamp);
        self.notes.insert(0, note.clone());
        debug!("added note {}", id);
        self.observers.notify(&StoreEvent::Inserted {
            index: 0,
            record: note.clone(),
        });
        Some(note)
    }

    pub fn delete_note(&mut self, id: NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        let removed = self.notes.remove(index);
        debug!("deleted note {}", id);
        self.observers.notify(&StoreEvent::Removed {
            index,
            record: removed.clone(),
        });
        Some(removed)
    }

    pub fn get_note_by_id(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent<Note>) + 'static,
    {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

/// Oldest-first collection of tasks.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    observers: Observers<Task>,
}

impl TaskStore {
    /// A store holding the three starter tasks.
    pub fn new() -> Self {
        let mut store = TaskStore::empty();
        for title in SEED_TASKS {
            store.add_task(title);
        }
        store
    }

    pub fn empty() -> Self {
        TaskStore::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn add_task(&mut self, title: &str) -> Option<Task> {
        if is_blank(title) {
            debug!("rejected task with blank title");
            return None;
        }
        let id = next_id(self.tasks.iter().map(|t| t.id));
        let task = Task::new(id, title.to_string());
        self.tasks.push(task.clone());
        debug!("added task {}", id);
        self.observers.notify(&StoreEvent::Inserted {
            index: self.tasks.len() - 1,
            record: task.clone(),
        });
        Some(task)
    }

    /// Flips completion in place. Returns the replacement, or `None` when the
    /// id is unknown.
    pub fn toggle_task(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let toggled = self.tasks[index].toggled();
        self.tasks[index] = toggled.clone();
        debug!("task {} completed={}", id, toggled.is_completed);
        self.observers.notify(&StoreEvent::Replaced {
            index,
            record: toggled.clone(),
        });
        Some(toggled)
    }

    pub fn delete_task(&mut self, id: TaskId) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(index);
        debug!("deleted task {}", id);
        self.observers.notify(&StoreEvent::Removed {
            index,
            record: removed.clone(),
        });
        Some(removed)
    }

    pub fn get_task_by_id(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn progress_fraction(&self) -> f64 {
        let total = self.total_count();
        if total == 0 {
            return 0.0;
        }
        self.completed_count() as f64 / total as f64
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent<Task>) + 'static,
    {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    fn titles(store: &TaskStore) -> Vec<&str> {
        store.tasks().iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn notes_are_newest_first_with_unique_ids() {
        let mut store = NoteStore::new();
        for i in 0..5 {
            store.add_note(&format!("title {i}"), "body");
        }
        let order: Vec<&str> = store.notes().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(
            order,
            vec!["title 4", "title 3", "title 2", "title 1", "title 0"]
        );
        let ids: HashSet<NoteId> = store.notes().iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn blank_note_inputs_are_ignored() {
        let mut store = NoteStore::new();
        store.add_note("keep", "me");
        let before = store.notes().to_vec();
        assert!(store.add_note("", "x").is_none());
        assert!(store.add_note("x", "").is_none());
        assert!(store.add_note("", "").is_none());
        assert!(store.add_note("   ", "\t").is_none());
        assert_eq!(store.notes(), before.as_slice());
    }

    #[test]
    fn note_keeps_given_timestamp_and_untrimmed_text() {
        let mut store = NoteStore::new();
        let note = store
            .add_note_at(" Groceries ", "milk\neggs", 1_700_000_000_000)
            .unwrap();
        assert_eq!(note.id, 0);
        assert_eq!(note.title, " Groceries ");
        assert_eq!(note.timestamp, 1_700_000_000_000);
        assert_eq!(store.get_note_by_id(0), Some(&note));
    }

    #[test]
    fn deleting_notes_by_id() {
        let mut store = NoteStore::new();
        store.add_note("a", "1");
        store.add_note("b", "2");
        assert!(store.delete_note(42).is_none());
        assert_eq!(store.len(), 2);
        let removed = store.delete_note(0).unwrap();
        assert_eq!(removed.title, "a");
        assert!(store.get_note_by_id(0).is_none());
        assert_eq!(store.notes()[0].title, "b");
    }

    #[test]
    fn note_ids_reuse_freed_maximum() {
        let mut store = NoteStore::new();
        store.add_note("a", "1");
        store.add_note("b", "2");
        store.delete_note(1);
        let again = store.add_note("c", "3").unwrap();
        assert_eq!(again.id, 1);
    }

    #[test]
    fn note_observers_see_inserts_and_removals() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = NoteStore::new();
        let sink = Rc::clone(&events);
        store.subscribe(move |event| {
            sink.borrow_mut()
                .push((event.kind(), event.index(), event.record().id));
        });
        store.add_note("a", "1");
        store.add_note("b", "2");
        store.add_note("", "ignored");
        store.delete_note(0);
        store.delete_note(99);
        assert_eq!(
            *events.borrow(),
            vec![("inserted", 0, 0), ("inserted", 0, 1), ("removed", 1, 0)]
        );
    }

    #[test]
    fn seeded_task_store() {
        let store = TaskStore::new();
        assert_eq!(
            titles(&store),
            vec!["Complete homework", "Buy groceries", "Call dentist"]
        );
        let ids: Vec<TaskId> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(store.tasks().iter().all(|t| !t.is_completed));
        assert_eq!(store.completed_count(), 0);
        assert_eq!(store.total_count(), 3);
        assert_eq!(store.progress_fraction(), 0.0);
    }

    #[test]
    fn tasks_append_and_toggle_in_place() {
        let mut store = TaskStore::empty();
        let a = store.add_task("A").unwrap();
        store.add_task("B");
        assert_eq!(titles(&store), vec!["A", "B"]);

        let toggled = store.toggle_task(a.id).unwrap();
        assert!(toggled.is_completed);
        assert_eq!(store.tasks()[0].id, a.id);
        assert!(store.tasks()[0].is_completed);
        assert_eq!(titles(&store), vec!["A", "B"]);
        assert_eq!(store.completed_count(), 1);
        assert_eq!(store.progress_fraction(), 0.5);

        store.toggle_task(a.id);
        assert!(!store.get_task_by_id(a.id).unwrap().is_completed);
    }

    #[test]
    fn unknown_ids_leave_tasks_unchanged() {
        let mut store = TaskStore::new();
        let before = store.tasks().to_vec();
        assert!(store.delete_task(17).is_none());
        assert!(store.toggle_task(17).is_none());
        assert!(store.get_task_by_id(17).is_none());
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn blank_task_title_is_ignored() {
        let mut store = TaskStore::empty();
        assert!(store.add_task("  ").is_none());
        assert_eq!(store.total_count(), 0);
        assert_eq!(store.progress_fraction(), 0.0);
    }

    #[test]
    fn task_id_reused_after_deleting_max() {
        let mut store = TaskStore::empty();
        assert_eq!(store.add_task("x").unwrap().id, 0);
        store.delete_task(0);
        assert_eq!(store.add_task("y").unwrap().id, 0);
    }

    #[test]
    fn task_observers_receive_replacements() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = TaskStore::new();
        let sink = Rc::clone(&events);
        let sub = store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        store.toggle_task(1);
        store.add_task("Walk dog");
        assert!(store.unsubscribe(sub));
        store.delete_task(0);

        let events = events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            StoreEvent::Replaced {
                index: 1,
                record: Task {
                    id: 1,
                    title: "Buy groceries".into(),
                    is_completed: true,
                },
            }
        );
        assert_eq!(events[1].index(), 3);
    }

    #[test]
    fn task_observers_see_removal_positions() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = TaskStore::new();
        let sink = Rc::clone(&events);
        store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        store.delete_task(1);
        store.delete_task(2);
        store.delete_task(99);

        assert_eq!(
            *events.borrow(),
            vec![
                StoreEvent::Removed {
                    index: 1,
                    record: Task::new(1, "Buy groceries".into()),
                },
                StoreEvent::Removed {
                    index: 1,
                    record: Task::new(2, "Call dentist".into()),
                },
            ]
        );
        assert_eq!(titles(&store), vec!["Complete homework"]);
    }
}
