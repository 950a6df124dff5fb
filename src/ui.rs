use crate::calendar::{CalendarGrid, YearMonth, WEEKDAY_LABELS};
use crate::model::{is_blank, Note, NoteId, StoreEvent, SubscriptionId, Task, TaskId};
use crate::screen::Screen;
use crate::store::{NoteStore, TaskStore};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::debug;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap,
};
use ratatui::Terminal;
use std::cell::{Cell, RefCell};
use std::io::stdout;
use std::rc::Rc;
use std::time::Duration;

pub fn run(notes: NoteStore, tasks: TaskStore, screen: Screen, today: NaiveDate) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(notes, tasks, screen, today);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

/// Refresh signal shared between the stores' listeners and the event loop.
#[derive(Clone, Default)]
struct Refresh {
    dirty: Rc<Cell<bool>>,
    last_change: Rc<RefCell<Option<String>>>,
}

impl Refresh {
    fn mark(&self) {
        self.dirty.set(true);
    }

    fn record(&self, message: String) {
        *self.last_change.borrow_mut() = Some(message);
        self.mark();
    }

    fn take(&self) -> bool {
        self.dirty.replace(false)
    }

    fn take_change(&self) -> Option<String> {
        self.last_change.borrow_mut().take()
    }
}

struct App {
    notes: NoteStore,
    tasks: TaskStore,
    screen: Screen,
    today: NaiveDate,
    month: YearMonth,
    note_list: ListState,
    task_list: ListState,
    status: String,
    mode: Mode,
    refresh: Refresh,
    subscriptions: (SubscriptionId, SubscriptionId),
}

enum Mode {
    Normal,
    AddingNote(NoteForm),
    AddingTask(FieldValue),
    ConfirmDelete(DeleteTarget),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum DeleteTarget {
    Note(NoteId),
    Task(TaskId),
}

struct NoteForm {
    title: FieldValue,
    content: FieldValue,
    field: NoteField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum NoteField {
    Title,
    Content,
}

#[derive(Clone, Default)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn move_left(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
        }
    }

    fn move_right(&mut self) {
        if let Some(ch) = self.value[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    fn backspace(&mut self) {
        if let Some(ch) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= ch.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }

    /// Shared line-editing keys; anything else is ignored.
    fn edit(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.len(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Char(c) if !is_command(key) => self.insert_char(c),
            _ => {}
        }
    }
}

impl NoteForm {
    fn new() -> Self {
        NoteForm {
            title: FieldValue::default(),
            content: FieldValue::default(),
            field: NoteField::Title,
        }
    }

    fn toggle_field(&mut self) {
        self.field = match self.field {
            NoteField::Title => NoteField::Content,
            NoteField::Content => NoteField::Title,
        };
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            NoteField::Title => &mut self.title,
            NoteField::Content => &mut self.content,
        }
    }

    fn is_submittable(&self) -> bool {
        !is_blank(&self.title.value) && !is_blank(&self.content.value)
    }
}

impl App {
    fn new(mut notes: NoteStore, mut tasks: TaskStore, screen: Screen, today: NaiveDate) -> Self {
        let refresh = Refresh::default();
        let on_note = refresh.clone();
        let note_sub = notes.subscribe(move |event: &StoreEvent<Note>| {
            on_note.record(describe_note_event(event));
        });
        let on_task = refresh.clone();
        let task_sub = tasks.subscribe(move |event: &StoreEvent<Task>| {
            on_task.record(describe_task_event(event));
        });
        refresh.mark();
        let mut app = App {
            notes,
            tasks,
            screen,
            today,
            month: YearMonth::of(today),
            note_list: ListState::default(),
            task_list: ListState::default(),
            status: format!("Opened {}", screen.title()),
            mode: Mode::Normal,
            refresh,
            subscriptions: (note_sub, task_sub),
        };
        app.clamp_selection();
        app
    }

    fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            if self.refresh.take() {
                if let Some(change) = self.refresh.take_change() {
                    self.status = change;
                }
                self.clamp_selection();
                terminal.draw(|f| self.draw(f))?;
            }
            if event::poll(Duration::from_millis(200))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Resize(_, _) => self.refresh.mark(),
                    _ => {}
                }
            }
        }
        self.notes.unsubscribe(self.subscriptions.0);
        self.tasks.unsubscribe(self.subscriptions.1);
        Ok(())
    }

    /// Returns `Ok(true)` when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let quit = match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::AddingNote(_) => {
                self.handle_note_form_key(key);
                false
            }
            Mode::AddingTask(_) => {
                self.handle_task_form_key(key);
                false
            }
            Mode::ConfirmDelete(_) => {
                self.handle_confirm_key(key);
                false
            }
        };
        self.refresh.mark();
        Ok(quit)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('1') => self.set_screen(Screen::Notes),
            KeyCode::Char('2') => self.set_screen(Screen::Tasks),
            KeyCode::Char('3') => self.set_screen(Screen::Calendar),
            KeyCode::Tab => self.set_screen(self.screen.next()),
            KeyCode::BackTab => self.set_screen(self.screen.prev()),
            _ => match self.screen {
                Screen::Notes => self.handle_notes_key(key),
                Screen::Tasks => self.handle_tasks_key(key),
                Screen::Calendar => self.handle_calendar_key(key),
            },
        }
        false
    }

    fn handle_notes_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => select_prev(&mut self.note_list),
            KeyCode::Down | KeyCode::Char('j') => {
                select_next(&mut self.note_list, self.notes.len())
            }
            KeyCode::Char('n') => {
                self.mode = Mode::AddingNote(NoteForm::new());
                self.status = "New note (Tab switch field, Ctrl+S save, Esc cancel)".into();
            }
            KeyCode::Char('d') | KeyCode::Delete => match self.selected_note().map(|n| n.id) {
                Some(id) => {
                    self.mode = Mode::ConfirmDelete(DeleteTarget::Note(id));
                    self.status = "Delete note? (y to confirm, n/Esc to cancel)".into();
                }
                None => self.status = "No note selected to delete".into(),
            },
            _ => {}
        }
    }

    fn handle_tasks_key(&mut self, key: KeyEvent) {
        let count = self.tasks.total_count();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => select_prev(&mut self.task_list),
            KeyCode::Down | KeyCode::Char('j') => select_next(&mut self.task_list, count),
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('x') => {
                match self.selected_task().map(|t| t.id) {
                    Some(id) => {
                        self.tasks.toggle_task(id);
                    }
                    None => self.status = "No task selected".into(),
                }
            }
            KeyCode::Char('n') => {
                self.mode = Mode::AddingTask(FieldValue::default());
                self.status = "New task (Enter save, Esc cancel)".into();
            }
            KeyCode::Char('d') | KeyCode::Delete => match self.selected_task().map(|t| t.id) {
                Some(id) => {
                    self.mode = Mode::ConfirmDelete(DeleteTarget::Task(id));
                    self.status = "Delete task? (y to confirm, n/Esc to cancel)".into();
                }
                None => self.status = "No task selected to delete".into(),
            },
            _ => {}
        }
    }

    fn handle_calendar_key(&mut self, key: KeyEvent) {
        let target = match key.code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('p') => self.month.pred(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') => self.month.succ(),
            KeyCode::Char('t') => Some(YearMonth::of(self.today)),
            _ => return,
        };
        match target {
            Some(month) => {
                self.month = month;
                self.status = format!("Showing {}", month.label());
            }
            None => self.status = "No further months in that direction".into(),
        }
    }

    fn handle_note_form_key(&mut self, key: KeyEvent) {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let close = match &mut mode {
            Mode::AddingNote(form) => self.process_note_form_key(form, key),
            _ => true,
        };
        self.mode = if close { Mode::Normal } else { mode };
    }

    fn process_note_form_key(&mut self, form: &mut NoteForm, key: KeyEvent) -> bool {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                return true;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Char('s') if control => return self.submit_note(form),
            KeyCode::Enter => match form.field {
                NoteField::Title => form.toggle_field(),
                NoteField::Content => form.content.insert_char('\n'),
            },
            _ => form.active_field_mut().edit(key),
        }
        false
    }

    fn submit_note(&mut self, form: &NoteForm) -> bool {
        if !form.is_submittable() {
            self.status = "Title and content are both required".into();
            return false;
        }
        if self
            .notes
            .add_note(&form.title.value, &form.content.value)
            .is_some()
        {
            self.note_list.select(Some(0));
        }
        true
    }

    fn handle_task_form_key(&mut self, key: KeyEvent) {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let close = match &mut mode {
            Mode::AddingTask(title) => match key.code {
                KeyCode::Esc => {
                    self.status = "Canceled".into();
                    true
                }
                KeyCode::Enter => self.submit_task(title),
                _ => {
                    title.edit(key);
                    false
                }
            },
            _ => true,
        };
        self.mode = if close { Mode::Normal } else { mode };
    }

    fn submit_task(&mut self, title: &FieldValue) -> bool {
        if is_blank(&title.value) {
            self.status = "Task title is required".into();
            return false;
        }
        if self.tasks.add_task(&title.value).is_some() {
            self.task_list
                .select(Some(self.tasks.total_count().saturating_sub(1)));
        }
        true
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let target = match self.mode {
            Mode::ConfirmDelete(target) => target,
            _ => return,
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let removed = match target {
                    DeleteTarget::Note(id) => self.notes.delete_note(id).is_some(),
                    DeleteTarget::Task(id) => self.tasks.delete_task(id).is_some(),
                };
                if !removed {
                    self.status = "Nothing to delete".into();
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn set_screen(&mut self, screen: Screen) {
        if self.screen != screen {
            debug!("navigating to {}", screen.route());
            self.screen = screen;
            self.status = format!("Switched to {}", screen.title());
        }
    }

    fn selected_note(&self) -> Option<&Note> {
        self.note_list
            .selected()
            .and_then(|idx| self.notes.notes().get(idx))
    }

    fn selected_task(&self) -> Option<&Task> {
        self.task_list
            .selected()
            .and_then(|idx| self.tasks.tasks().get(idx))
    }

    fn clamp_selection(&mut self) {
        clamp_list(&mut self.note_list, self.notes.len());
        clamp_list(&mut self.task_list, self.tasks.total_count());
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        match self.screen {
            Screen::Notes => self.draw_notes(f, layout[1]),
            Screen::Tasks => self.draw_tasks(f, layout[1]),
            Screen::Calendar => self.draw_calendar(f, layout[1]),
        }
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::AddingNote(form) => draw_note_form(f, form),
            Mode::AddingTask(title) => draw_task_form(f, title),
            Mode::ConfirmDelete(target) => self.draw_confirm(f, *target),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let titles: Vec<Line<'static>> = Screen::ALL
            .iter()
            .enumerate()
            .map(|(idx, screen)| Line::from(format!("{} {}", idx + 1, screen.title())))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.screen.position())
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(Span::styled(
                        self.screen.title(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )),
            )
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .divider("•");
        f.render_widget(tabs, area);
    }

    fn draw_notes(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        if self.notes.is_empty() {
            draw_empty_state(
                f,
                area,
                "No notes yet",
                "Press n to create your first note",
            );
            return;
        }
        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem<'static>> = self
            .notes
            .notes()
            .iter()
            .map(|note| note_item(note, width))
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(format!("Notes ({})", self.notes.len())),
            )
            .highlight_style(Style::default().bg(Color::Rgb(40, 44, 56)))
            .highlight_symbol("▌ ");
        f.render_stateful_widget(list, area, &mut self.note_list);
    }

    fn draw_tasks(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let total = self.tasks.total_count();
        let list_area = if total > 0 {
            let sections = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(3)])
                .split(area);
            let completed = self.tasks.completed_count();
            let gauge = Gauge::default()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan))
                        .title(format!(
                            "Progress: {} / {} tasks completed",
                            completed, total
                        )),
                )
                .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Rgb(22, 24, 30)))
                .ratio(self.tasks.progress_fraction())
                .label(format!("{:.0}%", self.tasks.progress_fraction() * 100.0));
            f.render_widget(gauge, sections[0]);
            sections[1]
        } else {
            area
        };

        if self.tasks.tasks().is_empty() {
            draw_empty_state(
                f,
                list_area,
                "No tasks yet",
                "Press n to create your first task",
            );
            return;
        }
        let items: Vec<ListItem<'static>> = self.tasks.tasks().iter().map(task_item).collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title("Tasks"),
            )
            .highlight_style(Style::default().bg(Color::Rgb(40, 44, 56)))
            .highlight_symbol("▌ ");
        f.render_stateful_widget(list, list_area, &mut self.task_list);
    }

    fn draw_calendar(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let grid = CalendarGrid::build(self.month, self.today);
        let rows = grid.weeks().count() as u16;
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(rows + 3),
                Constraint::Min(4),
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.month.label(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        f.render_widget(header, sections[0]);

        let mut lines = Vec::new();
        let heading: Vec<Span<'static>> = WEEKDAY_LABELS
            .iter()
            .map(|d| {
                Span::styled(
                    format!("{:^6}", d),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )
            })
            .collect();
        lines.push(Line::from(heading));
        for week in grid.weeks() {
            let spans: Vec<Span<'static>> = week
                .iter()
                .map(|cell| match cell.day {
                    Some(day) if cell.is_today => Span::styled(
                        format!("{:^6}", day),
                        Style::default()
                            .bg(Color::Cyan)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Some(day) => {
                        Span::styled(format!("{:^6}", day), Style::default().fg(Color::Gray))
                    }
                    None => Span::raw("      "),
                })
                .collect();
            lines.push(Line::from(spans));
        }
        let calendar = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(calendar, sections[1]);

        let info = Paragraph::new(vec![
            Line::from(Span::styled(
                "Calendar View",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "Browse months with ←/→, press t to return to {}. Today is highlighted.",
                    self.today.format("%B %Y")
                ),
                Style::default().fg(Color::Gray),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        );
        f.render_widget(info, sections[2]);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(self.footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn footer_help_line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled("1-3/Tab", Style::default().fg(Color::LightCyan)),
            Span::raw(" screens  "),
        ];
        match self.screen {
            Screen::Notes => spans.extend([
                Span::styled("↑↓", Style::default().fg(Color::LightCyan)),
                Span::raw(" browse  "),
                Span::styled("n", Style::default().fg(Color::LightMagenta)),
                Span::raw(" new  "),
                Span::styled("d", Style::default().fg(Color::LightRed)),
                Span::raw(" delete  "),
            ]),
            Screen::Tasks => spans.extend([
                Span::styled("↑↓", Style::default().fg(Color::LightCyan)),
                Span::raw(" browse  "),
                Span::styled("Space", Style::default().fg(Color::LightGreen)),
                Span::raw(" toggle  "),
                Span::styled("n", Style::default().fg(Color::LightMagenta)),
                Span::raw(" new  "),
                Span::styled("d", Style::default().fg(Color::LightRed)),
                Span::raw(" delete  "),
            ]),
            Screen::Calendar => spans.extend([
                Span::styled("←→", Style::default().fg(Color::LightCyan)),
                Span::raw(" month  "),
                Span::styled("t", Style::default().fg(Color::LightYellow)),
                Span::raw(" today  "),
            ]),
        }
        spans.extend([
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        Line::from(spans)
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, target: DeleteTarget) {
        let area = centered_rect(50, 30, f.size());
        let title = match target {
            DeleteTarget::Note(id) => self.notes.get_note_by_id(id).map(|n| n.title.clone()),
            DeleteTarget::Task(id) => self.tasks.get_task_by_id(id).map(|t| t.title.clone()),
        }
        .unwrap_or_default();
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\"?", title),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn draw_note_form(f: &mut ratatui::Frame<'_>, form: &NoteForm) {
    let area = centered_rect(70, 60, f.size());
    let mut lines = Vec::new();
    lines.extend(field_lines(
        "Title",
        &form.title,
        form.field == NoteField::Title,
    ));
    lines.extend(field_lines(
        "Content",
        &form.content,
        form.field == NoteField::Content,
    ));
    lines.push(Line::from(""));
    lines.push(submit_hint(
        form.is_submittable(),
        "Ctrl+S to add • Tab to switch field • Enter adds newline in Content • Esc to cancel",
    ));
    render_dialog(f, area, "New Note", lines);
}

fn draw_task_form(f: &mut ratatui::Frame<'_>, title: &FieldValue) {
    let area = centered_rect(60, 30, f.size());
    let mut lines = field_lines("Task Title", title, true);
    lines.push(Line::from(""));
    lines.push(submit_hint(
        !is_blank(&title.value),
        "Enter to add • Esc to cancel",
    ));
    render_dialog(f, area, "New Task", lines);
}

fn render_dialog(f: &mut ratatui::Frame<'_>, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    title.to_string(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn submit_hint(enabled: bool, text: &str) -> Line<'static> {
    let style = if enabled {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    };
    Line::from(Span::styled(text.to_string(), style))
}

fn draw_empty_state(f: &mut ratatui::Frame<'_>, area: Rect, headline: &str, hint: &str) {
    let top = area.height.saturating_sub(4) / 2;
    let mut lines = vec![Line::from(""); top as usize];
    lines.push(Line::from(Span::styled(
        "+",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::DIM),
    )));
    lines.push(Line::from(Span::styled(
        headline.to_string(),
        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(Color::DarkGray),
    )));
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn note_item(note: &Note, width: usize) -> ListItem<'static> {
    let mut lines = vec![Line::from(Span::styled(
        truncate_text(&note.title, width),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    let content_lines: Vec<&str> = note.content.lines().collect();
    for (idx, line) in content_lines.iter().take(2).enumerate() {
        let text = if idx == 1 && content_lines.len() > 2 {
            truncate_text(&format!("{line}..."), width)
        } else {
            truncate_text(line, width)
        };
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(Line::from(Span::styled(
        note.created_label(),
        Style::default().fg(Color::DarkGray),
    )));
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn task_item(task: &Task) -> ListItem<'static> {
    let (mark, style) = if task.is_completed {
        (
            "[x]",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
        )
    } else {
        ("[ ]", Style::default().fg(Color::White))
    };
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{} ", mark),
            Style::default().fg(if task.is_completed {
                Color::Green
            } else {
                Color::Gray
            }),
        ),
        Span::styled(task.title.clone(), style),
    ]))
}

fn field_lines(label: &str, field: &FieldValue, active: bool) -> Vec<Line<'static>> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let prefix = format!("{}: ", label);
    let spacer = " ".repeat(prefix.chars().count());
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    text.split('\n')
        .enumerate()
        .map(|(idx, line)| {
            Line::from(vec![
                Span::styled(
                    if idx == 0 {
                        prefix.clone()
                    } else {
                        spacer.clone()
                    },
                    label_style,
                ),
                Span::styled(line.to_string(), value_style),
            ])
        })
        .collect()
}

fn describe_note_event(event: &StoreEvent<Note>) -> String {
    let note = event.record();
    // Notes are only ever inserted or removed.
    match event {
        StoreEvent::Removed { .. } => format!("Deleted note \"{}\"", note.title),
        _ => format!("Added note \"{}\"", note.title),
    }
}

fn describe_task_event(event: &StoreEvent<Task>) -> String {
    let task = event.record();
    match event {
        StoreEvent::Inserted { .. } => format!("Added task \"{}\"", task.title),
        StoreEvent::Replaced { .. } if task.is_completed => {
            format!("Completed \"{}\"", task.title)
        }
        StoreEvent::Replaced { .. } => format!("Reopened \"{}\"", task.title),
        StoreEvent::Removed { .. } => format!("Deleted task \"{}\"", task.title),
    }
}

fn is_command(key: KeyEvent) -> bool {
    key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn select_prev(state: &mut ListState) {
    if let Some(idx) = state.selected() {
        state.select(Some(idx.saturating_sub(1)));
    }
}

fn select_next(state: &mut ListState, len: usize) {
    if len == 0 {
        return;
    }
    let next = state.selected().map_or(0, |idx| (idx + 1).min(len - 1));
    state.select(Some(next));
}

fn clamp_list(state: &mut ListState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        let idx = state.selected().unwrap_or(0).min(len - 1);
        state.select(Some(idx));
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn truncate_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 15).unwrap()
    }

    fn app(screen: Screen) -> App {
        App::new(NoteStore::new(), TaskStore::new(), screen, today())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn render(app: &mut App) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect()
    }

    fn screen_contains(lines: &[String], needle: &str) -> bool {
        lines.iter().any(|l| l.contains(needle))
    }

    #[test]
    fn adding_a_note_through_the_dialog() {
        let mut app = app(Screen::Notes);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Shopping");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "milk");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "bread");
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.notes.len(), 1);
        assert_eq!(app.notes.notes()[0].content, "milk\nbread");
        assert!(app.refresh.take());
        assert_eq!(
            app.refresh.take_change().as_deref(),
            Some("Added note \"Shopping\"")
        );
    }

    #[test]
    fn control_enter_in_content_is_a_newline() {
        let mut app = app(Screen::Notes);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Plan");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "a");
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL))
            .unwrap();
        type_text(&mut app, "b");
        assert!(matches!(app.mode, Mode::AddingNote(_)));
        assert!(app.notes.is_empty());

        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(app.notes.notes()[0].content, "a\nb");
    }

    #[test]
    fn note_status_messages() {
        let mut app = app(Screen::Notes);
        app.notes.add_note("Trip", "pack");
        assert_eq!(
            app.refresh.take_change().as_deref(),
            Some("Added note \"Trip\"")
        );
        app.notes.delete_note(0);
        assert_eq!(
            app.refresh.take_change().as_deref(),
            Some("Deleted note \"Trip\"")
        );
    }

    #[test]
    fn note_dialog_refuses_blank_content() {
        let mut app = app(Screen::Notes);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Only a title");
        app.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(matches!(app.mode, Mode::AddingNote(_)));
        assert!(app.notes.is_empty());
        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn toggling_and_deleting_tasks() {
        let mut app = app(Screen::Tasks);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.tasks.get_task_by_id(1).unwrap().is_completed);

        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(
            app.mode,
            Mode::ConfirmDelete(DeleteTarget::Task(1))
        ));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.tasks.total_count(), 2);
        assert!(app.tasks.get_task_by_id(1).is_none());
    }

    #[test]
    fn delete_can_be_canceled() {
        let mut app = app(Screen::Tasks);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.tasks.total_count(), 3);
        assert_eq!(app.status, "Delete canceled");
    }

    #[test]
    fn new_task_is_selected_after_adding() {
        let mut app = app(Screen::Tasks);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Walk dog");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.tasks.tasks()[3].title, "Walk dog");
        assert_eq!(app.task_list.selected(), Some(3));
    }

    #[test]
    fn blank_task_keeps_dialog_open() {
        let mut app = app(Screen::Tasks);
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::AddingTask(_)));
        assert_eq!(app.tasks.total_count(), 3);
    }

    #[test]
    fn screen_navigation_keys() {
        let mut app = app(Screen::Notes);
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.screen, Screen::Calendar);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Notes);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.screen, Screen::Calendar);
        let quit = app
            .handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))
            .unwrap();
        assert!(quit);
    }

    #[test]
    fn calendar_month_navigation() {
        let mut app = app(Screen::Calendar);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.month, YearMonth::new(2026, 5).unwrap());
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.month, YearMonth::new(2026, 3).unwrap());
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.month, YearMonth::new(2026, 4).unwrap());
    }

    #[test]
    fn renders_empty_notes_state() {
        let mut app = app(Screen::Notes);
        let lines = render(&mut app);
        assert!(screen_contains(&lines, "No notes yet"));
        assert!(screen_contains(&lines, "1 Notes"));
    }

    #[test]
    fn renders_task_progress() {
        let mut app = app(Screen::Tasks);
        app.tasks.toggle_task(0);
        let lines = render(&mut app);
        assert!(screen_contains(&lines, "Progress: 1 / 3 tasks completed"));
        assert!(screen_contains(&lines, "[x] Complete homework"));
        assert!(screen_contains(&lines, "[ ] Call dentist"));
    }

    #[test]
    fn renders_calendar_month() {
        let mut app = app(Screen::Calendar);
        let lines = render(&mut app);
        assert!(screen_contains(&lines, "April 2026"));
        assert!(screen_contains(&lines, "Sun"));
        assert!(screen_contains(&lines, "30"));
    }

    #[test]
    fn field_editing_respects_multibyte_chars() {
        let mut field = FieldValue::default();
        for ch in "héllo".chars() {
            field.insert_char(ch);
        }
        field.move_left();
        field.move_left();
        field.move_left();
        field.backspace();
        assert_eq!(field.value, "hllo");
        assert_eq!(field.with_caret(), "h▌llo");
        field.move_right();
        assert_eq!(field.cursor, 2);
    }

    #[test]
    fn truncation_adds_ellipsis() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a longer title", 8), "a lon...");
        assert_eq!(truncate_text("abcdef", 2), "ab");
    }
}
