//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates between
//! the different screens (task list, forms, dialogs).
//!
//! The task list shown on screen is a view model: it is never patched in place,
//! every mutation goes to the repository and the list is rebuilt from
//! `TaskRepository::list_all`.

use std::io;
use std::path::PathBuf;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use tracing::{error, info};

use crate::db::{format_completed, format_tags, format_time, TaskRepository};
use crate::error::{Error, Result};
use crate::settings::Settings;
use crate::task::{parse_batch_text, Task};
use crate::tui::{
    colors::{text_on, urgency_color, DARK_PURPLE, DARK_RED, GOLD},
    enums::{AppExit, AppState, ConfirmAction},
    task_form::{
        BatchForm, TaskForm, CATEGORY_GLOBAL_ORDER, DESCRIPTION_GLOBAL_ORDER, DURATION_GLOBAL_ORDER,
        PRIORITY_GLOBAL_ORDER, TITLE_GLOBAL_ORDER, URGENCY_GLOBAL_ORDER,
    },
    utils::{centered_rect, scroll_window},
};

const SELECTOR_TITLES: [&str; 4] = ["Category", "Priority", "Urgency", "Duration"];

/// Main application state for the terminal user interface.
pub struct App {
    state: AppState,
    repo: TaskRepository,
    tasks: Vec<Task>,
    task_list_state: TableState,
    selected_task: Option<i64>,
    task_form: TaskForm,
    batch_form: BatchForm,
    settings: Settings,
    settings_path: PathBuf,
    settings_draft: Settings,
    confirm_action: Option<ConfirmAction>,
    status_message: String,
}

impl App {
    /// Create a new App over `repo`, loading settings from `settings_path`.
    pub fn new(repo: TaskRepository, settings_path: PathBuf) -> Result<Self> {
        let settings = Settings::load(&settings_path);
        let tasks = repo.list_all()?;
        let mut app = App {
            state: AppState::TaskList,
            repo,
            tasks,
            task_list_state: TableState::default(),
            selected_task: None,
            task_form: TaskForm::new(),
            batch_form: BatchForm::new(),
            settings_draft: settings.clone(),
            settings,
            settings_path,
            confirm_action: None,
            status_message: String::new(),
        };
        app.select_index(0);
        Ok(app)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of incomplete tasks in the current view model.
    pub fn open_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Return to the task list after the main view was shown again from the tray.
    pub fn restore(&mut self) {
        self.state = AppState::TaskList;
        self.confirm_action = None;
        self.reload();
        self.set_status_message("Welcome back".to_string());
    }

    fn select_index(&mut self, idx: usize) {
        if self.tasks.is_empty() {
            self.task_list_state.select(None);
        } else {
            self.task_list_state.select(Some(idx.min(self.tasks.len() - 1)));
        }
    }

    /// Get a reference to the task under the list cursor.
    fn highlighted_task(&self) -> Option<&Task> {
        self.task_list_state.selected().and_then(|i| self.tasks.get(i))
    }

    /// Get a reference to the task opened in the detail or edit view.
    fn get_selected_task(&self) -> Option<&Task> {
        self.selected_task
            .and_then(|id| self.tasks.iter().find(|t| t.id == id))
    }

    /// Rebuild the view model, keeping the cursor on the highlighted task if it survives.
    fn reload(&mut self) {
        let focus = self.highlighted_task().map(|t| t.id);
        self.reload_focus(focus);
    }

    /// Rebuild the view model and move the cursor to task `focus` when present.
    fn reload_focus(&mut self, focus: Option<i64>) {
        let old_index = self.task_list_state.selected().unwrap_or(0);
        match self.repo.list_all() {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => {
                error!(error = %e, "failed to reload tasks");
                self.set_status_message(format!("Error: {e}"));
                return;
            }
        }
        match focus.and_then(|id| self.tasks.iter().position(|t| t.id == id)) {
            Some(idx) => self.select_index(idx),
            None => self.select_index(old_index),
        }
    }

    /// Show the outcome of a repository operation and rebuild the list.
    fn apply(&mut self, result: Result<String>, focus: Option<i64>) {
        match result {
            Ok(msg) => self.set_status_message(msg),
            Err(e) => {
                error!(error = %e, "task operation failed");
                self.set_status_message(format!("Error: {e}"));
            }
        }
        self.reload_focus(focus);
    }

    /// Set a status message to display in the status bar.
    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    /// Clear the current status message.
    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    fn open_add_form(&mut self) {
        self.task_form = TaskForm::new();
        self.state = AppState::AddTask;
    }

    fn open_edit_form(&mut self, task_id: i64) {
        if let Some(task) = self.tasks.iter().find(|t| t.id == task_id) {
            self.task_form = TaskForm::from_task(task);
            self.selected_task = Some(task_id);
            self.state = AppState::EditTask;
        }
    }

    fn toggle_completed(&mut self, task_id: i64) {
        let Some(completed) = self.tasks.iter().find(|t| t.id == task_id).map(|t| t.completed) else {
            return;
        };
        let result = self.repo.set_completed(task_id, !completed).map(|_| {
            if completed {
                "Task reopened".to_string()
            } else {
                "Task marked done".to_string()
            }
        });
        self.apply(result, Some(task_id));
    }

    fn ask_delete(&mut self, task_id: i64) {
        if let Some(task) = self.tasks.iter().find(|t| t.id == task_id) {
            self.confirm_action = Some(ConfirmAction::DeleteTask {
                id: task.id,
                title: task.title.clone(),
            });
            self.selected_task = Some(task_id);
            self.state = AppState::Confirm;
        }
    }

    /// Ask to delete every task currently checked as completed in the view.
    fn ask_delete_completed(&mut self) {
        let ids: Vec<i64> = self.tasks.iter().filter(|t| t.completed).map(|t| t.id).collect();
        if ids.is_empty() {
            self.set_status_message("No completed tasks to delete".to_string());
            return;
        }
        self.confirm_action = Some(ConfirmAction::DeleteCompleted(ids));
        self.state = AppState::Confirm;
    }

    /// Handle keyboard input when in the task list view.
    fn handle_task_list_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> Option<AppExit> {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Some(AppExit::Quit),
            KeyCode::Char('q') | KeyCode::Esc => return Some(AppExit::Close),
            KeyCode::Up | KeyCode::Char('k') => {
                let idx = self.task_list_state.selected().unwrap_or(0);
                self.select_index(idx.saturating_sub(1));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let idx = self.task_list_state.selected().map_or(0, |i| i + 1);
                self.select_index(idx);
            }
            KeyCode::Home => self.select_index(0),
            KeyCode::End => self.select_index(self.tasks.len().saturating_sub(1)),
            KeyCode::Enter => {
                if let Some(id) = self.highlighted_task().map(|t| t.id) {
                    self.selected_task = Some(id);
                    self.state = AppState::TaskDetail;
                }
            }
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => match self.highlighted_task().map(|t| t.id) {
                Some(id) => self.open_edit_form(id),
                None => self.set_status_message("No task selected".to_string()),
            },
            KeyCode::Char('d') => match self.highlighted_task().map(|t| t.id) {
                Some(id) => self.ask_delete(id),
                None => self.set_status_message("No task selected".to_string()),
            },
            KeyCode::Char('D') => self.ask_delete_completed(),
            KeyCode::Char(' ') | KeyCode::Char('c') => {
                if let Some(id) = self.highlighted_task().map(|t| t.id) {
                    self.toggle_completed(id);
                }
            }
            KeyCode::Char('b') => {
                self.batch_form = BatchForm::new();
                self.state = AppState::BatchAdd;
            }
            KeyCode::Char('o') => {
                self.settings_draft = self.settings.clone();
                self.state = AppState::Settings;
            }
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::Char('r') => {
                self.reload();
                self.set_status_message("Tasks reloaded".to_string());
            }
            _ => {}
        }
        None
    }

    /// Handle keyboard input when viewing task details.
    fn handle_detail_input(&mut self, key: KeyCode) {
        let Some(task_id) = self.selected_task else {
            self.state = AppState::TaskList;
            return;
        };
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.state = AppState::TaskList,
            KeyCode::Char('e') => self.open_edit_form(task_id),
            KeyCode::Char('d') => self.ask_delete(task_id),
            KeyCode::Char(' ') | KeyCode::Char('c') => self.toggle_completed(task_id),
            _ => {}
        }
    }

    /// Handle keyboard input when in task creation or editing forms.
    fn handle_form_input(&mut self, key: KeyCode, is_edit: bool) {
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Tab | KeyCode::Down => self.task_form.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.task_form.prev_field(),
            KeyCode::Left => self.task_form.handle_left_right(false),
            KeyCode::Right => self.task_form.handle_left_right(true),
            KeyCode::Home => {
                if let Some(field) = self.task_form.active_input() {
                    field.move_home();
                }
            }
            KeyCode::End => {
                if let Some(field) = self.task_form.active_input() {
                    field.move_end();
                }
            }
            KeyCode::Backspace => self.task_form.handle_backspace(),
            KeyCode::Delete => self.task_form.handle_delete(),
            KeyCode::Enter => self.submit_form(is_edit),
            KeyCode::Char(c) => self.task_form.handle_char(c),
            _ => {}
        }
    }

    /// Create or update a task from the form. An empty title closes the form silently.
    fn submit_form(&mut self, is_edit: bool) {
        self.state = AppState::TaskList;
        let title = self.task_form.title.value.clone();
        let description = self.task_form.description.value.clone();
        let attrs = self.task_form.attributes();

        if is_edit {
            let Some(id) = self.selected_task else {
                return;
            };
            match self.repo.update(id, &title, &description, attrs) {
                Ok(true) => self.apply(Ok("Task updated".to_string()), Some(id)),
                Ok(false) => self.reload_focus(Some(id)),
                Err(e) => self.apply(Err(e), Some(id)),
            }
        } else {
            match self.repo.create(&title, &description, attrs) {
                Ok(task) => self.apply(Ok("Task created".to_string()), Some(task.id)),
                Err(Error::EmptyTitle) => {}
                Err(e) => self.apply(Err(e), None),
            }
        }
    }

    /// Handle keyboard input in the batch-add dialog.
    fn handle_batch_input(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('s') && modifiers.contains(KeyModifiers::CONTROL) {
            self.submit_batch();
            return;
        }
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Tab => self.batch_form.next_focus(),
            KeyCode::BackTab => self.batch_form.prev_focus(),
            _ if !self.batch_form.editing_text() => match key {
                KeyCode::Left => self.batch_form.step_selector(false),
                KeyCode::Right => self.batch_form.step_selector(true),
                KeyCode::Enter => self.submit_batch(),
                _ => {}
            },
            KeyCode::Enter => self.batch_form.editor.newline(),
            KeyCode::Backspace if modifiers.contains(KeyModifiers::CONTROL) => self.batch_form.editor.clear(),
            KeyCode::Backspace => self.batch_form.editor.backspace(),
            KeyCode::Delete => self.batch_form.editor.delete(),
            KeyCode::Left => self.batch_form.editor.move_left(),
            KeyCode::Right => self.batch_form.editor.move_right(),
            KeyCode::Up => self.batch_form.editor.move_up(),
            KeyCode::Down => self.batch_form.editor.move_down(),
            KeyCode::Home => self.batch_form.editor.move_home(),
            KeyCode::End => self.batch_form.editor.move_end(),
            KeyCode::Char(c) => self.batch_form.editor.insert_char(c),
            _ => {}
        }
    }

    /// Insert every non-blank line of the batch editor with the chosen defaults.
    fn submit_batch(&mut self) {
        self.state = AppState::TaskList;
        if self.batch_form.editor.is_blank() {
            return;
        }
        let items = parse_batch_text(&self.batch_form.editor.text());
        if items.is_empty() {
            return;
        }
        let defaults = self.batch_form.defaults.attributes();
        let result = self
            .repo
            .create_batch(&items, defaults)
            .map(|created| format!("Added {} task(s)", created.len()));
        self.apply(result, None);
    }

    /// Handle keyboard input in the settings dialog.
    fn handle_settings_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.state = AppState::TaskList,
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                self.settings_draft.close_to_tray = !self.settings_draft.close_to_tray;
            }
            KeyCode::Enter => {
                self.state = AppState::TaskList;
                match self.settings_draft.save(&self.settings_path) {
                    Ok(()) => {
                        self.settings = self.settings_draft.clone();
                        info!(close_to_tray = self.settings.close_to_tray, "settings saved");
                        self.set_status_message("Settings saved".to_string());
                    }
                    Err(e) => {
                        error!(error = %e, "failed to save settings");
                        self.set_status_message(format!("Error saving settings: {e}"));
                    }
                }
            }
            _ => {}
        }
    }

    /// Handle keyboard input in the confirmation dialog.
    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.state = AppState::TaskList;
                let result = match self.confirm_action.take() {
                    Some(ConfirmAction::DeleteTask { id, .. }) => self.repo.delete(id),
                    Some(ConfirmAction::DeleteCompleted(ids)) => self.repo.delete_many(&ids),
                    None => return,
                };
                self.selected_task = None;
                self.apply(result.map(|n| format!("Deleted {n} task(s)")), None);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::TaskList;
                self.confirm_action = None;
            }
            _ => {}
        }
    }

    /// Handle keyboard input when viewing the help screen.
    fn handle_help_input(&mut self, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::F(1)) {
            self.state = AppState::TaskList;
        }
    }

    /// Dispatch one key press to the handler for the current state.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<AppExit> {
        self.clear_status_message();
        match self.state {
            AppState::TaskList => return self.handle_task_list_input(key.code, key.modifiers),
            AppState::TaskDetail => self.handle_detail_input(key.code),
            AppState::AddTask => self.handle_form_input(key.code, false),
            AppState::EditTask => self.handle_form_input(key.code, true),
            AppState::BatchAdd => self.handle_batch_input(key.code, key.modifiers),
            AppState::Settings => self.handle_settings_input(key.code),
            AppState::Help => self.handle_help_input(key.code),
            AppState::Confirm => self.handle_confirm_input(key.code),
        }
        None
    }

    /// Poll for and handle keyboard events.
    fn handle_input(&mut self) -> io::Result<Option<AppExit>> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(None)
    }

    /// Render the main task list view.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let header_text = vec![Line::from(vec![
            Span::styled("TO-DO LIST", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(
                format!("{} open, {} done", self.open_count(), self.tasks.len() - self.open_count()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ])];
        let header_block = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(header_block, chunks[0]);

        let header_cells = ["", "Task", "Tags", "Created"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
        let header = Row::new(header_cells)
            .style(Style::default().bg(DARK_PURPLE).fg(text_on(DARK_PURPLE)))
            .height(1);

        let rows: Vec<Row> = self
            .tasks
            .iter()
            .map(|task| {
                let style = if task.completed {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(Color::White)
                };
                let mut lines = vec![Line::from(Span::styled(
                    task.title.clone(),
                    style.add_modifier(Modifier::BOLD),
                ))];
                if !task.description.is_empty() {
                    lines.push(Line::from(Span::styled(
                        task.description.clone(),
                        style.fg(Color::Gray).remove_modifier(Modifier::BOLD),
                    )));
                }
                let height = lines.len() as u16;
                let tag_style = if task.completed {
                    style
                } else {
                    Style::default().fg(urgency_color(task.urgency))
                };
                Row::new(vec![
                    Cell::from(format_completed(task.completed)),
                    Cell::from(Text::from(lines)),
                    Cell::from(format_tags(task)).style(tag_style),
                    Cell::from(format_time(task.created_time)),
                ])
                .height(height)
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Min(30),
            Constraint::Length(48),
            Constraint::Length(17),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(format!(
                "Tasks ({}) - Press 'h' for help",
                self.tasks.len()
            )))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        f.render_stateful_widget(table, chunks[1], &mut self.task_list_state);
    }

    /// Render the detailed view of a single task.
    fn render_task_detail(&mut self, f: &mut Frame, area: Rect) {
        let Some(task) = self.get_selected_task() else {
            return;
        };
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let field = |name: &'static str, value: String| {
            Line::from(vec![Span::styled(format!("{name}: "), bold), Span::raw(value)])
        };
        let text = vec![
            field("ID", task.id.to_string()),
            field("Title", task.title.clone()),
            field("Completed", if task.completed { "yes" } else { "no" }.to_string()),
            field("Category", task.category.label().to_string()),
            field("Priority", task.priority.label().to_string()),
            field("Urgency", task.urgency.label().to_string()),
            field("Duration", task.duration.label().to_string()),
            field("Created", format_time(task.created_time)),
            field("Updated", format_time(task.updated_time)),
            Line::from(""),
            Line::from(Span::styled("Description:", bold)),
            Line::from(if task.description.is_empty() {
                "-".to_string()
            } else {
                task.description.clone()
            }),
        ];

        let paragraph = Paragraph::new(text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Task Details - [e]dit, [d]elete, [space] toggle done, [Esc] back"),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the task creation or editing form.
    fn render_task_form(&mut self, f: &mut Frame, area: Rect, is_edit: bool) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Description
                Constraint::Length(3), // Category
                Constraint::Length(3), // Priority
                Constraint::Length(3), // Urgency
                Constraint::Length(3), // Duration
                Constraint::Min(1),    // Instructions
            ])
            .split(area);

        let focus = |order: usize| {
            if self.task_form.current_field == order {
                Style::default().fg(GOLD)
            } else {
                Style::default()
            }
        };

        let field_width = chunks[0].width.saturating_sub(2) as usize;
        let (title_text, title_col) =
            scroll_window(&self.task_form.title.value, self.task_form.title.cursor, field_width);
        let (desc_text, desc_col) = scroll_window(
            &self.task_form.description.value,
            self.task_form.description.cursor,
            field_width,
        );

        let title_input = Paragraph::new(title_text).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Title *")
                .border_style(focus(TITLE_GLOBAL_ORDER)),
        );
        f.render_widget(title_input, chunks[0]);

        let desc_input = Paragraph::new(desc_text).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Description")
                .border_style(focus(DESCRIPTION_GLOBAL_ORDER)),
        );
        f.render_widget(desc_input, chunks[1]);

        let selector_orders = [
            CATEGORY_GLOBAL_ORDER,
            PRIORITY_GLOBAL_ORDER,
            URGENCY_GLOBAL_ORDER,
            DURATION_GLOBAL_ORDER,
        ];
        for (i, order) in selector_orders.into_iter().enumerate() {
            let selector = Paragraph::new(format!("< {} >", self.task_form.selectors.label(i))).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(SELECTOR_TITLES[i])
                    .border_style(focus(order)),
            );
            f.render_widget(selector, chunks[2 + i]);
        }

        let help_text = if is_edit {
            "Tab/Up/Down: Navigate  Left/Right: Change selectors  Enter: Save  Esc: Cancel"
        } else {
            "Tab/Up/Down: Navigate  Left/Right: Change selectors  Enter: Create  Esc: Cancel"
        };
        let instructions = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Instructions"))
            .wrap(Wrap { trim: true });
        f.render_widget(instructions, chunks[6]);

        let cursor_field = match self.task_form.current_field {
            TITLE_GLOBAL_ORDER => Some((chunks[0], title_col)),
            DESCRIPTION_GLOBAL_ORDER => Some((chunks[1], desc_col)),
            _ => None,
        };
        if let Some((chunk, col)) = cursor_field {
            f.set_cursor_position((chunk.x + 1 + col as u16, chunk.y + 1));
        }
    }

    /// Render the batch-add dialog: editor on top, shared attributes below.
    fn render_batch(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3), Constraint::Length(3)])
            .split(area);

        let editor_style = if self.batch_form.editing_text() {
            Style::default().fg(GOLD)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title("Batch Add - one task per line, optional description after '|' (e.g. Buy groceries|Get vegetables)")
            .borders(Borders::ALL)
            .border_style(editor_style);
        let inner = block.inner(chunks[0]);
        f.render_widget(block, chunks[0]);

        let visible_height = inner.height as usize;
        self.batch_form.editor.scroll_to_cursor(visible_height);
        let visible_lines: Vec<Line> = self
            .batch_form
            .editor
            .lines()
            .iter()
            .skip(self.batch_form.editor.scroll)
            .take(visible_height)
            .map(|line| Line::from(line.as_str()))
            .collect();
        f.render_widget(Paragraph::new(visible_lines), inner);

        let selector_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(25); 4])
            .split(chunks[1]);
        for (i, chunk) in selector_chunks.iter().enumerate() {
            let style = if self.batch_form.focus == i + 1 {
                Style::default().fg(GOLD)
            } else {
                Style::default()
            };
            let selector = Paragraph::new(format!("< {} >", self.batch_form.defaults.label(i))).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(SELECTOR_TITLES[i])
                    .border_style(style),
            );
            f.render_widget(selector, *chunk);
        }

        let instructions = Paragraph::new(
            "Type to edit  Enter: new line  Tab: defaults  Left/Right: change default  Ctrl+S: add all  Esc: cancel",
        )
        .block(Block::default().borders(Borders::ALL).title("Instructions"))
        .alignment(Alignment::Center);
        f.render_widget(instructions, chunks[2]);

        if self.batch_form.editing_text() {
            let editor = &self.batch_form.editor;
            let y = editor.row.saturating_sub(editor.scroll);
            if y < visible_height {
                f.set_cursor_position((
                    inner.x + (editor.col as u16).min(inner.width),
                    inner.y + y as u16,
                ));
            }
        }
    }

    /// Render the settings dialog.
    fn render_settings(&mut self, f: &mut Frame, area: Rect) {
        let area = centered_rect(60, 30, area);
        f.render_widget(Clear, area);
        let checkbox = format_completed(self.settings_draft.close_to_tray);
        let text = vec![
            Line::from(""),
            Line::from(format!("{checkbox} Minimize to tray when closing")),
            Line::from(""),
            Line::from("Space: toggle  Enter: save  Esc: cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Settings"))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }

    /// Render the help screen with keyboard shortcuts.
    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled("To-Do Help", bold)),
            Line::from(""),
            Line::from(Span::styled("Task List:", bold)),
            Line::from("  Up/Down, k/j   Move selection"),
            Line::from("  Enter          View task details"),
            Line::from("  a              Add task"),
            Line::from("  b              Batch add tasks"),
            Line::from("  e              Edit selected task"),
            Line::from("  Space/c        Toggle done"),
            Line::from("  d              Delete selected task"),
            Line::from("  D              Delete all completed tasks"),
            Line::from("  o              Settings"),
            Line::from("  r              Reload"),
            Line::from("  h/F1           Show this help"),
            Line::from("  q/Esc          Close (minimizes to tray when enabled)"),
            Line::from("  Ctrl+C         Quit"),
            Line::from(""),
            Line::from(Span::styled("Ordering:", bold)),
            Line::from("  Urgent before Normal before Not Urgent; within each, Short before Mid before Long term."),
            Line::from("  Then open before done, newest first."),
        ];
        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help - Esc to return"))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render a confirmation dialog for destructive actions.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let description = self
            .confirm_action
            .as_ref()
            .map(ConfirmAction::describe)
            .unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(description),
            Line::from(""),
            Line::from("This action cannot be undone."),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            match self.state {
                AppState::TaskList => format!("Tasks: {} | Press 'h' for help", self.tasks.len()),
                AppState::TaskDetail => "Task Details".to_string(),
                AppState::AddTask => "Add New Task".to_string(),
                AppState::EditTask => "Edit Task".to_string(),
                AppState::BatchAdd => "Batch Add".to_string(),
                AppState::Settings => "Settings".to_string(),
                AppState::Help => "Help".to_string(),
                AppState::Confirm => "Confirm Action".to_string(),
            }
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(DARK_PURPLE).fg(text_on(DARK_PURPLE)))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        match self.state {
            AppState::TaskList => self.render_task_list(f, chunks[0]),
            AppState::TaskDetail => self.render_task_detail(f, chunks[0]),
            AppState::AddTask => self.render_task_form(f, chunks[0], false),
            AppState::EditTask => self.render_task_form(f, chunks[0], true),
            AppState::BatchAdd => self.render_batch(f, chunks[0]),
            AppState::Settings => {
                self.render_task_list(f, chunks[0]);
                self.render_settings(f, chunks[0]);
            }
            AppState::Help => self.render_help(f, chunks[0]),
            AppState::Confirm => {
                self.render_task_list(f, chunks[0]);
                self.render_confirm(f, chunks[0]);
            }
        }

        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop. Runs until the main view is closed or the user quits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<AppExit> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if let Some(exit) = self.handle_input()? {
                return Ok(exit);
            }
        }
    }
}
