//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` used to create and edit a single task and
//! the `BatchForm` used to add many tasks with one shared set of attributes.

use crate::{
    fields::{Attributes, Category, Duration, Priority, Urgency},
    task::Task,
    tui::{
        input::{InputField, TextArea},
        utils::cycle,
    },
};

/// Global order constants for task editing view fields.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;
pub const CATEGORY_GLOBAL_ORDER: usize = 2;
pub const PRIORITY_GLOBAL_ORDER: usize = 3;
pub const URGENCY_GLOBAL_ORDER: usize = 4;
pub const DURATION_GLOBAL_ORDER: usize = 5;

/// Index positions of the four attribute selectors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttributeSelectors {
    pub category: usize,
    pub priority: usize,
    pub urgency: usize,
    pub duration: usize,
}

impl AttributeSelectors {
    pub fn from_attributes(attrs: Attributes) -> Self {
        Self {
            category: Category::ALL.iter().position(|&c| c == attrs.category).unwrap_or(0),
            priority: Priority::ALL.iter().position(|&p| p == attrs.priority).unwrap_or(0),
            urgency: Urgency::ALL.iter().position(|&u| u == attrs.urgency).unwrap_or(0),
            duration: Duration::ALL.iter().position(|&d| d == attrs.duration).unwrap_or(1),
        }
    }

    pub fn attributes(&self) -> Attributes {
        Attributes {
            category: Category::ALL[self.category],
            priority: Priority::ALL[self.priority],
            urgency: Urgency::ALL[self.urgency],
            duration: Duration::ALL[self.duration],
        }
    }

    /// Cycle selector `which` (0 = category … 3 = duration).
    pub fn step(&mut self, which: usize, forward: bool) {
        match which {
            0 => self.category = cycle(self.category, Category::ALL.len(), forward),
            1 => self.priority = cycle(self.priority, Priority::ALL.len(), forward),
            2 => self.urgency = cycle(self.urgency, Urgency::ALL.len(), forward),
            3 => self.duration = cycle(self.duration, Duration::ALL.len(), forward),
            _ => {}
        }
    }

    /// Display label of selector `which`.
    pub fn label(&self, which: usize) -> &'static str {
        let attrs = self.attributes();
        match which {
            0 => attrs.category.label(),
            1 => attrs.priority.label(),
            2 => attrs.urgency.label(),
            _ => attrs.duration.label(),
        }
    }
}

/// Task form for editing fields
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub selectors: AttributeSelectors,
    pub current_field: usize,
}

impl TaskForm {
    /// Create an empty form with default attributes.
    pub fn new() -> Self {
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            selectors: AttributeSelectors::from_attributes(Attributes::default()),
            current_field: TITLE_GLOBAL_ORDER,
        };
        form.update_active_field();
        form
    }

    /// Create a task form populated from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = Self::new();
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(&task.description);
        form.selectors = AttributeSelectors::from_attributes(task.attributes());
        form.update_active_field();
        form
    }

    pub fn attributes(&self) -> Attributes {
        self.selectors.attributes()
    }

    /// Get the total number of fields (input fields + selectors).
    pub fn field_count(&self) -> usize {
        6
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = cycle(self.current_field, self.field_count(), true);
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = cycle(self.current_field, self.field_count(), false);
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_GLOBAL_ORDER;
        self.description.active = self.current_field == DESCRIPTION_GLOBAL_ORDER;
    }

    /// Text field under the cursor, if the current field is not a selector.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            TITLE_GLOBAL_ORDER => Some(&mut self.title),
            DESCRIPTION_GLOBAL_ORDER => Some(&mut self.description),
            _ => None,
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        if let Some(field) = self.active_input() {
            field.handle_char(c);
        }
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(field) = self.active_input() {
            field.handle_delete();
        }
    }

    /// Handle left/right arrow keys for cursor movement or selector changes.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.current_field {
            TITLE_GLOBAL_ORDER | DESCRIPTION_GLOBAL_ORDER => {
                if let Some(field) = self.active_input() {
                    if right {
                        field.move_cursor_right();
                    } else {
                        field.move_cursor_left();
                    }
                }
            }
            selector => self.selectors.step(selector - CATEGORY_GLOBAL_ORDER, right),
        }
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Focus positions inside the batch form: the editor, then the four selectors.
pub const BATCH_EDITOR_FOCUS: usize = 0;
pub const BATCH_FOCUS_COUNT: usize = 5;

/// Batch-add form: one `title|description` per line plus shared attributes.
pub struct BatchForm {
    pub editor: TextArea,
    pub defaults: AttributeSelectors,
    pub focus: usize,
}

impl BatchForm {
    pub fn new() -> Self {
        Self {
            editor: TextArea::new(),
            defaults: AttributeSelectors::from_attributes(Attributes::default()),
            focus: BATCH_EDITOR_FOCUS,
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = cycle(self.focus, BATCH_FOCUS_COUNT, true);
    }

    pub fn prev_focus(&mut self) {
        self.focus = cycle(self.focus, BATCH_FOCUS_COUNT, false);
    }

    pub fn editing_text(&self) -> bool {
        self.focus == BATCH_EDITOR_FOCUS
    }

    /// Change the focused selector; no-op while the editor has focus.
    pub fn step_selector(&mut self, forward: bool) {
        if !self.editing_text() {
            self.defaults.step(self.focus - 1, forward);
        }
    }
}

impl Default for BatchForm {
    fn default() -> Self {
        Self::new()
    }
}
