//! Application state and key handling.
//!
//! `App` owns the execution controller plus the list/selection state of the
//! panels around it. Input arrives as [`Msg`]s; anything that needs the
//! runtime (network calls, quitting) goes back out as an [`Effect`].

use std::collections::HashMap;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use rconsole_engine::{
    Confirmation, ControlKind, ExecutionController, ExecutionPhase, ExecutionTicket, FieldEdit, FocusTarget, FormControl,
};
use rconsole_registry::{SubsetStore, all_subsets_for_user, predefined_subsets};
use rconsole_types::{CommandDefinition, CommandSubset, Locale};
use tracing::{debug, warn};

/// Panel that receives keys while no modal is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    Subsets,
    #[default]
    Commands,
    Form,
    Trigger,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Subsets => Self::Commands,
            Self::Commands => Self::Form,
            Self::Form => Self::Trigger,
            Self::Trigger => Self::Subsets,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Subsets => Self::Trigger,
            Self::Commands => Self::Subsets,
            Self::Form => Self::Commands,
            Self::Trigger => Self::Form,
        }
    }
}

#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    /// Periodic tick; advances the throbber while executing.
    Tick,
    ExecCompleted { attempt: u64, outcome: anyhow::Result<String> },
    /// The session could not be renewed.
    SessionExpired(String),
}

#[derive(Debug)]
pub enum Effect {
    Execute(ExecutionTicket),
    Quit,
}

/// Pick the string for `locale`.
pub(crate) fn tr(locale: Locale, en: &'static str, es: &'static str) -> &'static str {
    match locale {
        Locale::En => en,
        Locale::Es => es,
    }
}

pub struct App {
    pub controller: ExecutionController,
    pub user_label: String,
    store: Arc<dyn SubsetStore>,
    user_id: String,
    subsets: Vec<CommandSubset>,
    /// Row 0 is "all commands"; row `n` is `subsets[n - 1]`.
    pub subset_state: ListState,
    pub commands: Vec<Arc<CommandDefinition>>,
    pub command_state: ListState,
    pub focus: Focus,
    pub field_idx: usize,
    drafts: HashMap<String, String>,
    pub status: Option<String>,
    pub throbber_idx: usize,
    pub session_error: Option<String>,
}

impl App {
    pub fn new(
        controller: ExecutionController,
        store: Arc<dyn SubsetStore>,
        user_id: impl Into<String>,
        user_label: impl Into<String>,
    ) -> Self {
        let mut app = Self {
            controller,
            user_label: user_label.into(),
            store,
            user_id: user_id.into(),
            subsets: Vec::new(),
            subset_state: ListState::default().with_selected(Some(0)),
            commands: Vec::new(),
            command_state: ListState::default(),
            focus: Focus::default(),
            field_idx: 0,
            drafts: HashMap::new(),
            status: None,
            throbber_idx: 0,
            session_error: None,
        };
        app.reload_subsets();
        app.refresh_commands();
        app
    }

    pub fn locale(&self) -> Locale {
        self.controller.locale()
    }

    pub fn subsets(&self) -> &[CommandSubset] {
        &self.subsets
    }

    pub fn selected_subset(&self) -> Option<&CommandSubset> {
        match self.subset_state.selected() {
            Some(index) if index > 0 => self.subsets.get(index - 1),
            _ => None,
        }
    }

    pub fn highlighted_command(&self) -> Option<&Arc<CommandDefinition>> {
        self.command_state.selected().and_then(|index| self.commands.get(index))
    }

    /// Raw text being typed into a field, if the user started editing it.
    pub fn draft(&self, param_id: &str) -> Option<&str> {
        self.drafts.get(param_id).map(String::as_str)
    }

    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Tick => {
                if self.controller.is_executing() {
                    self.throbber_idx = (self.throbber_idx + 1) % 10;
                }
                Vec::new()
            }
            Msg::ExecCompleted { attempt, outcome } => {
                if !self.controller.finish(attempt, outcome) {
                    debug!(attempt, "late execution result dropped");
                }
                if matches!(self.controller.phase(), ExecutionPhase::Succeeded { .. }) {
                    self.drafts.clear();
                }
                Vec::new()
            }
            Msg::SessionExpired(reason) => {
                warn!(%reason, "session expired; leaving the console");
                self.session_error = Some(reason);
                vec![Effect::Quit]
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Effect::Quit];
        }
        match self.controller.phase() {
            ExecutionPhase::AwaitingConfirmation => self.handle_confirmation_key(key),
            ExecutionPhase::Executing { .. } => {
                if key.code == KeyCode::Esc {
                    self.controller.abandon();
                }
                Vec::new()
            }
            ExecutionPhase::Succeeded { .. } | ExecutionPhase::Failed { .. } => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                    self.acknowledge();
                }
                Vec::new()
            }
            ExecutionPhase::Idle => self.handle_panel_key(key),
        }
    }

    fn handle_confirmation_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('y' | 's') => match self.controller.confirm() {
                Ok(Confirmation::Dispatch(ticket)) => {
                    self.throbber_idx = 0;
                    vec![Effect::Execute(ticket)]
                }
                Ok(Confirmation::Rejected) => Vec::new(),
                Err(error) => {
                    self.status = Some(error.to_string());
                    Vec::new()
                }
            },
            KeyCode::Esc | KeyCode::Char('n') => {
                self.controller.cancel();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn acknowledge(&mut self) {
        if !self.controller.acknowledge() {
            return;
        }
        if self.controller.take_focus_request() == Some(FocusTarget::CommandSelector) {
            self.focus = Focus::Commands;
            self.field_idx = 0;
            self.drafts.clear();
        }
    }

    fn handle_panel_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return Vec::new();
            }
            KeyCode::F(2) => {
                self.toggle_locale();
                return Vec::new();
            }
            KeyCode::Char('q') if self.focus != Focus::Form => return vec![Effect::Quit],
            _ => {}
        }

        match self.focus {
            Focus::Subsets => self.handle_subset_key(key.code),
            Focus::Commands => self.handle_command_key(key.code),
            Focus::Form => match key.code {
                KeyCode::Up => self.field_idx = self.field_idx.saturating_sub(1),
                KeyCode::Down => {
                    let last = self.controller.form().len().saturating_sub(1);
                    self.field_idx = (self.field_idx + 1).min(last);
                }
                KeyCode::Enter => self.submit(),
                _ => self.edit_focused_field(key.code),
            },
            Focus::Trigger => {
                if key.code == KeyCode::Enter {
                    self.submit();
                }
            }
        }
        Vec::new()
    }

    fn handle_subset_key(&mut self, code: KeyCode) {
        let rows = self.subsets.len() + 1;
        let current = self.subset_state.selected().unwrap_or(0);
        let next = match code {
            KeyCode::Up => current.saturating_sub(1),
            KeyCode::Down => (current + 1).min(rows - 1),
            KeyCode::Enter => {
                self.focus = Focus::Commands;
                return;
            }
            _ => return,
        };
        if next == current {
            return;
        }
        self.subset_state.select(Some(next));
        self.refresh_commands();
        self.select_command(None);
    }

    fn handle_command_key(&mut self, code: KeyCode) {
        let len = self.commands.len();
        if len == 0 {
            return;
        }
        let current = self.command_state.selected().unwrap_or(0);
        match code {
            KeyCode::Up => self.command_state.select(Some(current.saturating_sub(1))),
            KeyCode::Down => self.command_state.select(Some((current + 1).min(len - 1))),
            KeyCode::Enter => {
                let Some(id) = self.highlighted_command().map(|command| command.id.clone()) else {
                    return;
                };
                self.select_command(Some(&id));
                let has_params = self.controller.command().is_some_and(|command| command.has_params());
                self.focus = if has_params { Focus::Form } else { Focus::Trigger };
            }
            _ => {}
        }
    }

    fn select_command(&mut self, id: Option<&str>) {
        self.drafts.clear();
        self.field_idx = 0;
        self.status = self.controller.select_command(id).err().map(|error| error.to_string());
    }

    fn submit(&mut self) {
        self.status = self.controller.submit().err().map(|error| error.to_string());
    }

    fn edit_focused_field(&mut self, code: KeyCode) {
        let form = self.controller.form();
        let Some(control) = form.get(self.field_idx) else {
            return;
        };
        let param_id = control.param_id.clone();

        let edit = match (&control.kind, code) {
            (_, KeyCode::Delete) => {
                self.drafts.remove(&param_id);
                FieldEdit::Clear
            }
            (ControlKind::Select { options, selected }, KeyCode::Left | KeyCode::Right) => {
                if options.is_empty() {
                    return;
                }
                let len = options.len();
                FieldEdit::Select(match (selected, code) {
                    (None, _) => 0,
                    (Some(index), KeyCode::Right) => (index + 1) % len,
                    (Some(index), _) => (index + len - 1) % len,
                })
            }
            (ControlKind::YesNo { value }, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) => {
                FieldEdit::SetBool(!value.unwrap_or(false))
            }
            (ControlKind::YesNo { .. }, KeyCode::Char('y' | 's')) => FieldEdit::SetBool(true),
            (ControlKind::YesNo { .. }, KeyCode::Char('n')) => FieldEdit::SetBool(false),
            (ControlKind::Number { .. } | ControlKind::Text { .. }, KeyCode::Char(c)) => {
                let draft = self.drafts.entry(param_id.clone()).or_insert_with(|| raw_text(control));
                draft.push(c);
                FieldEdit::Text(draft.clone())
            }
            (ControlKind::Number { .. } | ControlKind::Text { .. }, KeyCode::Backspace) => {
                let draft = self.drafts.entry(param_id.clone()).or_insert_with(|| raw_text(control));
                draft.pop();
                FieldEdit::Text(draft.clone())
            }
            _ => return,
        };
        self.status = self.controller.edit(&param_id, edit).err().map(|error| error.to_string());
    }

    fn toggle_locale(&mut self) {
        let next = match self.locale() {
            Locale::En => Locale::Es,
            Locale::Es => Locale::En,
        };
        let highlighted = self.highlighted_command().map(|command| command.id.clone());
        self.controller.set_locale(next);
        self.reload_subsets();
        self.refresh_commands();
        if let Some(id) = highlighted
            && let Some(index) = self.commands.iter().position(|command| command.id == id)
        {
            self.command_state.select(Some(index));
        }
    }

    fn reload_subsets(&mut self) {
        let locale = self.locale();
        self.subsets = all_subsets_for_user(self.store.as_ref(), &self.user_id, locale).unwrap_or_else(|error| {
            warn!(%error, user = %self.user_id, "custom subsets unavailable");
            predefined_subsets(locale)
        });
        let rows = self.subsets.len() + 1;
        if self.subset_state.selected().is_none_or(|index| index >= rows) {
            self.subset_state.select(Some(0));
        }
    }

    fn refresh_commands(&mut self) {
        let catalog = *self.controller.catalog();
        let locale = self.locale();
        self.commands = match self.selected_subset() {
            Some(subset) => catalog.filter_by_subset(subset, locale),
            None => catalog.list(locale),
        };
        self.command_state
            .select(if self.commands.is_empty() { None } else { Some(0) });
    }
}

fn raw_text(control: &FormControl) -> String {
    match &control.kind {
        ControlKind::Number { text } | ControlKind::Text { text, .. } => text.clone(),
        _ => String::new(),
    }
}
