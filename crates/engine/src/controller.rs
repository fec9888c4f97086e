//! The execution controller.
//!
//! Owns the selected command, its parameter values and the execution phase:
//!
//! ```text
//! Idle -> AwaitingConfirmation -> Executing -> Succeeded | Failed -> Idle
//!              |  cancel                |  abandon
//!              +-> Idle                 +-> Idle
//! ```
//!
//! The controller performs no I/O itself. [`ExecutionController::confirm`]
//! hands out an [`ExecutionTicket`] and the caller reports the outcome back
//! with [`ExecutionController::finish`]; outcomes for an attempt other than
//! the one currently executing are dropped.

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use rconsole_registry::CommandCatalog;
use rconsole_types::{
    CommandDefinition, CommandResponse, ExecutionResult, Locale, ParamError, ParamKind, ParamValue, ParamValueMap,
    ParameterSpec,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::form::{FieldEdit, FormControl, build_form};
use crate::invoker::CommandInvoker;
use crate::messages::Message;
use crate::validation::{check_path_heuristic, execution_allowed, validate_values};

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionPhase {
    Idle,
    AwaitingConfirmation,
    Executing { attempt: u64 },
    Succeeded { command_label: String, response: String },
    Failed { message: String },
}

impl ExecutionPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingConfirmation => "awaiting confirmation",
            Self::Executing { .. } => "executing",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_executing(&self) -> bool {
        matches!(self, Self::Executing { .. })
    }

    /// The result awaiting acknowledgement, if any.
    pub fn result(&self) -> Option<ExecutionResult> {
        match self {
            Self::Succeeded { command_label, response } => Some(ExecutionResult::Success {
                command_label: command_label.clone(),
                response: response.clone(),
            }),
            Self::Failed { message } => Some(ExecutionResult::Failure {
                message: message.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    CommandSelector,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error("no command selected")]
    NoCommand,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("a command is already executing")]
    Busy,
    #[error("cannot {action} while {phase}")]
    WrongPhase { action: &'static str, phase: &'static str },
    #[error("required parameters are missing or invalid")]
    GateClosed,
    #[error(transparent)]
    Param(#[from] ParamError),
    #[error("parameter '{param}' does not accept {edit}")]
    UnsupportedEdit { param: String, edit: &'static str },
    #[error("'{value}' is not a valid choice for '{param}'")]
    InvalidChoice { param: String, value: String },
}

/// A dispatched execution. `args` follow the command's declared parameter order.
#[derive(Debug, Clone)]
pub struct ExecutionTicket {
    pub attempt: u64,
    pub command: Arc<CommandDefinition>,
    pub args: Vec<Option<ParamValue>>,
}

#[derive(Debug)]
pub enum Confirmation {
    Dispatch(ExecutionTicket),
    /// Rejected before any network call; the phase is now `Failed`.
    Rejected,
}

#[derive(Debug)]
pub struct ExecutionController {
    catalog: CommandCatalog,
    command: Option<Arc<CommandDefinition>>,
    values: ParamValueMap,
    errors: IndexMap<String, String>,
    touched: HashSet<String>,
    phase: ExecutionPhase,
    attempt: u64,
    focus_request: Option<FocusTarget>,
}

impl ExecutionController {
    pub fn new(catalog: CommandCatalog) -> Self {
        Self {
            catalog,
            command: None,
            values: ParamValueMap::new(),
            errors: IndexMap::new(),
            touched: HashSet::new(),
            phase: ExecutionPhase::Idle,
            attempt: 0,
            focus_request: None,
        }
    }

    pub fn locale(&self) -> Locale {
        self.catalog.locale()
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    pub fn command(&self) -> Option<&Arc<CommandDefinition>> {
        self.command.as_ref()
    }

    pub fn values(&self) -> &ParamValueMap {
        &self.values
    }

    pub fn phase(&self) -> &ExecutionPhase {
        &self.phase
    }

    /// Every current validation error, touched or not.
    pub fn errors(&self) -> &IndexMap<String, String> {
        &self.errors
    }

    /// Errors for fields the user has edited (or all after a refused submit).
    pub fn visible_errors(&self) -> IndexMap<String, String> {
        self.errors
            .iter()
            .filter(|(field, _)| self.touched.contains(*field))
            .map(|(field, message)| (field.clone(), message.clone()))
            .collect()
    }

    pub fn form(&self) -> Vec<FormControl> {
        build_form(self.command.as_deref(), &self.values, &self.visible_errors())
    }

    pub fn is_executing(&self) -> bool {
        self.phase.is_executing()
    }

    /// Whether the execute trigger is enabled.
    pub fn can_execute(&self) -> bool {
        execution_allowed(self.command.as_deref(), &self.values, self.errors.is_empty(), self.is_executing())
    }

    /// One-shot focus hint for the view, set when a success is acknowledged.
    pub fn take_focus_request(&mut self) -> Option<FocusTarget> {
        self.focus_request.take()
    }

    /// Switch display language; the selected command and values are kept.
    pub fn set_locale(&mut self, locale: Locale) {
        self.catalog = CommandCatalog::new(locale);
        if let Some(current) = &self.command {
            self.command = self.catalog.get(&current.id);
        }
        self.revalidate();
    }

    /// Select a command (or none), discarding all entered values.
    pub fn select_command(&mut self, id: Option<&str>) -> Result<(), ControllerError> {
        if self.is_executing() {
            return Err(ControllerError::Busy);
        }
        let command = match id {
            Some(id) => Some(
                self.catalog
                    .get(id)
                    .ok_or_else(|| ControllerError::UnknownCommand(id.to_string()))?,
            ),
            None => None,
        };
        if self.phase == ExecutionPhase::AwaitingConfirmation {
            self.phase = ExecutionPhase::Idle;
        }
        debug!(command = ?id, "command selected");
        self.command = command;
        self.values.clear();
        self.touched.clear();
        self.revalidate();
        Ok(())
    }

    pub fn edit(&mut self, param_id: &str, edit: FieldEdit) -> Result<(), ControllerError> {
        let command = self.command.clone().ok_or(ControllerError::NoCommand)?;
        self.require_idle("edit")?;
        let param = command.param(param_id).ok_or_else(|| ParamError::UnknownParameter {
            command: command.id.clone(),
            param: param_id.to_string(),
        })?;

        match convert_edit(param, edit)? {
            Some(value) => self.values.set(&command, param_id, value)?,
            None => {
                self.values.remove(param_id);
            }
        }
        self.touched.insert(param_id.to_string());
        self.revalidate();
        Ok(())
    }

    /// Request confirmation. Refused, with every error made visible, while the
    /// gate is closed.
    pub fn submit(&mut self) -> Result<(), ControllerError> {
        self.require_idle("submit")?;
        let Some(command) = &self.command else {
            return Err(ControllerError::NoCommand);
        };
        if !self.can_execute() {
            self.touched.extend(command.params.iter().map(|param| param.id.clone()));
            return Err(ControllerError::GateClosed);
        }
        self.phase = ExecutionPhase::AwaitingConfirmation;
        Ok(())
    }

    /// Dismiss the confirmation prompt. Returns whether anything changed.
    pub fn cancel(&mut self) -> bool {
        if self.phase != ExecutionPhase::AwaitingConfirmation {
            return false;
        }
        self.phase = ExecutionPhase::Idle;
        true
    }

    pub fn confirm(&mut self) -> Result<Confirmation, ControllerError> {
        if self.phase != ExecutionPhase::AwaitingConfirmation {
            return Err(ControllerError::WrongPhase {
                action: "confirm",
                phase: self.phase.name(),
            });
        }
        let command = self.command.clone().ok_or(ControllerError::NoCommand)?;

        if let Err(rejection) = check_path_heuristic(&self.values) {
            warn!(command = %command.id, param = %rejection.param, "path parameter rejected before dispatch");
            self.phase = ExecutionPhase::Failed {
                message: Message::InvalidPath.render(self.locale()),
            };
            return Ok(Confirmation::Rejected);
        }

        self.attempt += 1;
        self.phase = ExecutionPhase::Executing { attempt: self.attempt };
        info!(command = %command.id, attempt = self.attempt, "command dispatched");
        let args = self.values.positional_args(&command);
        Ok(Confirmation::Dispatch(ExecutionTicket {
            attempt: self.attempt,
            command,
            args,
        }))
    }

    /// Record the outcome of `attempt`. Returns `false` when the attempt is no
    /// longer the one executing and the outcome was dropped.
    pub fn finish(&mut self, attempt: u64, outcome: anyhow::Result<String>) -> bool {
        if self.phase != (ExecutionPhase::Executing { attempt }) {
            debug!(attempt, phase = self.phase.name(), "stale command result ignored");
            return false;
        }
        let locale = self.locale();
        let command_id = self.command.as_ref().map(|command| command.id.clone()).unwrap_or_default();

        self.phase = match outcome {
            Ok(raw) => match CommandResponse::from_raw(&raw) {
                Ok(response) if response.success => {
                    info!(command = %command_id, attempt, "command succeeded");
                    self.values.clear();
                    self.touched.clear();
                    self.revalidate();
                    ExecutionPhase::Succeeded {
                        command_label: response
                            .command
                            .filter(|label| !label.trim().is_empty())
                            .unwrap_or_else(|| Message::CommandSucceeded.render(locale)),
                        response: response.response.unwrap_or_default(),
                    }
                }
                Ok(response) => {
                    info!(command = %command_id, attempt, "command reported failure");
                    ExecutionPhase::Failed {
                        message: response
                            .error
                            .filter(|message| !message.trim().is_empty())
                            .unwrap_or_else(|| Message::UnknownError.render(locale)),
                    }
                }
                Err(decode_error) => {
                    warn!(command = %command_id, error = %decode_error, "command response could not be decoded");
                    ExecutionPhase::Failed {
                        message: Message::UnreadableResponse.render(locale),
                    }
                }
            },
            Err(invoke_error) => {
                error!(command = %command_id, attempt, error = %invoke_error, "command invocation failed");
                ExecutionPhase::Failed {
                    message: invoke_error.to_string(),
                }
            }
        };
        true
    }

    /// Stop waiting for the running attempt. The request itself keeps going;
    /// its result will be ignored.
    pub fn abandon(&mut self) -> bool {
        let ExecutionPhase::Executing { attempt } = self.phase else {
            return false;
        };
        info!(attempt, "execution abandoned");
        self.phase = ExecutionPhase::Idle;
        true
    }

    /// Close the result. A success also clears the selection.
    pub fn acknowledge(&mut self) -> bool {
        match self.phase {
            ExecutionPhase::Succeeded { .. } => {
                self.phase = ExecutionPhase::Idle;
                self.command = None;
                self.values.clear();
                self.touched.clear();
                self.revalidate();
                self.focus_request = Some(FocusTarget::CommandSelector);
                true
            }
            ExecutionPhase::Failed { .. } => {
                self.phase = ExecutionPhase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Confirm, invoke and record the outcome in one call.
    pub async fn execute(&mut self, invoker: &dyn CommandInvoker) -> Result<ExecutionResult, ControllerError> {
        if let Confirmation::Dispatch(ticket) = self.confirm()? {
            let outcome = invoker.invoke(&ticket.command, &ticket.args).await;
            self.finish(ticket.attempt, outcome);
        }
        Ok(self.phase.result().unwrap_or_else(|| ExecutionResult::Failure {
            message: Message::UnknownError.render(self.locale()),
        }))
    }

    fn require_idle(&self, action: &'static str) -> Result<(), ControllerError> {
        match self.phase {
            ExecutionPhase::Idle => Ok(()),
            ExecutionPhase::Executing { .. } => Err(ControllerError::Busy),
            _ => Err(ControllerError::WrongPhase {
                action,
                phase: self.phase.name(),
            }),
        }
    }

    fn revalidate(&mut self) {
        let Some(command) = &self.command else {
            self.errors.clear();
            return;
        };
        let locale = self.locale();
        let mut report = validate_values(command.schema.as_ref(), &self.values, locale);

        let mut errors = IndexMap::new();
        for param in &command.params {
            let message = report.errors.shift_remove(&param.id).or_else(|| {
                if !param.optional && !self.values.has_value(&param.id) {
                    Some(Message::Required.render(locale))
                } else if unparsed_number(param, self.values.get(&param.id)) {
                    Some(Message::ExpectedNumber.render(locale))
                } else {
                    None
                }
            });
            if let Some(message) = message {
                errors.insert(param.id.clone(), message);
            }
        }
        self.errors = errors;
    }
}

fn unparsed_number(param: &ParameterSpec, value: Option<&ParamValue>) -> bool {
    matches!(param.kind, ParamKind::Number) && value.and_then(ParamValue::as_text).is_some_and(|text| !text.is_empty())
}

fn convert_edit(param: &ParameterSpec, edit: FieldEdit) -> Result<Option<ParamValue>, ControllerError> {
    let unsupported = |edit: &'static str| ControllerError::UnsupportedEdit {
        param: param.id.clone(),
        edit,
    };
    let invalid = |value: String| ControllerError::InvalidChoice {
        param: param.id.clone(),
        value,
    };

    match (edit, &param.kind) {
        (FieldEdit::Clear, _) => Ok(None),
        (FieldEdit::Text(text), _) if text.trim().is_empty() => Ok(None),
        (FieldEdit::Text(text), ParamKind::Number) => {
            let trimmed = text.trim();
            Ok(Some(match trimmed.parse::<f64>() {
                Ok(number) if number.is_finite() => ParamValue::Number(number),
                _ => ParamValue::Text(trimmed.to_string()),
            }))
        }
        (FieldEdit::Text(text), ParamKind::Boolean) => parse_yes_no(&text)
            .map(|flag| Some(ParamValue::Bool(flag)))
            .ok_or_else(|| invalid(text)),
        (FieldEdit::Text(text), ParamKind::Enumeration(options)) => options
            .iter()
            .find(|option| option.id == text.trim() || option.value.eq_ignore_ascii_case(text.trim()))
            .map(|option| Some(ParamValue::Text(option.id.clone())))
            .ok_or_else(|| invalid(text)),
        (FieldEdit::Text(text), ParamKind::Text | ParamKind::Secret) => Ok(Some(ParamValue::Text(text))),
        (FieldEdit::Select(index), ParamKind::Enumeration(options)) => options
            .get(index)
            .map(|option| Some(ParamValue::Text(option.id.clone())))
            .ok_or_else(|| invalid(index.to_string())),
        (FieldEdit::Select(_), _) => Err(unsupported("a selection")),
        (FieldEdit::SetBool(flag), ParamKind::Boolean) => Ok(Some(ParamValue::Bool(flag))),
        (FieldEdit::SetBool(_), _) => Err(unsupported("yes/no")),
    }
}

fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "s" | "si" | "sí" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct ScriptedInvoker {
        reply: Result<String, String>,
        calls: Mutex<Vec<(String, Vec<Option<ParamValue>>)>>,
    }

    impl ScriptedInvoker {
        fn replying(reply: Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, Vec<Option<ParamValue>>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandInvoker for ScriptedInvoker {
        async fn invoke(&self, command: &CommandDefinition, args: &[Option<ParamValue>]) -> anyhow::Result<String> {
            self.calls.lock().unwrap().push((command.id.clone(), args.to_vec()));
            self.reply.clone().map_err(anyhow::Error::msg)
        }
    }

    fn controller() -> ExecutionController {
        ExecutionController::new(CommandCatalog::new(Locale::En))
    }

    fn fill_volume_install(controller: &mut ExecutionController) {
        controller.select_command(Some("vl_activate")).unwrap();
        controller.edit("licenseKey", FieldEdit::Text("ABCDE-12345".into())).unwrap();
        controller.edit("users", FieldEdit::Text("10".into())).unwrap();
        controller.edit("edition", FieldEdit::Select(0)).unwrap();
        controller.edit("supportYears", FieldEdit::Text("2".into())).unwrap();
    }

    #[test]
    fn parameterless_command_is_executable_once_selected() {
        let mut controller = controller();
        assert!(!controller.can_execute());
        controller.select_command(Some("update")).unwrap();
        assert!(controller.can_execute());
        assert!(controller.form().is_empty());
    }

    #[test]
    fn empty_required_parameter_keeps_gate_closed() {
        let mut controller = controller();
        controller.select_command(Some("vl_activate")).unwrap();
        controller.edit("licenseKey", FieldEdit::Text("K".into())).unwrap();
        controller.edit("users", FieldEdit::Text("10".into())).unwrap();
        controller.edit("supportYears", FieldEdit::Text("1".into())).unwrap();
        assert!(!controller.can_execute());
        assert!(controller.visible_errors().get("edition").is_none());

        assert_eq!(controller.submit(), Err(ControllerError::GateClosed));
        assert_eq!(controller.phase(), &ExecutionPhase::Idle);
        assert_eq!(
            controller.visible_errors().get("edition").map(String::as_str),
            Some("This field is required")
        );
    }

    #[test]
    fn numbers_parse_and_bad_numbers_are_flagged() {
        let mut controller = controller();
        fill_volume_install(&mut controller);
        assert_eq!(controller.values().get("users"), Some(&ParamValue::Number(10.0)));
        assert!(controller.can_execute());

        controller.edit("users", FieldEdit::Text("ten".into())).unwrap();
        assert_eq!(controller.errors().get("users").map(String::as_str), Some("Must be a number"));
        assert!(!controller.can_execute());

        controller.edit("users", FieldEdit::Text("".into())).unwrap();
        assert!(controller.values().get("users").is_none());
    }

    #[test]
    fn switching_command_clears_values() {
        let mut controller = controller();
        fill_volume_install(&mut controller);
        controller.select_command(Some("vl_enable")).unwrap();
        assert!(controller.values().is_empty());
        assert!(controller.visible_errors().is_empty());
        assert!(!controller.can_execute());
    }

    #[test]
    fn edits_are_checked_against_the_parameter() {
        let mut controller = controller();
        assert_eq!(
            controller.edit("licenseKey", FieldEdit::Text("K".into())),
            Err(ControllerError::NoCommand)
        );
        controller.select_command(Some("backup_data")).unwrap();
        assert!(matches!(
            controller.edit("nope", FieldEdit::Clear),
            Err(ControllerError::Param(ParamError::UnknownParameter { .. }))
        ));
        assert!(matches!(
            controller.edit("optionalPath", FieldEdit::SetBool(true)),
            Err(ControllerError::UnsupportedEdit { .. })
        ));
        controller.edit("silent", FieldEdit::Text("sí".into())).unwrap();
        assert_eq!(controller.values().get("silent"), Some(&ParamValue::Bool(true)));
        assert!(matches!(
            controller.select_command(Some("missing")),
            Err(ControllerError::UnknownCommand(_))
        ));
    }

    #[test]
    fn cancel_returns_to_idle_without_side_effects() {
        let mut controller = controller();
        controller.select_command(Some("update")).unwrap();
        controller.submit().unwrap();
        assert!(controller.cancel());
        assert_eq!(controller.phase(), &ExecutionPhase::Idle);
        assert!(!controller.cancel());
        assert_eq!(controller.command().map(|command| command.id.as_str()), Some("update"));
    }

    #[tokio::test]
    async fn success_clears_values_and_acknowledge_resets_selection() {
        let mut controller = controller();
        fill_volume_install(&mut controller);
        controller.submit().unwrap();

        let invoker = ScriptedInvoker::replying(Ok(r#"{"success":true,"command":"vl_activate","response":"installed"}"#));
        let result = controller.execute(&invoker).await.unwrap();
        assert_eq!(
            result,
            ExecutionResult::Success {
                command_label: "vl_activate".into(),
                response: "installed".into()
            }
        );
        assert_eq!(
            invoker.calls(),
            vec![(
                "vl_activate".to_string(),
                vec![
                    Some(ParamValue::Text("ABCDE-12345".into())),
                    Some(ParamValue::Number(10.0)),
                    Some(ParamValue::Text("Enterprise".into())),
                    Some(ParamValue::Number(2.0)),
                    None,
                ]
            )]
        );
        assert!(controller.values().is_empty());

        assert!(controller.acknowledge());
        assert!(controller.command().is_none());
        assert_eq!(controller.take_focus_request(), Some(FocusTarget::CommandSelector));
        assert!(!controller.acknowledge());
        assert_eq!(controller.take_focus_request(), None);
    }

    #[tokio::test]
    async fn success_without_label_uses_generic_message() {
        let mut controller = ExecutionController::new(CommandCatalog::new(Locale::Es));
        controller.select_command(Some("update")).unwrap();
        controller.submit().unwrap();
        let invoker = ScriptedInvoker::replying(Ok(r#""{\"success\":true}""#));
        let result = controller.execute(&invoker).await.unwrap();
        assert_eq!(
            result,
            ExecutionResult::Success {
                command_label: "Comando ejecutado correctamente".into(),
                response: String::new()
            }
        );
    }

    #[tokio::test]
    async fn backend_failure_keeps_values_for_retry() {
        let mut controller = controller();
        fill_volume_install(&mut controller);
        controller.submit().unwrap();

        let invoker = ScriptedInvoker::replying(Ok(r#"{"success":false,"error":"license rejected"}"#));
        let result = controller.execute(&invoker).await.unwrap();
        assert_eq!(
            result,
            ExecutionResult::Failure {
                message: "license rejected".into()
            }
        );
        assert!(controller.acknowledge());
        assert_eq!(controller.values().len(), 4);
        assert!(controller.can_execute());
    }

    #[tokio::test]
    async fn unreadable_payloads_and_invocation_errors_fail() {
        let mut controller = controller();
        controller.select_command(Some("update")).unwrap();

        controller.submit().unwrap();
        let garbage = ScriptedInvoker::replying(Ok("<html>"));
        assert_eq!(
            controller.execute(&garbage).await.unwrap(),
            ExecutionResult::Failure {
                message: "The server returned an unreadable response".into()
            }
        );
        controller.acknowledge();

        controller.submit().unwrap();
        let failing = ScriptedInvoker::replying(Err("connection refused"));
        assert_eq!(
            controller.execute(&failing).await.unwrap(),
            ExecutionResult::Failure {
                message: "connection refused".into()
            }
        );

        let failing_bare = ScriptedInvoker::replying(Ok(r#"{"success":false}"#));
        controller.acknowledge();
        controller.submit().unwrap();
        assert_eq!(
            controller.execute(&failing_bare).await.unwrap(),
            ExecutionResult::Failure {
                message: "Unknown error".into()
            }
        );
    }

    #[tokio::test]
    async fn unix_path_fails_without_invoking() {
        let mut controller = controller();
        controller.select_command(Some("restore_data")).unwrap();
        controller.edit("restorePath", FieldEdit::Text("/etc/passwd".into())).unwrap();
        controller.submit().unwrap();

        let invoker = ScriptedInvoker::replying(Ok(r#"{"success":true}"#));
        let result = controller.execute(&invoker).await.unwrap();
        assert!(matches!(result, ExecutionResult::Failure { ref message } if message.starts_with("The path is not valid")));
        assert!(invoker.calls().is_empty());
    }

    #[test]
    fn stale_results_are_ignored() {
        let mut controller = controller();
        controller.select_command(Some("update")).unwrap();
        controller.submit().unwrap();
        let Confirmation::Dispatch(first) = controller.confirm().unwrap() else {
            panic!("expected dispatch");
        };
        assert_eq!(controller.select_command(Some("vl_enable")), Err(ControllerError::Busy));
        assert_eq!(controller.submit(), Err(ControllerError::Busy));

        assert!(controller.abandon());
        assert!(!controller.finish(first.attempt, Ok(r#"{"success":true}"#.into())));
        assert_eq!(controller.phase(), &ExecutionPhase::Idle);

        controller.submit().unwrap();
        let Confirmation::Dispatch(second) = controller.confirm().unwrap() else {
            panic!("expected dispatch");
        };
        assert_eq!(second.attempt, first.attempt + 1);
        assert!(!controller.finish(first.attempt, Ok(r#"{"success":false}"#.into())));
        assert!(controller.finish(second.attempt, Ok(r#"{"success":true,"command":"update"}"#.into())));
        assert!(controller.phase().result().is_some_and(|result| result.is_success()));
    }

    #[test]
    fn confirm_requires_a_pending_confirmation() {
        let mut controller = controller();
        controller.select_command(Some("update")).unwrap();
        assert!(matches!(
            controller.confirm(),
            Err(ControllerError::WrongPhase { action: "confirm", .. })
        ));
    }

    #[test]
    fn locale_switch_relabels_selected_command() {
        let mut controller = controller();
        controller.select_command(Some("vl_activate")).unwrap();
        controller.edit("licenseKey", FieldEdit::Text("K".into())).unwrap();
        controller.set_locale(Locale::Es);
        assert_eq!(
            controller.command().map(|command| command.name.as_str()),
            Some("Instalar servidor de licencias por volumen")
        );
        assert_eq!(controller.values().len(), 1);
    }
}
