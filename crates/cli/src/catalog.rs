//! `commands` and `exec`: browsing the catalog and running one command from
//! the shell through the same controller the TUI drives.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use rconsole_api::build_command_body;
use rconsole_engine::{CommandInvoker, ControllerError, ExecutionController, FieldEdit, HttpCommandInvoker, NoopInvoker};
use rconsole_registry::{CommandCatalog, JsonSubsetStore, find_subset};
use rconsole_types::{CommandDefinition, ExecutionResult, Locale, ParamKind, ParamValueMap, is_custom_subset_id};
use rconsole_util::{ConsoleConfig, redact_sensitive};
use serde_json::{Value, json};

use crate::cli::{Cli, CommandsAction, ExecArgs};
use crate::{connect, subset_owner};

pub async fn run_commands(cli: &Cli, config: &ConsoleConfig, action: CommandsAction) -> Result<()> {
    let catalog = CommandCatalog::new(config.locale);
    match action {
        CommandsAction::List { subset, json } => {
            let commands = match subset {
                Some(id) => {
                    let owner = if is_custom_subset_id(&id) { subset_owner(cli, config).await? } else { String::new() };
                    let store = JsonSubsetStore::with_defaults();
                    let subset = find_subset(&store, &owner, &id, config.locale)?
                        .with_context(|| format!("no subset named '{id}'"))?;
                    catalog.filter_by_subset(&subset, config.locale)
                }
                None => catalog.list(config.locale),
            };
            if json {
                let definitions: Vec<&CommandDefinition> = commands.iter().map(AsRef::as_ref).collect();
                println!("{}", serde_json::to_string_pretty(&definitions)?);
                return Ok(());
            }
            let width = commands.iter().map(|command| command.id.len()).max().unwrap_or(0);
            for command in &commands {
                println!(
                    "{:<width$}  {:<6}  {}",
                    command.id, command.invocation.method, command.name
                );
            }
        }
        CommandsAction::Show { id } => {
            let command = catalog.get(&id).with_context(|| format!("unknown command '{id}'"))?;
            print!("{}", describe_command(&command));
        }
    }
    Ok(())
}

pub async fn run_exec(cli: &Cli, config: &ConsoleConfig, args: ExecArgs) -> Result<()> {
    let locale = config.locale;
    let mut controller = ExecutionController::new(CommandCatalog::new(locale));
    controller
        .select_command(Some(args.id.as_str()))
        .with_context(|| format!("unknown command '{}'", args.id))?;
    let command = controller.command().cloned().context("no command selected")?;

    for (key, value) in &args.params {
        controller
            .edit(key, FieldEdit::Text(value.clone()))
            .with_context(|| format!("invalid value for '{key}'"))?;
    }
    if args.use_defaults {
        for param in &command.params {
            if controller.values().has_value(&param.id) {
                continue;
            }
            if let Some(value) = config.prefill_for(&param.id, &param.kind) {
                controller.edit(&param.id, FieldEdit::Text(value.to_string()))?;
            }
        }
    }

    match controller.submit() {
        Ok(()) => {}
        Err(ControllerError::GateClosed) => {
            for (field, message) in controller.visible_errors() {
                eprintln!("  {field}: {message}");
            }
            bail!("{} cannot run with these parameters", command.id);
        }
        Err(error) => return Err(error.into()),
    }

    let preview = request_preview(&command, controller.values());
    println!("{}", redact_sensitive(&serde_json::to_string_pretty(&preview)?));

    if !args.yes && !ask_confirmation(&command, locale).await? {
        controller.cancel();
        eprintln!("{}", tr(locale, "Cancelled.", "Cancelado."));
        return Ok(());
    }

    let invoker: Box<dyn CommandInvoker> = if cli.dry_run {
        Box::new(NoopInvoker)
    } else {
        let (client, _) = connect(cli, config).await?;
        Box::new(HttpCommandInvoker::new(client))
    };

    match controller.execute(invoker.as_ref()).await? {
        ExecutionResult::Success {
            command_label,
            response,
        } => {
            println!("{command_label}");
            if !response.is_empty() {
                println!("{response}");
            }
            Ok(())
        }
        ExecutionResult::Failure { message } => bail!("{message}"),
    }
}

/// The request the command would send, without credentials.
fn request_preview(command: &CommandDefinition, values: &ParamValueMap) -> Value {
    let body = build_command_body(&command.invocation, &values.positional_args(command));
    json!({
        "method": command.invocation.method.as_str(),
        "path": command.invocation.path,
        "body": body,
    })
}

async fn ask_confirmation(command: &CommandDefinition, locale: Locale) -> Result<bool> {
    print!("{} '{}'? [y/N] ", tr(locale, "Run", "¿Ejecutar"), command.name);
    io::stdout().flush()?;
    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().read_line(&mut line).map(|_| line)
    })
    .await??;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

fn tr(locale: Locale, en: &'static str, es: &'static str) -> &'static str {
    match locale {
        Locale::En => en,
        Locale::Es => es,
    }
}

fn describe_command(command: &CommandDefinition) -> String {
    let mut out = format!(
        "{} ({})\n{}\n{} {}\n",
        command.name, command.id, command.description, command.invocation.method, command.invocation.path
    );
    if !command.has_params() {
        return out;
    }
    out.push_str("\nParameters:\n");
    for param in &command.params {
        let requirement = if param.optional { "optional" } else { "required" };
        out.push_str(&format!("  {:<16} {:<11} {:<8} {}", param.id, param.kind.label(), requirement, param.name));
        if let ParamKind::Enumeration(options) = &param.kind {
            let ids: Vec<&str> = options.iter().map(|option| option.id.as_str()).collect();
            out.push_str(&format!(" [{}]", ids.join("|")));
        }
        if let Some(constraint) = command.schema.as_ref().and_then(|schema| schema.fields.get(&param.id)) {
            if let (Some(min), Some(max)) = (constraint.min_length, constraint.max_length) {
                out.push_str(&format!(" (length {min}..{max})"));
            }
            if let (Some(min), Some(max)) = (constraint.min, constraint.max) {
                out.push_str(&format!(" (range {min}..{max})"));
            }
        }
        out.push('\n');
    }
    out
}
