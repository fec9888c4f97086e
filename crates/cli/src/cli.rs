use clap::{Args, Parser, Subcommand};
use rconsole_types::Locale;

#[derive(Debug, Parser)]
#[command(name = "rconsole", about = "Remote server administration console", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Backend base URL (overrides the config file)
    #[arg(long, env = "RCONSOLE_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Display language: en or es
    #[arg(long, global = true)]
    pub locale: Option<Locale>,

    #[arg(long, env = "RCONSOLE_EMAIL", global = true)]
    pub email: Option<String>,

    #[arg(long, env = "RCONSOLE_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Owner of custom subsets; defaults to the signed-in user
    #[arg(long, env = "RCONSOLE_USER", global = true)]
    pub user: Option<String>,

    /// Echo command requests instead of sending them
    #[arg(long, global = true)]
    pub dry_run: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse the command catalog
    Commands {
        #[command(subcommand)]
        action: CommandsAction,
    },
    /// Execute a catalog command
    Exec(ExecArgs),
    /// Manage command subsets
    Subsets {
        #[command(subcommand)]
        action: SubsetsAction,
    },
    /// Inspect server groups, servers and activity
    Servers {
        #[command(subcommand)]
        action: ServersAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum CommandsAction {
    /// List commands, optionally only those of a subset
    List {
        #[arg(long)]
        subset: Option<String>,
        /// Output raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show a command's parameters and constraints
    Show { id: String },
}

#[derive(Debug, Args)]
pub struct ExecArgs {
    /// Command id, e.g. vl_activate
    pub id: String,

    /// Parameter value as key=value; repeatable
    #[arg(short = 'p', long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Fill empty parameters from the configured defaults
    #[arg(long)]
    pub use_defaults: bool,
}

#[derive(Debug, Subcommand)]
pub enum SubsetsAction {
    List,
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated command ids
        #[arg(long, value_delimiter = ',', required = true)]
        commands: Vec<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_delimiter = ',')]
        commands: Option<Vec<String>>,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ServersAction {
    /// List server groups of an enterprise (default: the signed-in user's)
    Groups {
        #[arg(long)]
        enterprise: Option<String>,
    },
    /// List the servers of a group
    List { group: String },
    /// Show recent activity
    Logs,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["rconsole", "--locale", "es"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.locale, Some(Locale::Es));
    }

    #[test]
    fn exec_collects_repeated_params() {
        let cli = Cli::try_parse_from([
            "rconsole",
            "exec",
            "vl_activate",
            "-p",
            "licenseKey=AB=CD",
            "--param",
            "users=10",
            "--yes",
        ])
        .unwrap();
        let Some(Command::Exec(args)) = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(
            args.params,
            vec![("licenseKey".into(), "AB=CD".into()), ("users".into(), "10".into())]
        );
        assert!(args.yes);
    }

    #[test]
    fn malformed_params_are_rejected() {
        assert!(parse_key_value("users").is_err());
        assert!(parse_key_value("=10").is_err());
        assert_eq!(parse_key_value("comments="), Ok(("comments".into(), String::new())));
    }

    #[test]
    fn subset_commands_split_on_commas() {
        let cli = Cli::try_parse_from(["rconsole", "subsets", "create", "Mine", "--commands", "update,backup_data"]).unwrap();
        let Some(Command::Subsets {
            action: SubsetsAction::Create { commands, .. },
        }) = cli.command
        else {
            panic!("expected subsets create");
        };
        assert_eq!(commands, ["update", "backup_data"]);
    }
}
