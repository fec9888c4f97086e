//! `subsets` and `servers` subcommands.

use anyhow::{Result, bail};
use rconsole_registry::{CommandCatalog, JsonSubsetStore, SubsetStore, all_subsets_for_user};
use rconsole_types::{ActivityLog, CommandSubset, Server, ServerGroup, SubsetDraft, SubsetPatch};
use rconsole_util::ConsoleConfig;

use crate::cli::{Cli, ServersAction, SubsetsAction};
use crate::{connect, subset_owner};

pub async fn run_subsets(cli: &Cli, config: &ConsoleConfig, action: SubsetsAction) -> Result<()> {
    let owner = subset_owner(cli, config).await?;
    let store = JsonSubsetStore::with_defaults();
    let catalog = CommandCatalog::new(config.locale);

    match action {
        SubsetsAction::List => {
            for subset in all_subsets_for_user(&store, &owner, config.locale)? {
                println!("{}", subset_line(&subset));
            }
        }
        SubsetsAction::Create {
            name,
            description,
            commands,
        } => {
            check_command_ids(&catalog, &commands)?;
            let subset = store.create(
                &owner,
                SubsetDraft {
                    name,
                    description,
                    command_ids: commands,
                },
            )?;
            println!("created {}", subset.id);
        }
        SubsetsAction::Update {
            id,
            name,
            description,
            commands,
        } => {
            if let Some(commands) = &commands {
                check_command_ids(&catalog, commands)?;
            }
            let patch = SubsetPatch {
                name,
                description: description.map(|text| Some(text).filter(|text| !text.trim().is_empty())),
                command_ids: commands,
            };
            match store.update(&owner, &id, patch)? {
                Some(subset) => println!("updated {}", subset.id),
                None => bail!("no custom subset '{id}'"),
            }
        }
        SubsetsAction::Delete { id } => {
            if !store.delete(&owner, &id)? {
                bail!("no custom subset '{id}'");
            }
            println!("deleted {id}");
        }
    }
    Ok(())
}

pub async fn run_servers(cli: &Cli, config: &ConsoleConfig, action: ServersAction) -> Result<()> {
    let (client, user) = connect(cli, config).await?;
    match action {
        ServersAction::Groups { enterprise } => {
            let enterprise = enterprise.unwrap_or(user.enterprise_guid);
            for group in client.list_groups(&enterprise).await? {
                println!("{}", group_line(&group));
            }
        }
        ServersAction::List { group } => {
            for server in client.list_servers(&group).await? {
                println!("{}", server_line(&server));
            }
        }
        ServersAction::Logs => {
            for log in client.activity_logs().await? {
                println!("{}", log_line(&log));
            }
        }
    }
    Ok(())
}

fn check_command_ids(catalog: &CommandCatalog, ids: &[String]) -> Result<()> {
    let unknown: Vec<&str> = ids
        .iter()
        .map(String::as_str)
        .filter(|id| !catalog.contains(id))
        .collect();
    if !unknown.is_empty() {
        bail!("unknown command ids: {}", unknown.join(", "));
    }
    Ok(())
}

fn subset_line(subset: &CommandSubset) -> String {
    let kind = if subset.is_custom() { "custom" } else { "predefined" };
    format!(
        "{:<20} {:<10} {} ({} commands)",
        subset.id,
        kind,
        subset.name,
        subset.command_ids.len()
    )
}

fn group_line(group: &ServerGroup) -> String {
    format!("{}  {}  {}", group.guid, group.name, group.description)
}

fn server_line(server: &Server) -> String {
    format!("{}  {:<15} {}  {}", server.guid, server.ip, server.name, server.description)
}

fn log_line(log: &ActivityLog) -> String {
    format!("{}  {:?}  {}  {}", log.timestamp, log.status, log.action, log.description)
}

#[cfg(test)]
mod tests {
    use rconsole_types::Locale;

    use super::*;

    #[test]
    fn unknown_command_ids_are_reported() {
        let catalog = CommandCatalog::new(Locale::En);
        assert!(check_command_ids(&catalog, &["update".into(), "backup_data".into()]).is_ok());
        let error = check_command_ids(&catalog, &["update".into(), "reboot_now".into()]).unwrap_err();
        assert!(error.to_string().contains("reboot_now"));
    }

    #[test]
    fn subset_lines_mark_custom_entries() {
        let subset = CommandSubset {
            id: "custom_1700000000000".into(),
            name: "Mine".into(),
            description: None,
            command_ids: vec!["update".into()],
            created_by: Some("u1".into()),
            created_at: None,
            updated_at: None,
        };
        let line = subset_line(&subset);
        assert!(line.contains("custom "));
        assert!(line.ends_with("Mine (1 commands)"));
    }
}
