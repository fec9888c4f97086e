//! Shared data model for the rconsole workspace.
//!
//! Everything here is plain data: catalog records, entered values, declarative
//! validation constraints, subsets and backend payloads. Behavior lives in the
//! `registry`, `engine` and `api` crates.

pub mod command;
pub mod locale;
pub mod outcome;
pub mod schema;
pub mod server;
pub mod subset;
pub mod value;

pub use command::{BodyBinding, BodyEncoding, CommandDefinition, InvocationMethod, ParamKind, ParameterSpec, RemoteInvocation, SelectOption};
pub use locale::{Locale, LocalizedText, ParseLocaleError};
pub use outcome::{CommandResponse, ExecutionResult};
pub use schema::{FieldConstraint, ValidationSchema, ValueType};
pub use server::{ActivityLog, ActivityLogsResponse, ActivityStatus, AuthStatus, NewServer, NewServerGroup, Server, ServerGroup, User, UserRecord};
pub use subset::{CUSTOM_SUBSET_PREFIX, CommandSubset, SYSTEM_CREATOR, SubsetDraft, SubsetPatch, is_custom_subset_id};
pub use value::{ParamError, ParamValue, ParamValueMap};

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_command() -> CommandDefinition {
        CommandDefinition {
            id: "vl_activate".into(),
            name: "Install volume license server".into(),
            description: "Activates a volume license".into(),
            params: vec![
                ParameterSpec {
                    id: "licenseKey".into(),
                    name: "License key".into(),
                    kind: ParamKind::Text,
                    optional: false,
                    placeholder: None,
                },
                ParameterSpec {
                    id: "users".into(),
                    name: "Users".into(),
                    kind: ParamKind::Number,
                    optional: false,
                    placeholder: None,
                },
                ParameterSpec {
                    id: "comments".into(),
                    name: "Comments".into(),
                    kind: ParamKind::Text,
                    optional: true,
                    placeholder: None,
                },
            ],
            schema: None,
            invocation: RemoteInvocation {
                method: InvocationMethod::Post,
                path: "/commands/vl_activate/".into(),
                bindings: vec![BodyBinding::scalar("licensekey"), BodyBinding::scalar("users"), BodyBinding::scalar("comments")],
            },
        }
    }

    #[test]
    fn value_map_rejects_undeclared_parameters() {
        let command = sample_command();
        let mut values = ParamValueMap::new();
        values.set(&command, "licenseKey", "ABC".into()).expect("declared parameter");

        let err = values.set(&command, "bogus", "x".into()).expect_err("undeclared parameter");
        assert_eq!(
            err,
            ParamError::UnknownParameter {
                command: "vl_activate".into(),
                param: "bogus".into()
            }
        );
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn positional_args_follow_declared_order_and_blank_empty_text() {
        let command = sample_command();
        let mut values = ParamValueMap::new();
        values.set(&command, "comments", "".into()).unwrap();
        values.set(&command, "users", 10i64.into()).unwrap();
        values.set(&command, "licenseKey", "K-1".into()).unwrap();

        let args = values.positional_args(&command);
        assert_eq!(args, vec![Some(ParamValue::from("K-1")), Some(ParamValue::Number(10.0)), None]);
        assert!(!values.has_value("comments"));
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        assert_eq!(ParamValue::Number(10.0).to_json(), serde_json::json!(10));
        assert_eq!(ParamValue::Number(2.5).to_json(), serde_json::json!(2.5));
        assert_eq!(ParamValue::Number(3.0).to_string(), "3");
    }

    #[test]
    fn zero_and_false_are_values() {
        assert!(!ParamValue::Number(0.0).is_empty());
        assert!(!ParamValue::Bool(false).is_empty());
        assert!(ParamValue::Text(String::new()).is_empty());
    }

    #[test]
    fn command_response_accepts_bare_success() {
        let response = CommandResponse::from_raw(r#"{"success":true}"#).expect("bare success");
        assert!(response.success);
        assert!(response.command.is_none());
        assert!(response.error.is_none());
    }

    #[test]
    fn command_response_unwraps_double_encoded_payload() {
        let raw = serde_json::to_string(r#"{"success":false,"error":"denied"}"#).unwrap();
        let response = CommandResponse::from_raw(&raw).expect("double encoded");
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("denied"));
    }

    #[test]
    fn locale_parses_region_tags() {
        assert_eq!("es-MX".parse::<Locale>().unwrap(), Locale::Es);
        assert_eq!("en_US.UTF-8".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn subset_patch_only_touches_provided_fields() {
        let mut subset = CommandSubset {
            id: "custom_1".into(),
            name: "Mine".into(),
            description: Some("old".into()),
            command_ids: vec!["update".into()],
            created_by: Some("u1".into()),
            created_at: None,
            updated_at: None,
        };
        SubsetPatch {
            name: Some("Renamed".into()),
            ..Default::default()
        }
        .apply_to(&mut subset);

        assert_eq!(subset.name, "Renamed");
        assert_eq!(subset.description.as_deref(), Some("old"));
        assert!(subset.contains("update"));
        assert!(subset.is_custom());
    }

    #[test]
    fn user_record_maps_backend_field_names() {
        let record: UserRecord = serde_json::from_value(serde_json::json!({
            "nombre": "Ana",
            "correo": "ana@example.com",
            "guid": "g-1",
            "empresa_guid": "e-1"
        }))
        .expect("user record");
        let user = User::from(record);
        assert_eq!(user.id, "g-1");
        assert_eq!(user.name, "Ana");
        assert_eq!(user.enterprise_guid, "e-1");
    }
}
