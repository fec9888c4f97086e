//! Records exchanged with the server, group, user and activity endpoints.
//!
//! The backend speaks Spanish field names; they are mapped onto English
//! struct fields with `serde(rename)`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub ip: String,
    #[serde(rename = "tunel")]
    pub tunnel: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "grupo_guid")]
    pub group_guid: String,
    pub guid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServer {
    pub ip: String,
    #[serde(rename = "tunel")]
    pub tunnel: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "grupo_guid")]
    pub group_guid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerGroup {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "empresa_guid")]
    pub enterprise_guid: String,
    pub guid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewServerGroup {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "empresa_guid")]
    pub enterprise_guid: String,
}

/// Raw `/users` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellido_paterno", default)]
    pub paternal_surname: Option<String>,
    #[serde(rename = "apellido_materno", default)]
    pub maternal_surname: Option<String>,
    #[serde(rename = "correo")]
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "foto", default)]
    pub photo: Option<String>,
    pub guid: String,
    #[serde(rename = "empresa_guid")]
    pub enterprise_guid: String,
}

/// The signed-in user as the console uses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub enterprise_guid: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.guid,
            email: record.email,
            name: record.first_name,
            enterprise_guid: record.enterprise_guid,
        }
    }
}

/// `{ authenticated }` answer of the refresh and check endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Error,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub description: String,
    pub status: ActivityStatus,
    pub timestamp: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogsResponse {
    #[serde(default)]
    pub logs: Vec<ActivityLog>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
}
