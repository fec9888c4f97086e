//! Server, group and activity-log endpoints.

use rconsole_types::{ActivityLog, ActivityLogsResponse, NewServer, NewServerGroup, Server, ServerGroup};
use serde::Serialize;

use crate::client::ConsoleClient;
use crate::session::ensure_success;
use crate::transport::ApiRequest;
use crate::ApiError;

impl ConsoleClient {
    pub async fn create_group(&self, group: &NewServerGroup) -> Result<(), ApiError> {
        self.send_unit(ApiRequest::post("/groups").json(to_body(group)?)).await
    }

    pub async fn list_groups(&self, enterprise_id: &str) -> Result<Vec<ServerGroup>, ApiError> {
        let request = ApiRequest::get("/groups/").query("empresaId", enterprise_id);
        self.session().send_json(&request).await
    }

    pub async fn remove_group(&self, group_guid: &str) -> Result<(), ApiError> {
        self.send_unit(ApiRequest::delete("/groups/").query("guid", group_guid)).await
    }

    pub async fn create_server(&self, server: &NewServer) -> Result<(), ApiError> {
        self.send_unit(ApiRequest::post("/servers").json(to_body(server)?)).await
    }

    pub async fn list_servers(&self, group_guid: &str) -> Result<Vec<Server>, ApiError> {
        let request = ApiRequest::get("/servers/").query("group_guid", group_guid);
        self.session().send_json(&request).await
    }

    pub async fn remove_server(&self, server_guid: &str) -> Result<(), ApiError> {
        self.send_unit(ApiRequest::delete("/servers/").query("guid", server_guid)).await
    }

    pub async fn activity_logs(&self) -> Result<Vec<ActivityLog>, ApiError> {
        let response: ActivityLogsResponse = self.session().send_json(&ApiRequest::get("/activity_logs/")).await?;
        Ok(response.logs)
    }

    async fn send_unit(&self, request: ApiRequest) -> Result<(), ApiError> {
        let response = self.session().send(&request).await?;
        ensure_success(response).map(|_| ())
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::from)
}
