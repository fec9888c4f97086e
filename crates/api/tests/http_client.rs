//! Endpoint helpers against a mock backend.

use std::time::Duration;

use rconsole_api::{ApiError, ApiRequest, AuthEvent, ConsoleClient, ReqwestTransport, Transport};
use rconsole_types::{BodyBinding, InvocationMethod, NewServer, NewServerGroup, ParamValue, RemoteInvocation};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ConsoleClient {
    ConsoleClient::new(&server.uri(), Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn login_posts_backend_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(body_json(json!({ "correo": "ana@example.com", "contrasena": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).login("ana@example.com", "pw").await.expect("login");
}

#[tokio::test]
async fn rejected_login_does_not_attempt_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "authenticated": true })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).login("ana@example.com", "bad").await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn command_body_follows_bindings_and_returns_raw_text() {
    let server = MockServer::start().await;
    let raw = r#"{"success":true,"command":"vl_activate","response":"done"}"#;
    Mock::given(method("POST"))
        .and(path("/commands/vl_activate/"))
        .and(body_json(json!({ "licensekey": "ABC-123", "users": 10, "edition": "Enterprise", "supportyears": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_string(raw))
        .expect(1)
        .mount(&server)
        .await;

    let invocation = RemoteInvocation {
        method: InvocationMethod::Post,
        path: "/commands/vl_activate/".into(),
        bindings: vec![
            BodyBinding::scalar("licensekey"),
            BodyBinding::scalar("users"),
            BodyBinding::scalar("edition"),
            BodyBinding::scalar("supportyears"),
            BodyBinding::scalar("comments"),
        ],
    };
    let args = vec![
        Some(ParamValue::from("ABC-123")),
        Some(ParamValue::Number(10.0)),
        Some(ParamValue::from("Enterprise")),
        Some(ParamValue::Number(2.0)),
        None,
    ];

    let text = client_for(&server).invoke_command(&invocation, &args).await.expect("invoke");
    assert_eq!(text, raw);
}

#[tokio::test]
async fn command_error_payload_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/commands/remove_printer/"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "success": false, "error": "spooler down" })))
        .mount(&server)
        .await;

    let invocation = RemoteInvocation {
        method: InvocationMethod::Delete,
        path: "/commands/remove_printer/".into(),
        bindings: vec![],
    };
    let text = client_for(&server).invoke_command(&invocation, &[]).await.expect("payload");
    assert!(text.contains("spooler down"));
}

#[tokio::test]
async fn expired_session_is_refreshed_and_request_replayed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groups/"))
        .and(query_param("empresaId", "e-1"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/groups/"))
        .and(query_param("empresaId", "e-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "nombre": "Grupo BBVA", "descripcion": "Servidores BBVA", "empresa_guid": "e-1", "guid": "g-1" }
        ])))
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "authenticated": true })))
        .expect(1)
        .mount(&server)
        .await;

    let groups = client_for(&server).list_groups("e-1").await.expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Grupo BBVA");
}

#[tokio::test]
async fn unauthenticated_refresh_ends_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "authenticated": false })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut events = client.subscribe();
    let err = client.current_user().await.unwrap_err();

    assert!(matches!(err, ApiError::RefreshFailed(_)));
    assert!(err.is_auth_failure());
    assert!(matches!(events.recv().await, Ok(AuthEvent::AuthenticationFailed { .. })));
}

#[tokio::test]
async fn servers_and_activity_logs_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/servers/"))
        .and(query_param("group_guid", "g-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "ip": "192.168.1.1",
            "tunel": "https://tunel.example.com",
            "nombre": "Servidor 1",
            "descripcion": "Servidor de pruebas",
            "grupo_guid": "g-1",
            "guid": "s-1"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/activity_logs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "ok",
            "logs": [{
                "_id": "l-1",
                "user_id": "u-1",
                "action": "execute",
                "resource_type": "command",
                "resource_id": "update",
                "description": "Ran update",
                "status": "success",
                "timestamp": "2026-01-01T00:00:00Z"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/groups"))
        .and(body_json(json!({ "nombre": "Nuevo", "descripcion": "d", "empresa_guid": "e-1" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let servers = client.list_servers("g-1").await.expect("servers");
    assert_eq!(servers[0].tunnel, "https://tunel.example.com");

    let logs = client.activity_logs().await.expect("logs");
    assert_eq!(logs[0].resource_id, "update");

    client
        .create_group(&NewServerGroup {
            name: "Nuevo".into(),
            description: "d".into(),
            enterprise_guid: "e-1".into(),
        })
        .await
        .expect("create group");
}

#[tokio::test]
async fn backend_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/servers/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "servidor no encontrado" })))
        .mount(&server)
        .await;

    let err = client_for(&server).remove_server("missing").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 404,
            message: "servidor no encontrado".into()
        }
    );
}

#[tokio::test]
async fn session_endpoints_use_auth_verbs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "authenticated": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "authenticated": false })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "bye" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut events = client.subscribe();
    assert!(client.check_auth().await.expect("check").authenticated);
    // A direct refresh reports the status without ending the session.
    assert!(!client.refresh_session().await.expect("refresh").authenticated);
    client.logout().await.expect("logout");
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn server_and_group_mutations_hit_their_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/servers"))
        .and(body_json(json!({
            "ip": "10.0.0.5",
            "tunel": "https://t.example.com",
            "nombre": "App 5",
            "descripcion": "",
            "grupo_guid": "g-1"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/groups/"))
        .and(query_param("guid", "g-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .create_server(&NewServer {
            ip: "10.0.0.5".into(),
            tunnel: "https://t.example.com".into(),
            name: "App 5".into(),
            description: String::new(),
            group_guid: "g-1".into(),
        })
        .await
        .expect("create server");
    client.remove_group("g-1").await.expect("remove group");
}

// Port 1 is reserved and never listening, so the connect attempt is refused.
async fn send_to_closed_port(base: &str) -> String {
    let transport = ReqwestTransport::new(base, Duration::from_secs(5)).expect("transport");
    match transport.send(&ApiRequest::get("/auth/check")).await {
        Err(ApiError::Transport(message)) => message,
        other => panic!("expected a transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn https_base_url_reaches_the_connect_stage() {
    let message = send_to_closed_port("https://127.0.0.1:1").await;
    assert!(!message.contains("scheme is not http"), "{message}");
    assert!(message.to_lowercase().contains("connect"), "{message}");
}

#[tokio::test]
async fn refused_connection_reports_its_cause() {
    let message = send_to_closed_port("http://127.0.0.1:1").await;
    assert!(message.starts_with("error sending request"), "{message}");
    assert!(message.to_lowercase().contains("refused"), "{message}");
}
