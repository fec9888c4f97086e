use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rconsole_engine::{
    CommandInvoker, Confirmation, ControlKind, ExecutionController, ExecutionPhase, FieldEdit, NoopInvoker,
};
use rconsole_registry::CommandCatalog;
use rconsole_types::{CommandDefinition, ExecutionResult, Locale, ParamValue};
use tokio::sync::Notify;

/// Blocks until released so tests can observe the executing phase.
struct GatedInvoker {
    release: Arc<Notify>,
    calls: AtomicUsize,
}

#[async_trait]
impl CommandInvoker for GatedInvoker {
    async fn invoke(&self, command: &CommandDefinition, _args: &[Option<ParamValue>]) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(format!(r#"{{"success":true,"command":"{}"}}"#, command.id))
    }
}

#[tokio::test]
async fn install_volume_license_server_through_the_form() {
    let mut controller = ExecutionController::new(CommandCatalog::new(Locale::En));
    controller.select_command(Some("vl_activate")).unwrap();

    let form = controller.form();
    let edition = form.iter().position(|control| control.param_id == "edition").unwrap();
    let ControlKind::Select { options, .. } = &form[edition].kind else {
        panic!("edition should be a select");
    };
    assert_eq!(options.len(), 3);

    for (param, text) in [("licenseKey", "ABCDE-12345"), ("users", "25"), ("supportYears", "3")] {
        controller.edit(param, FieldEdit::Text(text.into())).unwrap();
    }
    controller.edit("edition", FieldEdit::Text("standard".into())).unwrap();
    assert!(controller.can_execute());

    controller.submit().unwrap();
    assert_eq!(controller.phase(), &ExecutionPhase::AwaitingConfirmation);
    let result = controller.execute(&NoopInvoker).await.unwrap();

    let ExecutionResult::Success { response, .. } = result else {
        panic!("expected success, got {result:?}");
    };
    assert!(response.starts_with("POST /commands/vl_activate/"));
    assert!(response.contains(r#""edition":"Standard""#));
    assert!(response.contains(r#""users":25"#));
    assert!(response.contains(r#""supportyears":3"#));
}

#[tokio::test]
async fn abandoned_execution_does_not_surface_late_result() {
    let release = Arc::new(Notify::new());
    let invoker = Arc::new(GatedInvoker {
        release: Arc::clone(&release),
        calls: AtomicUsize::new(0),
    });

    let mut controller = ExecutionController::new(CommandCatalog::new(Locale::En));
    controller.select_command(Some("update")).unwrap();
    controller.submit().unwrap();
    let Confirmation::Dispatch(ticket) = controller.confirm().unwrap() else {
        panic!("expected dispatch");
    };
    assert!(!controller.can_execute());

    let pending = {
        let invoker = Arc::clone(&invoker);
        let ticket = ticket.clone();
        tokio::spawn(async move { invoker.invoke(&ticket.command, &ticket.args).await })
    };
    while invoker.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    assert!(controller.abandon());
    release.notify_one();
    let late = pending.await.unwrap();

    assert!(!controller.finish(ticket.attempt, late));
    assert_eq!(controller.phase(), &ExecutionPhase::Idle);
    assert!(controller.phase().result().is_none());
}
