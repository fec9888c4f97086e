//! # rconsole engine
//!
//! Everything between the command catalog and the network:
//!
//! - **`form`**: turns a command's parameters into input controls
//! - **`validation`**: schema constraints, the Windows path heuristic and the
//!   execute gate
//! - **`controller`**: the per-panel execution state machine
//! - **`invoker`**: the seam through which a confirmed command is sent
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rconsole_engine::{ExecutionController, FieldEdit, HttpCommandInvoker};
//! use rconsole_registry::CommandCatalog;
//!
//! let mut controller = ExecutionController::new(CommandCatalog::default());
//! controller.select_command(Some("vl_enable"))?;
//! controller.edit("licenseKey", FieldEdit::Text("ABCDE-12345".into()))?;
//! controller.submit()?;
//! let result = controller.execute(&HttpCommandInvoker::new(client)).await?;
//! ```

pub mod controller;
pub mod form;
pub mod invoker;
pub mod messages;
pub mod validation;

pub use controller::{Confirmation, ControllerError, ExecutionController, ExecutionPhase, ExecutionTicket, FocusTarget};
pub use form::{ControlKind, FieldEdit, FormControl, build_form};
pub use invoker::{CommandInvoker, HttpCommandInvoker, NoopInvoker};
pub use messages::Message;
pub use validation::{
    ParsedValues, PathRejection, ValidationReport, check_path_heuristic, execution_allowed, find_path_parameter,
    is_windows_path, validate_values,
};
