//! In-flight tracking for named remote commands.
//!
//! `remotecmd` wraps every call to a registered [`Operation`] so that, while
//! the call runs, it is visible in a live table of in-flight invocations:
//!
//! - an [`IdSource`] hands each invocation a unique, increasing id,
//! - the invocation emits `Begin` to the status authority, runs its handler,
//!   and emits `End` from an RAII guard on every exit path,
//! - the authority, a single Tokio task, owns the table and serves
//!   point-in-time [`Snapshot`]s.
//!
//! No lock guards the table: all access is message passing through a
//! [`StatusHandle`].
//!
//! # Example
//!
//! ```
//! use remotecmd::{Operation, Request, Service, STATUS_NAME};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> remotecmd::Result<()> {
//! let service = Service::builder()
//!     .with_builtins()?
//!     .register(Operation::from_fn("/ping", "Replies pong", |_req: Request| async {
//!         Ok("pong\n".to_string())
//!     }))?
//!     .build();
//!
//! assert_eq!(service.handle("/ping", Request::get()).await?, "pong\n");
//!
//! let status = service.handle(STATUS_NAME, Request::get()).await?;
//! assert!(status.starts_with("No\tId\tDur (ms)\tCommand\n"));
//! # Ok(())
//! # }
//! ```

mod builtin;
mod error;
mod id;
mod invocation;
mod operation;
mod registry;
pub mod render;
mod service;
pub mod status;


pub use crate::error::*;
pub use crate::id::*;
pub use crate::invocation::*;
pub use crate::operation::*;
pub use crate::registry::*;
pub use crate::service::*;
pub use crate::status::{Snapshot, StatusHandle};
