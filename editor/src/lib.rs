//! # Assembly Editor
//!
//! Headless front end of the assembly editor. A [`ProjectSession`] holds one
//! open project: its [`AssemblyModel`](assembly_tree::AssemblyModel) and the
//! undo history. The [`Console`] turns text lines into session gestures.
//!
//! Projects are read from TOML ([`project`]) on a background runtime
//! ([`background_load`]); the tree is only built and edited on the calling
//! thread.

pub mod background_load;
pub mod console;
pub mod history_listing;
pub mod log_capture;
pub mod project;
pub mod session;

pub use background_load::{BackgroundLoader, LoadRequestId, LoadResult};
pub use console::{Console, ConsoleError, Outcome};
pub use project::{ProjectConfig, ProjectError};
pub use session::{HistoryStatus, ProjectSession, SessionError, SessionResult};
