//! # Assembly Tree
//!
//! The hierarchy edited by the assembly editor: components grouped into
//! groups, with the top-level groups acting as stations.
//!
//! Two trees describe the same hierarchy. [`ItemTree`] is the authoritative
//! domain model; [`DisplayTree`] is what the tree view shows. Both implement
//! [`TreeView`], and [`AssemblyModel`] runs every structural edit against
//! both, domain first, so they never disagree on ids or sibling order.
//!
//! Positions are stored as [`Position`] values (after a named sibling, at
//! the start, at the end) rather than indices, so commands recorded in the
//! history stay valid while other edits shift indices around.
//!
//! The reversible edits live in [`commands`] and implement
//! [`Command`](assembly_core::abstract_editor::Command) for [`AssemblyModel`].

pub mod commands;
mod display;
mod error;
mod item;
mod model;
mod position;
mod state;
mod tree;
mod view;

pub use display::{DisplayRow, DisplayTree};
pub use error::{TreeError, TreeResult};
pub use item::{Item, ItemId, ItemIdAllocator};
pub use model::{AssemblyModel, ROOT_ID};
pub use position::Position;
pub use state::ItemState;
pub use tree::ItemTree;
pub use view::{SnapshotRow, TreeSnapshot, TreeView, depth_first};
