//! Treemap viewer for JavaScript bundle composition.
//!
//! A viewer window receives precomputed size trees from the window that
//! opened it, lays them out as a treemap and colors every node by how much
//! of it is unused. See [`page::Page`] for the event loop and
//! [`viewer::TreemapViewer`] for the display logic.

pub mod cli;
pub mod color;
pub mod dom;
pub mod error;
pub mod host;
pub mod html;
pub mod input;
pub mod label;
pub mod layout;
pub mod node;
pub mod page;
pub mod viewer;

pub use error::{Error, Result};
