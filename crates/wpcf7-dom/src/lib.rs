//! # wpcf7-dom
//!
//! In-memory DOM model for the wpcf7 form behaviour layer.
//!
//! The behaviour layer manipulates CMS-rendered markup: it toggles
//! attributes and classes, inserts error tips, serializes controls into
//! `FormData` and dispatches namespaced custom events. This crate models
//! exactly that surface so the controllers can run (and be tested) without
//! a browser. An embedding host mirrors the same operations onto the real
//! page.
//!
//! ## Modules
//!
//! - [`document`]: arena tree, attributes, classes, control state
//! - [`selector`]: element predicates replacing CSS selector strings
//! - [`builder`]: fluent construction of element trees
//! - [`form_data`]: `FormData` serialization rules
//! - [`event`]: shared [`Dom`] handle, listeners and dispatch

#![warn(missing_docs)]

pub mod builder;
pub mod document;
pub mod error;
pub mod event;
pub mod form_data;
mod node;
pub mod selector;

pub use builder::{ElementBuilder, el};
pub use document::Document;
pub use error::{DomError, Result};
pub use event::{Dom, Event, Listener};
pub use form_data::{FormData, FormValue};
pub use node::{FileEntry, NodeId};
pub use selector::Selector;
