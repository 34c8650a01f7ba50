//! Error types for tree manipulation.

use crate::node::NodeId;
use thiserror::Error;

/// Result alias for DOM operations.
pub type Result<T> = std::result::Result<T, DomError>;

/// Errors raised by tree mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
	/// The id does not belong to this document.
	#[error("node {0} does not exist")]
	NodeNotFound(NodeId),

	/// An element was required.
	#[error("node {0} is not an element")]
	NotAnElement(NodeId),

	/// The operation needs a parent but the node is detached.
	#[error("node {0} has no parent")]
	Detached(NodeId),

	/// Inserting would create a cycle or move the document node.
	#[error("cannot insert {child} into {parent}")]
	HierarchyRequest {
		/// Prospective parent.
		parent: NodeId,
		/// Node being inserted.
		child: NodeId,
	},
}
