//! Hierarchical state machine for turn-based decision making.
//!
//! States are arranged in a tree. At any moment exactly one path from the
//! root is active, and the deepest node on it is the *leaf* that drives
//! behavior. Each decision cycle asks the current leaf whether it wants to
//! move elsewhere and keeps following requests until a leaf is content:
//! that leaf is *stable*.
//!
//! - **Arena storage**: nodes live in one `Vec` addressed by [`NodeId`];
//!   parent and child links are indices, never references
//! - **Scoped blackboard changes**: a node may change shared data on enter
//!   through a [`Scope`]; the change is undone when the node exits
//! - **Bounded resolution**: a transition cycle is cut off after a fixed
//!   number of steps and the tree falls back to a known leaf
//!
//! # Architecture
//!
//! - [`Lifecycle`] and [`State`]: hooks implemented by node payloads
//! - [`Transition`]: what a leaf may request
//! - [`TreeBuilder`] / [`StateTree`]: construction and resolution
//! - [`Resolution`]: outcome of one resolution pass

pub mod builder;
pub mod error;
pub mod scope;
pub mod state;
pub mod tree;

pub use builder::TreeBuilder;
pub use error::StateTreeError;
pub use scope::Scope;
pub use state::{Lifecycle, State, Transition};
pub use tree::{NodeId, Resolution, StateNode, StateTree};
