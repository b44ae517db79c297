//! # Reconcile
//!
//! A framework for declarative infrastructure reconciliation.
//!
//! This crate provides the core abstractions for declaring a desired set of
//! resources with dependencies, diffing it against an external provider, and
//! converging the provider to match.
//!
//! ## Core Concepts
//!
//! - **Resource**: a declared kind + name with desired attributes and
//!   dependencies on other resources
//! - **Provider**: the CRUD capability set of the external system holding
//!   actual state
//! - **DependencyGraph**: explicit adjacency over resource indices, with
//!   cycle detection via topological sort
//! - **ResourceState**: immutable snapshot emitted per applied resource,
//!   carrying provider-generated attributes downstream
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{reconcile, Resource};
//!
//! let desired = vec![
//!     Resource::new("vpc", "net").with_attribute("cidr_block", "10.0.0.0/16"),
//!     Resource::new("subnet", "app")
//!         .with_attribute("cidr_block", "10.0.1.0/24")
//!         .with_dependency("net"),
//! ];
//!
//! let outcome = reconcile(&mut provider, &desired);
//! if let Some(subnet) = outcome.state_of("app") {
//!     println!("subnet id: {}", subnet.id);
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Graph validation happens before any provider call; a cyclic desired set
//!   never touches the provider.
//! - A resource is processed only after all of its dependencies have
//!   snapshots; failures block dependents but independent branches continue.
//! - Reapplying a converged set performs zero mutating provider calls.

pub mod engine;
pub mod error;
pub mod graph;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod state;

// Re-export main types at crate root
pub use engine::reconcile;
pub use error::{Error, ProviderError, Result};
pub use graph::DependencyGraph;
pub use plan::{plan, PlannedAction, PlannedChange};
pub use provider::{Observed, Provider};
pub use resource::Resource;
pub use state::{ApplyAction, ApplySummary, ReconcileOutcome, ResourceState};
