//! Shoal reconciliation engine
//!
//! Brings a remote cache object toward its declared configuration, one pass
//! at a time. The engine is built from four cooperating parts:
//!
//! - **Finder** — read-only lookup of the remote object, normalizing
//!   not-found into a typed, expected condition.
//! - **Waiter** — polls the finder until the object reaches a target status,
//!   with a deadline and an injected clock.
//! - **Planner** — turns a frozen diff into an ordered list of typed
//!   operations. The ordering is a hard contract: topology changes, then
//!   replica increases, then a batched modify, then credential rotation,
//!   then replica decreases.
//! - **Executor** — runs the plan against the remote client, wrapping every
//!   operation in a pre/post availability wait.
//!
//! The canonical resource tying them together is
//! [`replication_group::ReplicationGroupResource`].

pub mod clock;
pub mod error;
pub mod executor;
pub mod finder;
pub mod planner;
pub mod replication_group;
pub mod retry;
pub mod waiter;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{EngineError, Result};
pub use executor::Executor;
pub use planner::{Operation, plan};
pub use replication_group::ReplicationGroupResource;
pub use waiter::{Observation, StatusClass, StatusPoll, WaitConfig, wait_for};
