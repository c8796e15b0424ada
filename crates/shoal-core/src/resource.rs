//! Resource trait and reconcile timeouts

use crate::data::ResourceData;
use crate::diagnostics::Diagnostics;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-operation deadlines for one resource type.
///
/// Every waiter poll loop and bounded retry inside a pass derives its
/// deadline from these.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileTimeouts {
    pub create: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for ReconcileTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(60 * 60),
            update: Duration::from_secs(40 * 60),
            delete: Duration::from_secs(45 * 60),
        }
    }
}

/// A managed resource type: four lifecycle entry points plus import.
///
/// Each method is one reconciliation pass. It runs to completion on its own
/// logical thread of control; the only blocking points are waiter polls.
/// Failures are reported through the returned [`Diagnostics`], never by
/// panicking.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Provision the remote object from the declarative configuration and
    /// flatten the resulting remote state into `data`.
    async fn create(&self, data: &mut ResourceData) -> Diagnostics;

    /// Refresh local state from the remote object. An object deleted out of
    /// band clears the identifier instead of failing.
    async fn read(&self, data: &mut ResourceData) -> Diagnostics;

    /// Apply in-place changes. Force-new changes never reach this method.
    ///
    /// Only attributes configured with a concrete value participate in the
    /// diff: an explicit null marks an attribute unmanaged, it is not a
    /// removal request. Callers wanting a remote attribute cleared configure
    /// its zero value instead.
    async fn update(&self, data: &mut ResourceData) -> Diagnostics;

    /// Destroy the remote object. A missing object is success.
    async fn delete(&self, data: &mut ResourceData) -> Diagnostics;

    /// Populate full state from an identifier alone.
    async fn import(&self, id: &str, data: &mut ResourceData) -> Diagnostics;
}
