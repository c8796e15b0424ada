//! Shoal remote client bindings
//!
//! Typed request/response bindings to the cache control-plane API. The
//! [`CacheApi`] trait is the seam between the reconciliation engine and the
//! wire: implementations own authentication, transport and endpoint
//! resolution; the engine sees typed payloads and the closed [`RemoteFault`]
//! taxonomy, nothing else.

pub mod api;
pub mod fault;
pub mod input;
pub mod model;

// Re-exports
pub use api::{CacheApi, Page};
pub use fault::{RemoteFault, Result, kinds};
pub use model::{
    AutomaticFailoverStatus, AuthTokenUpdateStrategy, CacheCluster, CacheClusterStatus,
    ClusterMode, Endpoint, GlobalGroupMemberStatus, GlobalGroupStatus, GlobalReplicationGroup,
    GlobalReplicationGroupMember, MultiAzStatus, NodeGroup, NodeGroupMember, ReplicationGroup,
    ReplicationGroupStatus, TransitEncryptionMode,
};
