//! Remote object model
//!
//! Read-only snapshots of control-plane objects as returned by describe
//! calls. Status domains are closed enums; the wire strings are kebab-case.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle status of a replication group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReplicationGroupStatus {
    Creating,
    Available,
    Modifying,
    Snapshotting,
    Deleting,
    CreateFailed,
}

impl ReplicationGroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Available => "available",
            Self::Modifying => "modifying",
            Self::Snapshotting => "snapshotting",
            Self::Deleting => "deleting",
            Self::CreateFailed => "create-failed",
        }
    }
}

impl std::fmt::Display for ReplicationGroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a single member cache cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheClusterStatus {
    Creating,
    Available,
    Modifying,
    Snapshotting,
    Deleting,
}

impl CacheClusterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Available => "available",
            Self::Modifying => "modifying",
            Self::Snapshotting => "snapshotting",
            Self::Deleting => "deleting",
        }
    }
}

impl std::fmt::Display for CacheClusterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a global replication group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalGroupStatus {
    Creating,
    Available,
    Modifying,
    PrimaryOnly,
    Deleting,
}

impl GlobalGroupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creating => "creating",
            Self::Available => "available",
            Self::Modifying => "modifying",
            Self::PrimaryOnly => "primary-only",
            Self::Deleting => "deleting",
        }
    }
}

impl std::fmt::Display for GlobalGroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Membership status of a replication group inside a global group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalGroupMemberStatus {
    Associating,
    Associated,
    Detaching,
    Detached,
}

impl GlobalGroupMemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Associating => "associating",
            Self::Associated => "associated",
            Self::Detaching => "detaching",
            Self::Detached => "detached",
        }
    }
}

impl std::fmt::Display for GlobalGroupMemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Automatic failover as reported remotely (the transitional states map to
/// the enabled/disabled booleans of the declarative surface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutomaticFailoverStatus {
    Enabled,
    Enabling,
    Disabled,
    Disabling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultiAzStatus {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterMode {
    Enabled,
    Disabled,
    Compatible,
}

impl ClusterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Compatible => "compatible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitEncryptionMode {
    Preferred,
    Required,
}

impl TransitEncryptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preferred => "preferred",
            Self::Required => "required",
        }
    }
}

/// How a credential rotation is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthTokenUpdateStrategy {
    Rotate,
    Set,
    Delete,
}

impl std::str::FromStr for AuthTokenUpdateStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "rotate" => Ok(Self::Rotate),
            "set" => Ok(Self::Set),
            "delete" => Ok(Self::Delete),
            other => Err(format!("invalid auth token update strategy {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupMember {
    pub cache_cluster_id: String,
    pub cache_node_id: String,
}

/// One shard: a primary plus its replicas. Shards share the cache cluster
/// lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroup {
    pub node_group_id: String,
    pub status: CacheClusterStatus,
    pub primary_endpoint: Option<Endpoint>,
    pub reader_endpoint: Option<Endpoint>,
    pub members: Vec<NodeGroupMember>,
}

/// A replication group as the control plane reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationGroup {
    pub replication_group_id: String,
    pub arn: String,
    pub status: ReplicationGroupStatus,
    pub description: String,
    pub engine: String,
    pub member_clusters: Vec<String>,
    pub node_groups: Vec<NodeGroup>,
    pub cluster_enabled: bool,
    pub cluster_mode: Option<ClusterMode>,
    pub automatic_failover: AutomaticFailoverStatus,
    pub multi_az: MultiAzStatus,
    pub configuration_endpoint: Option<Endpoint>,
    pub snapshot_window: Option<String>,
    pub snapshot_retention_limit: u32,
    pub user_group_ids: Vec<String>,
    pub global_group_id: Option<String>,
    pub kms_key_id: Option<String>,
    pub tags: BTreeMap<String, String>,
}

/// A member cache cluster. Several group-level settings are only visible
/// here (encryption, security groups, actual engine version).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheCluster {
    pub cache_cluster_id: String,
    pub status: CacheClusterStatus,
    pub node_type: String,
    pub engine: String,
    pub engine_version: String,
    pub parameter_group_name: Option<String>,
    pub maintenance_window: Option<String>,
    pub security_group_ids: Vec<String>,
    pub security_group_names: Vec<String>,
    pub at_rest_encryption_enabled: bool,
    pub transit_encryption_enabled: bool,
    pub transit_encryption_mode: Option<TransitEncryptionMode>,
    pub auth_token_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalReplicationGroupMember {
    pub replication_group_id: String,
    pub status: GlobalGroupMemberStatus,
}

/// A group-of-groups spanning regions. Members may lag the group's own
/// status while the control plane finishes linking them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalReplicationGroup {
    pub global_group_id: String,
    pub status: GlobalGroupStatus,
    pub members: Vec<GlobalReplicationGroupMember>,
}
