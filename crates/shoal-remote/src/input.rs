//! Request payloads
//!
//! One input type per operation kind. Describe inputs carry a page token;
//! the engine's finder drives pagination, the client only returns one page
//! per call.

use crate::model::{AuthTokenUpdateStrategy, ClusterMode, TransitEncryptionMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateReplicationGroupInput {
    pub replication_group_id: String,
    pub description: String,

    /// Derive engine, node type and encryption settings from an existing
    /// global group. Mutually exclusive with the standalone fields below.
    pub global_group_id: Option<String>,

    // Standalone creation fields
    pub node_type: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub automatic_failover_enabled: Option<bool>,
    pub transit_encryption_enabled: Option<bool>,
    pub transit_encryption_mode: Option<TransitEncryptionMode>,
    pub at_rest_encryption_enabled: Option<bool>,

    pub multi_az_enabled: Option<bool>,
    pub cluster_mode: Option<ClusterMode>,
    pub num_cache_clusters: Option<u32>,
    pub num_node_groups: Option<u32>,
    pub replicas_per_node_group: Option<u32>,
    pub parameter_group_name: Option<String>,
    pub port: Option<u16>,
    pub subnet_group_name: Option<String>,
    pub security_group_ids: Vec<String>,
    pub security_group_names: Vec<String>,
    pub preferred_cache_cluster_azs: Vec<String>,
    pub maintenance_window: Option<String>,
    pub notification_topic_arn: Option<String>,
    pub snapshot_arns: Vec<String>,
    pub snapshot_name: Option<String>,
    pub snapshot_window: Option<String>,
    pub snapshot_retention_limit: Option<u32>,
    pub kms_key_id: Option<String>,
    pub auth_token: Option<String>,
    pub user_group_ids: Vec<String>,
    pub tags: BTreeMap<String, String>,
}

/// Multi-attribute in-place update. The control plane applies every set
/// field in one call; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifyReplicationGroupInput {
    pub replication_group_id: String,
    pub apply_immediately: bool,
    pub automatic_failover_enabled: Option<bool>,
    pub multi_az_enabled: Option<bool>,
    pub description: Option<String>,
    pub cluster_mode: Option<ClusterMode>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub node_type: Option<String>,
    pub maintenance_window: Option<String>,
    pub notification_topic_arn: Option<String>,
    pub parameter_group_name: Option<String>,
    pub security_group_ids: Vec<String>,
    pub security_group_names: Vec<String>,
    pub snapshot_window: Option<String>,
    pub snapshot_retention_limit: Option<u32>,
    /// Which member performs backups; pinned to the first member when
    /// snapshotting is first enabled.
    pub snapshotting_cluster_id: Option<String>,
    pub transit_encryption_enabled: Option<bool>,
    pub transit_encryption_mode: Option<TransitEncryptionMode>,
    pub user_group_ids_to_add: Vec<String>,
    pub user_group_ids_to_remove: Vec<String>,
    pub auth_token: Option<String>,
    pub auth_token_update_strategy: Option<AuthTokenUpdateStrategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyShardConfigurationInput {
    pub replication_group_id: String,
    pub apply_immediately: bool,
    pub node_group_count: u32,
    /// Required when shrinking: the node group ids to retire.
    pub node_groups_to_remove: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReplicaCountInput {
    pub replication_group_id: String,
    pub apply_immediately: bool,
    pub new_replica_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReplicationGroupInput {
    pub replication_group_id: String,
    pub final_snapshot_identifier: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisassociateGlobalGroupInput {
    pub global_group_id: String,
    pub replication_group_id: String,
    pub replication_group_region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeReplicationGroupsInput {
    pub replication_group_id: Option<String>,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeCacheClustersInput {
    pub cache_cluster_id: Option<String>,
    pub show_cache_node_info: bool,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeGlobalGroupsInput {
    pub global_group_id: Option<String>,
    pub show_member_info: bool,
    pub page_token: Option<String>,
}
