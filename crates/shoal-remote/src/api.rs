//! Control-plane API trait

use crate::fault::Result;
use crate::input::{
    ChangeReplicaCountInput, CreateReplicationGroupInput, DeleteReplicationGroupInput,
    DescribeCacheClustersInput, DescribeGlobalGroupsInput, DescribeReplicationGroupsInput,
    DisassociateGlobalGroupInput, ModifyReplicationGroupInput, ModifyShardConfigurationInput,
};
use crate::model::{CacheCluster, GlobalReplicationGroup, ReplicationGroup};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next_token: None }
    }
}

/// Typed bindings to the cache control plane.
///
/// Implementations own credentials, transport and endpoint resolution. All
/// mutation calls are asynchronous on the remote side: the returned object
/// snapshot reflects the accepted request, not the settled state — callers
/// poll a describe call until the object reaches the status they need.
#[async_trait]
pub trait CacheApi: Send + Sync {
    async fn create_replication_group(
        &self,
        input: &CreateReplicationGroupInput,
    ) -> Result<ReplicationGroup>;

    async fn modify_replication_group(
        &self,
        input: &ModifyReplicationGroupInput,
    ) -> Result<ReplicationGroup>;

    async fn modify_shard_configuration(
        &self,
        input: &ModifyShardConfigurationInput,
    ) -> Result<ReplicationGroup>;

    async fn increase_replica_count(
        &self,
        input: &ChangeReplicaCountInput,
    ) -> Result<ReplicationGroup>;

    async fn decrease_replica_count(
        &self,
        input: &ChangeReplicaCountInput,
    ) -> Result<ReplicationGroup>;

    async fn delete_replication_group(&self, input: &DeleteReplicationGroupInput) -> Result<()>;

    async fn describe_replication_groups(
        &self,
        input: &DescribeReplicationGroupsInput,
    ) -> Result<Page<ReplicationGroup>>;

    async fn describe_cache_clusters(
        &self,
        input: &DescribeCacheClustersInput,
    ) -> Result<Page<CacheCluster>>;

    async fn describe_global_groups(
        &self,
        input: &DescribeGlobalGroupsInput,
    ) -> Result<Page<GlobalReplicationGroup>>;

    async fn disassociate_global_group(&self, input: &DisassociateGlobalGroupInput) -> Result<()>;

    async fn add_tags(&self, resource_arn: &str, tags: &BTreeMap<String, String>) -> Result<()>;

    async fn remove_tags(&self, resource_arn: &str, keys: &[String]) -> Result<()>;

    async fn delete_parameter_group(&self, name: &str) -> Result<()>;
}
