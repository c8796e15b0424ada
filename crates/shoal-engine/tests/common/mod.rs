//! In-memory control plane for integration tests.
//!
//! Holds replication groups, their member cache clusters and global groups
//! behind one mutex. Mutations rebuild the member topology the way the real
//! control plane would; describe calls can serve a scripted status sequence
//! to exercise waiter paths. Every mutation call is recorded for ordering
//! assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use shoal_remote::input::{
    ChangeReplicaCountInput, CreateReplicationGroupInput, DeleteReplicationGroupInput,
    DescribeCacheClustersInput, DescribeGlobalGroupsInput, DescribeReplicationGroupsInput,
    DisassociateGlobalGroupInput, ModifyReplicationGroupInput, ModifyShardConfigurationInput,
};
use shoal_remote::model::{
    AutomaticFailoverStatus, CacheCluster, CacheClusterStatus, Endpoint,
    GlobalGroupMemberStatus, GlobalGroupStatus, GlobalReplicationGroup,
    GlobalReplicationGroupMember, MultiAzStatus, NodeGroup, NodeGroupMember, ReplicationGroup,
    ReplicationGroupStatus,
};
use shoal_remote::{CacheApi, Page, RemoteFault, Result, kinds};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct MockState {
    groups: Vec<ReplicationGroup>,
    clusters: Vec<CacheCluster>,
    global_groups: Vec<GlobalReplicationGroup>,
    page_size: Option<usize>,
    status_script: VecDeque<ReplicationGroupStatus>,
    global_status_script: VecDeque<GlobalGroupStatus>,
    global_describe_calls: u32,
    fail_create_with_tags: bool,
    delete_faults: VecDeque<RemoteFault>,
    modify_faults: VecDeque<RemoteFault>,
    modify_inputs: Vec<ModifyReplicationGroupInput>,
    calls: Vec<&'static str>,
    describe_calls: u32,
}

#[derive(Default)]
pub struct MockCacheApi {
    state: Mutex<MockState>,
}

impl MockCacheApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_group(&self, node_groups: usize, replicas: usize) {
        let mut state = self.state.lock().unwrap();
        let group = blank_group("tf-rg-01");
        state.groups.push(group);
        state.clusters.clear();
        let index = state.groups.len() - 1;
        rebuild_topology(&mut state, index, node_groups, replicas);
    }

    pub fn seed_groups(&self, ids: &[&str]) {
        let mut state = self.state.lock().unwrap();
        for id in ids {
            state.groups.push(blank_group(id));
        }
    }

    pub fn seed_global_group(&self, global_group_id: &str, member_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.global_groups.push(GlobalReplicationGroup {
            global_group_id: global_group_id.to_string(),
            status: GlobalGroupStatus::Available,
            members: vec![GlobalReplicationGroupMember {
                replication_group_id: member_id.to_string(),
                status: GlobalGroupMemberStatus::Associated,
            }],
        });
    }

    pub fn set_page_size(&self, size: usize) {
        self.state.lock().unwrap().page_size = Some(size);
    }

    pub fn script_statuses(&self, statuses: &[ReplicationGroupStatus]) {
        let mut state = self.state.lock().unwrap();
        state.status_script.extend(statuses.iter().copied());
    }

    pub fn script_global_statuses(&self, statuses: &[GlobalGroupStatus]) {
        let mut state = self.state.lock().unwrap();
        state.global_status_script.extend(statuses.iter().copied());
    }

    pub fn global_describe_calls(&self) -> u32 {
        self.state.lock().unwrap().global_describe_calls
    }

    pub fn fail_create_with_tags(&self) {
        self.state.lock().unwrap().fail_create_with_tags = true;
    }

    pub fn queue_delete_fault(&self, fault: RemoteFault) {
        self.state.lock().unwrap().delete_faults.push_back(fault);
    }

    pub fn queue_modify_fault(&self, fault: RemoteFault) {
        self.state.lock().unwrap().modify_faults.push_back(fault);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn describe_calls(&self) -> u32 {
        self.state.lock().unwrap().describe_calls
    }

    pub fn group(&self, id: &str) -> Option<ReplicationGroup> {
        let state = self.state.lock().unwrap();
        state
            .groups
            .iter()
            .find(|g| g.replication_group_id == id)
            .cloned()
    }

    pub fn modify_inputs(&self) -> Vec<ModifyReplicationGroupInput> {
        self.state.lock().unwrap().modify_inputs.clone()
    }
}

fn blank_group(id: &str) -> ReplicationGroup {
    ReplicationGroup {
        replication_group_id: id.to_string(),
        arn: format!("arn:cache:rg:{id}"),
        status: ReplicationGroupStatus::Available,
        description: "test group".to_string(),
        engine: "redis".to_string(),
        member_clusters: vec![],
        node_groups: vec![],
        cluster_enabled: false,
        cluster_mode: None,
        automatic_failover: AutomaticFailoverStatus::Disabled,
        multi_az: MultiAzStatus::Disabled,
        configuration_endpoint: None,
        snapshot_window: None,
        snapshot_retention_limit: 0,
        user_group_ids: vec![],
        global_group_id: None,
        kms_key_id: None,
        tags: BTreeMap::new(),
    }
}

/// Rebuild member clusters and node groups for a group, the way the control
/// plane does after a topology or replica change.
fn rebuild_topology(state: &mut MockState, index: usize, node_groups: usize, replicas: usize) {
    let id = state.groups[index].replication_group_id.clone();

    let mut member_ids = Vec::new();
    let mut shards = Vec::new();
    let mut next = 1;
    for shard in 1..=node_groups {
        let mut members = Vec::new();
        for _ in 0..=replicas {
            let member_id = format!("{id}-{next:03}");
            next += 1;
            member_ids.push(member_id.clone());
            members.push(NodeGroupMember {
                cache_cluster_id: member_id,
                cache_node_id: "0001".to_string(),
            });
        }
        shards.push(NodeGroup {
            node_group_id: format!("{shard:04}"),
            status: CacheClusterStatus::Available,
            primary_endpoint: Some(Endpoint {
                address: format!("{id}-{shard:04}.cache.internal"),
                port: 6379,
            }),
            reader_endpoint: None,
            members,
        });
    }

    state
        .clusters
        .retain(|c| !c.cache_cluster_id.starts_with(&id));
    for member_id in &member_ids {
        state.clusters.push(CacheCluster {
            cache_cluster_id: member_id.clone(),
            status: CacheClusterStatus::Available,
            node_type: "cache.m5.large".to_string(),
            engine: state.groups[index].engine.clone(),
            engine_version: "7.1.0".to_string(),
            parameter_group_name: Some("default.redis7".to_string()),
            maintenance_window: Some("sun:05:00-sun:06:00".to_string()),
            security_group_ids: vec![],
            security_group_names: vec![],
            at_rest_encryption_enabled: false,
            transit_encryption_enabled: false,
            transit_encryption_mode: None,
            auth_token_enabled: false,
        });
    }

    let group = &mut state.groups[index];
    group.member_clusters = member_ids;
    group.node_groups = shards;
}

fn group_index(state: &MockState, id: &str) -> Result<usize> {
    state
        .groups
        .iter()
        .position(|g| g.replication_group_id == id)
        .ok_or_else(|| RemoteFault::not_found(kinds::REPLICATION_GROUP, id))
}

#[async_trait]
impl CacheApi for MockCacheApi {
    async fn create_replication_group(
        &self,
        input: &CreateReplicationGroupInput,
    ) -> Result<ReplicationGroup> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("create");

        if state.fail_create_with_tags && !input.tags.is_empty() {
            return Err(RemoteFault::UnsupportedInPartition(
                "tagging on create is not supported".to_string(),
            ));
        }

        let mut group = blank_group(&input.replication_group_id);
        group.description = input.description.clone();
        if let Some(engine) = &input.engine {
            group.engine = engine.clone();
        }
        group.global_group_id = input.global_group_id.clone();
        group.tags = input.tags.clone();
        state.groups.push(group);

        let index = state.groups.len() - 1;
        let node_groups = input.num_node_groups.unwrap_or(1) as usize;
        let replicas = input
            .replicas_per_node_group
            .or_else(|| input.num_cache_clusters.map(|n| n.saturating_sub(1)))
            .unwrap_or(0) as usize;
        rebuild_topology(&mut state, index, node_groups, replicas);

        Ok(state.groups[index].clone())
    }

    async fn modify_replication_group(
        &self,
        input: &ModifyReplicationGroupInput,
    ) -> Result<ReplicationGroup> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("modify");
        state.modify_inputs.push(input.clone());

        if let Some(fault) = state.modify_faults.pop_front() {
            return Err(fault);
        }

        let index = group_index(&state, &input.replication_group_id)?;
        if let Some(description) = &input.description {
            state.groups[index].description = description.clone();
        }
        if let Some(engine) = &input.engine {
            state.groups[index].engine = engine.clone();
        }
        if let Some(limit) = input.snapshot_retention_limit {
            state.groups[index].snapshot_retention_limit = limit;
        }
        Ok(state.groups[index].clone())
    }

    async fn modify_shard_configuration(
        &self,
        input: &ModifyShardConfigurationInput,
    ) -> Result<ReplicationGroup> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("modify_shards");

        let index = group_index(&state, &input.replication_group_id)?;
        let replicas = state.groups[index]
            .node_groups
            .first()
            .map(|ng| ng.members.len().saturating_sub(1))
            .unwrap_or(0);
        rebuild_topology(&mut state, index, input.node_group_count as usize, replicas);
        Ok(state.groups[index].clone())
    }

    async fn increase_replica_count(
        &self,
        input: &ChangeReplicaCountInput,
    ) -> Result<ReplicationGroup> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("increase_replicas");

        let index = group_index(&state, &input.replication_group_id)?;
        let node_groups = state.groups[index].node_groups.len().max(1);
        rebuild_topology(&mut state, index, node_groups, input.new_replica_count as usize);
        Ok(state.groups[index].clone())
    }

    async fn decrease_replica_count(
        &self,
        input: &ChangeReplicaCountInput,
    ) -> Result<ReplicationGroup> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("decrease_replicas");

        let index = group_index(&state, &input.replication_group_id)?;
        let node_groups = state.groups[index].node_groups.len().max(1);
        rebuild_topology(&mut state, index, node_groups, input.new_replica_count as usize);
        Ok(state.groups[index].clone())
    }

    async fn delete_replication_group(&self, input: &DeleteReplicationGroupInput) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("delete");

        if let Some(fault) = state.delete_faults.pop_front() {
            return Err(fault);
        }

        let index = group_index(&state, &input.replication_group_id)?;
        let id = state.groups[index].replication_group_id.clone();
        state.groups.remove(index);
        state.clusters.retain(|c| !c.cache_cluster_id.starts_with(&id));
        Ok(())
    }

    async fn describe_replication_groups(
        &self,
        input: &DescribeReplicationGroupsInput,
    ) -> Result<Page<ReplicationGroup>> {
        let mut state = self.state.lock().unwrap();
        state.describe_calls += 1;

        if let Some(id) = &input.replication_group_id {
            let index = group_index(&state, id)?;
            if let Some(status) = state.status_script.pop_front() {
                state.groups[index].status = status;
            } else {
                state.groups[index].status = ReplicationGroupStatus::Available;
            }
            return Ok(Page::last(vec![state.groups[index].clone()]));
        }

        let page_size = state.page_size.unwrap_or(usize::MAX);
        let start: usize = input
            .page_token
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);
        let end = (start + page_size).min(state.groups.len());
        let next_token = (end < state.groups.len()).then(|| end.to_string());

        Ok(Page {
            items: state.groups[start..end].to_vec(),
            next_token,
        })
    }

    async fn describe_cache_clusters(
        &self,
        input: &DescribeCacheClustersInput,
    ) -> Result<Page<CacheCluster>> {
        let state = self.state.lock().unwrap();
        let items = state
            .clusters
            .iter()
            .filter(|c| match &input.cache_cluster_id {
                Some(id) => &c.cache_cluster_id == id,
                None => true,
            })
            .cloned()
            .collect();
        Ok(Page::last(items))
    }

    async fn describe_global_groups(
        &self,
        input: &DescribeGlobalGroupsInput,
    ) -> Result<Page<GlobalReplicationGroup>> {
        let mut state = self.state.lock().unwrap();
        state.global_describe_calls += 1;

        let status = state
            .global_status_script
            .pop_front()
            .unwrap_or(GlobalGroupStatus::Available);
        if let Some(global) = state.global_groups.first_mut() {
            global.status = status;
        }

        let items = state
            .global_groups
            .iter()
            .filter(|g| match &input.global_group_id {
                Some(id) => &g.global_group_id == id,
                None => true,
            })
            .cloned()
            .collect();
        Ok(Page::last(items))
    }

    async fn disassociate_global_group(&self, input: &DisassociateGlobalGroupInput) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("disassociate");

        let Some(global) = state
            .global_groups
            .iter_mut()
            .find(|g| g.global_group_id == input.global_group_id)
        else {
            return Err(RemoteFault::not_found(
                kinds::GLOBAL_GROUP,
                &input.global_group_id,
            ));
        };

        match global
            .members
            .iter_mut()
            .find(|m| m.replication_group_id == input.replication_group_id)
        {
            Some(member) => {
                member.status = GlobalGroupMemberStatus::Detached;
                Ok(())
            }
            None => Err(RemoteFault::InvalidParameterValue(format!(
                "{} is not associated with {}",
                input.replication_group_id, input.global_group_id
            ))),
        }
    }

    async fn add_tags(&self, resource_arn: &str, tags: &BTreeMap<String, String>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("add_tags");

        if let Some(group) = state.groups.iter_mut().find(|g| g.arn == resource_arn) {
            group.tags.extend(tags.clone());
        }
        Ok(())
    }

    async fn remove_tags(&self, resource_arn: &str, keys: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("remove_tags");

        if let Some(group) = state.groups.iter_mut().find(|g| g.arn == resource_arn) {
            for key in keys {
                group.tags.remove(key);
            }
        }
        Ok(())
    }

    async fn delete_parameter_group(&self, _name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("delete_parameter_group");
        Ok(())
    }
}
