//! Read pass
//!
//! Refreshes state from the remote group. A group deleted out of band is a
//! warning, not an error: the identifier is cleared so the next pass plans a
//! fresh create. Node type, actual engine version, security groups and
//! encryption settings are only reported on member cache clusters, so the
//! pass finishes with a secondary lookup against the first member.

use super::ReplicationGroupResource;
use crate::finder;
use crate::waiter;
use serde_json::json;
use shoal_core::{Diagnostics, ResourceData};
use shoal_remote::input::DescribeCacheClustersInput;
use shoal_remote::model::{
    AutomaticFailoverStatus, CacheCluster, MultiAzStatus, ReplicationGroup,
    ReplicationGroupStatus,
};

const ACTION: &str = "reading cache replication group";

pub(super) async fn read(
    resource: &ReplicationGroupResource,
    data: &mut ResourceData,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let Some(id) = data.id().map(str::to_string) else {
        return diags;
    };

    let group = match finder::find_replication_group_by_id(resource.api.as_ref(), &id).await {
        Ok(group) => group,
        Err(err) if err.is_not_found() && !data.is_new() => {
            tracing::warn!(id, "cache replication group not found, removing from state");
            diags.warning(format!(
                "cache replication group ({id}) not found, removing from state"
            ));
            data.clear_id();
            return diags;
        }
        Err(err) => {
            diags.error_for(ACTION, &id, err);
            return diags;
        }
    };

    // A group caught mid-transition settles shortly; flatten the settled
    // state rather than a snapshot of the transition.
    let group = if matches!(
        group.status,
        ReplicationGroupStatus::Creating
            | ReplicationGroupStatus::Modifying
            | ReplicationGroupStatus::Snapshotting
    ) {
        match waiter::wait_replication_group_available(
            resource.api.as_ref(),
            resource.clock.as_ref(),
            &id,
            data.timeouts().update,
            std::time::Duration::ZERO,
        )
        .await
        {
            Ok(group) => group,
            Err(err) => {
                diags.error_for(ACTION, &id, err);
                return diags;
            }
        }
    } else {
        group
    };

    if group.status == ReplicationGroupStatus::Deleting {
        tracing::warn!(id, "cache replication group is being deleted, removing from state");
        diags.warning(format!(
            "cache replication group ({id}) is being deleted, removing from state"
        ));
        data.clear_id();
        return diags;
    }

    flatten(data, &group);

    // Group-level describe omits per-node settings; read them off the first
    // member cache cluster.
    if let Some(member_id) = group.member_clusters.first() {
        let input = DescribeCacheClustersInput {
            cache_cluster_id: Some(member_id.clone()),
            show_cache_node_info: true,
            ..Default::default()
        };
        match finder::find_cache_clusters(resource.api.as_ref(), input, |_| true).await {
            Ok(clusters) => {
                if let Some(cluster) = clusters.first() {
                    flatten_member(data, cluster);
                }
            }
            Err(err) => {
                diags.error_for(ACTION, &id, err);
                return diags;
            }
        }
    }

    diags
}

fn flatten(data: &mut ResourceData, group: &ReplicationGroup) {
    data.set("replication_group_id", json!(group.replication_group_id));
    data.set("arn", json!(group.arn));
    data.set("description", json!(group.description));
    data.set("engine", json!(group.engine));
    data.set("cluster_enabled", json!(group.cluster_enabled));
    if let Some(mode) = group.cluster_mode {
        data.set("cluster_mode", json!(mode.as_str()));
    }

    data.set(
        "automatic_failover_enabled",
        json!(matches!(
            group.automatic_failover,
            AutomaticFailoverStatus::Enabled | AutomaticFailoverStatus::Enabling
        )),
    );
    data.set(
        "multi_az_enabled",
        json!(group.multi_az == MultiAzStatus::Enabled),
    );

    data.set("member_clusters", json!(group.member_clusters));
    data.set("num_cache_clusters", json!(group.member_clusters.len()));
    data.set("num_node_groups", json!(group.node_groups.len()));
    if let Some(first) = group.node_groups.first() {
        data.set(
            "replicas_per_node_group",
            json!(first.members.len().saturating_sub(1)),
        );
    }

    data.set(
        "snapshot_retention_limit",
        json!(group.snapshot_retention_limit),
    );
    match &group.snapshot_window {
        Some(window) => data.set("snapshot_window", json!(window)),
        None => data.clear("snapshot_window"),
    }

    data.set("user_group_ids", json!(group.user_group_ids));
    match &group.global_group_id {
        Some(global_id) => data.set("global_replication_group_id", json!(global_id)),
        None => data.clear("global_replication_group_id"),
    }
    if let Some(kms_key_id) = &group.kms_key_id {
        data.set("kms_key_id", json!(kms_key_id));
    }
    data.set("tags", json!(group.tags));

    // Cluster-enabled groups expose a single configuration endpoint; others
    // expose per-shard primary and reader endpoints.
    if let Some(endpoint) = &group.configuration_endpoint {
        data.set("configuration_endpoint_address", json!(endpoint.address));
        data.set("port", json!(endpoint.port));
        data.clear("primary_endpoint_address");
        data.clear("reader_endpoint_address");
    } else if let Some(first) = group.node_groups.first() {
        if let Some(endpoint) = &first.primary_endpoint {
            data.set("primary_endpoint_address", json!(endpoint.address));
            data.set("port", json!(endpoint.port));
        }
        if let Some(endpoint) = &first.reader_endpoint {
            data.set("reader_endpoint_address", json!(endpoint.address));
        }
        data.clear("configuration_endpoint_address");
    }
}

fn flatten_member(data: &mut ResourceData, cluster: &CacheCluster) {
    data.set("node_type", json!(cluster.node_type));
    data.set("engine_version", json!(cluster.engine_version));
    data.set("engine_version_actual", json!(cluster.engine_version));
    if let Some(name) = &cluster.parameter_group_name {
        data.set("parameter_group_name", json!(name));
    }
    if let Some(window) = &cluster.maintenance_window {
        data.set("maintenance_window", json!(window));
    }
    data.set("security_group_ids", json!(cluster.security_group_ids));
    data.set("security_group_names", json!(cluster.security_group_names));
    data.set(
        "at_rest_encryption_enabled",
        json!(cluster.at_rest_encryption_enabled),
    );
    data.set(
        "transit_encryption_enabled",
        json!(cluster.transit_encryption_enabled),
    );
    if let Some(mode) = cluster.transit_encryption_mode {
        data.set("transit_encryption_mode", json!(mode.as_str()));
    }

    // A token cannot be read back; all we can observe is whether one is set.
    if !cluster.auth_token_enabled {
        data.clear("auth_token");
    }
}
