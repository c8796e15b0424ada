//! Create pass
//!
//! Validates the configuration, builds the create request (standalone or
//! derived from a global group), provisions the group and waits for it to
//! become available before flattening remote state back.

use super::ReplicationGroupResource;
use crate::waiter;
use serde_json::Value;
use shoal_core::{Diagnostics, ResourceData};
use shoal_remote::input::CreateReplicationGroupInput;
use shoal_remote::model::{ClusterMode, TransitEncryptionMode};
use shoal_remote::RemoteFault;
use std::collections::BTreeMap;

const ACTION: &str = "creating cache replication group";

pub(super) async fn create(
    resource: &ReplicationGroupResource,
    data: &mut ResourceData,
) -> Diagnostics {
    let mut diags = data.validate();
    diags.extend(super::validate_failover(data));
    if diags.has_errors() {
        return diags;
    }

    let Some(id) = data.get_str("replication_group_id") else {
        diags.error("\"replication_group_id\" is required");
        return diags;
    };

    let input = match build_create_input(data, &id) {
        Ok(input) => input,
        Err(message) => {
            diags.error(message);
            return diags;
        }
    };

    tracing::info!(id, "creating cache replication group");

    // Some partitions reject tags at creation time; fall back to creating
    // untagged and attach the tags once the group exists.
    let mut deferred_tags = BTreeMap::new();
    match resource.api.create_replication_group(&input).await {
        Ok(_) => {}
        Err(RemoteFault::UnsupportedInPartition(message)) if !input.tags.is_empty() => {
            tracing::warn!(id, %message, "tags unsupported at creation, retrying without");
            deferred_tags = input.tags.clone();
            let untagged = CreateReplicationGroupInput {
                tags: BTreeMap::new(),
                ..input
            };
            if let Err(fault) = resource.api.create_replication_group(&untagged).await {
                diags.error_for(ACTION, &id, fault);
                return diags;
            }
        }
        Err(fault) => {
            diags.error_for(ACTION, &id, fault);
            return diags;
        }
    }

    data.set_id(&id);

    let group = match waiter::wait_replication_group_available(
        resource.api.as_ref(),
        resource.clock.as_ref(),
        &id,
        data.timeouts().create,
        super::CREATE_INITIAL_DELAY,
    )
    .await
    {
        Ok(group) => group,
        Err(err) => {
            diags.error_for(ACTION, &id, err);
            return diags;
        }
    };

    // Joining a global group kicks off replication setup on the group
    // itself; wait for the whole constellation to settle.
    if let Some(global_group_id) = data.get_str("global_replication_group_id") {
        if let Err(err) = waiter::wait_global_group_available(
            resource.api.as_ref(),
            resource.clock.as_ref(),
            &global_group_id,
            super::GLOBAL_GROUP_AVAILABLE_TIMEOUT,
        )
        .await
        {
            diags.error_for(ACTION, &id, err);
            return diags;
        }
    }

    if !deferred_tags.is_empty() {
        match resource.api.add_tags(&group.arn, &deferred_tags).await {
            Ok(()) => {}
            Err(RemoteFault::UnsupportedInPartition(message)) => {
                // Partition genuinely has no tagging; keep the group.
                diags.push(shoal_core::Diagnostic::warning(format!(
                    "tagging is not supported in this partition: {message}"
                )));
            }
            Err(fault) => {
                diags.error_for(ACTION, &id, fault);
                return diags;
            }
        }
    }

    diags.extend(super::read::read(resource, data).await);
    diags
}

fn build_create_input(data: &ResourceData, id: &str) -> Result<CreateReplicationGroupInput, String> {
    let description = data
        .get_str("description")
        .ok_or_else(|| "\"description\" is required".to_string())?;

    let mut input = CreateReplicationGroupInput {
        replication_group_id: id.to_string(),
        description,
        ..Default::default()
    };

    if let Some(global_group_id) = data.get_str("global_replication_group_id") {
        // Engine, node type and encryption settings are inherited from the
        // global group's primary.
        input.global_group_id = Some(global_group_id);
    } else {
        let node_type = data.get_str("node_type").ok_or_else(|| {
            "\"node_type\" is required unless \"global_replication_group_id\" is set".to_string()
        })?;
        input.node_type = Some(node_type);
        input.engine = data.get_str("engine");
        input.engine_version = data.get_str("engine_version");
        input.parameter_group_name = data.get_str("parameter_group_name");
        input.at_rest_encryption_enabled = data.get_bool("at_rest_encryption_enabled");
        input.transit_encryption_enabled = data.get_bool("transit_encryption_enabled");
        input.transit_encryption_mode = match data.get_str("transit_encryption_mode").as_deref() {
            None => None,
            Some("preferred") => Some(TransitEncryptionMode::Preferred),
            Some("required") => Some(TransitEncryptionMode::Required),
            Some(other) => return Err(format!("invalid transit encryption mode {other:?}")),
        };
        input.security_group_names = data.get_str_list("security_group_names");
        input.snapshot_arns = data.get_str_list("snapshot_arns");
        input.snapshot_name = data.get_str("snapshot_name");
    }

    input.automatic_failover_enabled = data.get_bool("automatic_failover_enabled");
    input.multi_az_enabled = data.get_bool("multi_az_enabled");
    input.cluster_mode = match data.get_str("cluster_mode").as_deref() {
        None => None,
        Some("enabled") => Some(ClusterMode::Enabled),
        Some("disabled") => Some(ClusterMode::Disabled),
        Some("compatible") => Some(ClusterMode::Compatible),
        Some(other) => return Err(format!("invalid cluster mode {other:?}")),
    };
    input.num_cache_clusters = data.get_i64("num_cache_clusters").map(|n| n.max(0) as u32);
    input.num_node_groups = data.get_i64("num_node_groups").map(|n| n.max(0) as u32);
    input.replicas_per_node_group = data
        .get_i64("replicas_per_node_group")
        .map(|n| n.max(0) as u32);
    input.port = data.get_i64("port").map(|p| p as u16);
    input.subnet_group_name = data.get_str("subnet_group_name");
    input.security_group_ids = data.get_str_list("security_group_ids");
    input.preferred_cache_cluster_azs = data.get_str_list("preferred_cache_cluster_azs");
    input.maintenance_window = data.get_str("maintenance_window");
    input.notification_topic_arn = data.get_str("notification_topic_arn");
    input.snapshot_window = data.get_str("snapshot_window");
    input.snapshot_retention_limit = data
        .get_i64("snapshot_retention_limit")
        .map(|n| n.max(0) as u32);
    input.kms_key_id = data.get_str("kms_key_id");
    input.user_group_ids = data.get_str_list("user_group_ids");
    input.tags = data.get_str_map("tags");

    // The update strategy only applies to rotations; creation just sets
    // the token.
    input.auth_token = data.get_str("auth_token");

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configured(extra: &[(&str, Value)]) -> ResourceData {
        let mut data = ResourceData::new(ReplicationGroupResource::schema());
        data.set_config("replication_group_id", json!("tf-rg-01"));
        data.set_config("description", json!("test group"));
        for (name, value) in extra {
            data.set_config(name, value.clone());
        }
        data
    }

    #[test]
    fn test_standalone_requires_node_type() {
        let data = configured(&[]);
        let err = build_create_input(&data, "tf-rg-01").unwrap_err();
        assert!(err.contains("node_type"));
    }

    #[test]
    fn test_global_group_skips_inherited_fields() {
        let data = configured(&[("global_replication_group_id", json!("gg-main"))]);
        let input = build_create_input(&data, "tf-rg-01").unwrap();

        assert_eq!(input.global_group_id.as_deref(), Some("gg-main"));
        assert!(input.node_type.is_none());
        assert!(input.engine.is_none());
    }

    #[test]
    fn test_standalone_input_carries_topology() {
        let data = configured(&[
            ("node_type", json!("cache.m5.large")),
            ("num_node_groups", json!(2)),
            ("replicas_per_node_group", json!(1)),
            ("tags", json!({"team": "storage"})),
        ]);
        let input = build_create_input(&data, "tf-rg-01").unwrap();

        assert_eq!(input.node_type.as_deref(), Some("cache.m5.large"));
        assert_eq!(input.engine.as_deref(), Some("redis"));
        assert_eq!(input.num_node_groups, Some(2));
        assert_eq!(input.replicas_per_node_group, Some(1));
        assert_eq!(input.tags.get("team").map(String::as_str), Some("storage"));
    }
}
