//! Update planning
//!
//! Turns a frozen diff into an ordered list of typed operations. The order
//! is a hard contract:
//!
//! 1. Shard topology changes — replica counts are defined relative to the
//!    new topology.
//! 2. Replica count increases — add capacity before anything else mutates.
//! 3. One batched modify for every other changed attribute — the control
//!    plane accepts multi-attribute updates in a single call.
//! 4. Credential rotation — separate call with its own update strategy.
//! 5. Replica count decreases — shrinking before other changes settle could
//!    leave the group under-provisioned.
//!
//! Each executed operation must be followed by an availability wait before
//! the next one starts; the executor owns that part of the contract.

use crate::error::{EngineError, Result};
use shoal_core::ResourceData;
use shoal_remote::input::ModifyReplicationGroupInput;
use shoal_remote::model::{AuthTokenUpdateStrategy, ClusterMode, TransitEncryptionMode};

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    ResizeNodeGroups {
        node_group_count: u32,
        node_groups_to_remove: Vec<String>,
    },
    IncreaseReplicas {
        new_replica_count: u32,
    },
    Modify(Box<ModifyReplicationGroupInput>),
    RotateAuthToken {
        auth_token: String,
        strategy: AuthTokenUpdateStrategy,
    },
    DecreaseReplicas {
        new_replica_count: u32,
    },
}

impl Operation {
    pub fn ordering_class(&self) -> u8 {
        match self {
            Operation::ResizeNodeGroups { .. } => 0,
            Operation::IncreaseReplicas { .. } => 1,
            Operation::Modify(_) => 2,
            Operation::RotateAuthToken { .. } => 3,
            Operation::DecreaseReplicas { .. } => 4,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Operation::ResizeNodeGroups { .. } => "shard configuration change",
            Operation::IncreaseReplicas { .. } => "replica count increase",
            Operation::Modify(_) => "attribute modification",
            Operation::RotateAuthToken { .. } => "credential rotation",
            Operation::DecreaseReplicas { .. } => "replica count decrease",
        }
    }
}

/// Compute the ordered operation list for one update pass.
///
/// Reads the diff exactly once; validation failures (incompatible engine
/// change, missing conditionally-required attributes) surface before any
/// remote call is made.
pub fn plan(data: &ResourceData) -> Result<Vec<Operation>> {
    let id = data
        .id()
        .ok_or_else(|| EngineError::Validation("cannot plan without an identifier".to_string()))?
        .to_string();

    let mut operations = Vec::new();

    if data.has_change("num_node_groups") {
        let (old, new) = int_change(data, "num_node_groups");
        let mut node_groups_to_remove = Vec::new();
        if old > new {
            // Node group ids are 1-indexed, zero-padded to four digits.
            // Retire the highest-numbered groups first, down to the new count.
            for i in ((new + 1)..=old).rev() {
                node_groups_to_remove.push(format!("{i:04}"));
            }
        }
        operations.push(Operation::ResizeNodeGroups {
            node_group_count: new.max(0) as u32,
            node_groups_to_remove,
        });
    }

    if data.has_change("replicas_per_node_group") {
        let (old, new) = int_change(data, "replicas_per_node_group");
        if new > old {
            operations.push(Operation::IncreaseReplicas {
                new_replica_count: new.max(0) as u32,
            });
        } else if new < old {
            operations.push(Operation::DecreaseReplicas {
                new_replica_count: new.max(0) as u32,
            });
        }
    } else if data.has_change("num_cache_clusters") {
        // Non-cluster mode: one primary plus (count - 1) replicas.
        let (old, new) = int_change(data, "num_cache_clusters");
        if new > old {
            operations.push(Operation::IncreaseReplicas {
                new_replica_count: (new - 1).max(0) as u32,
            });
        } else if new < old {
            operations.push(Operation::DecreaseReplicas {
                new_replica_count: (new - 1).max(0) as u32,
            });
        }
    }

    if let Some(input) = build_modify_input(data, &id)? {
        operations.push(Operation::Modify(Box::new(input)));
    }

    if data.has_changes(&["auth_token", "auth_token_update_strategy"]) {
        let auth_token = data.get_str("auth_token").ok_or_else(|| {
            EngineError::Validation(
                "\"auth_token\" must be set when rotating credentials".to_string(),
            )
        })?;
        let strategy = match data.get_str("auth_token_update_strategy") {
            Some(s) => s.parse().map_err(EngineError::Validation)?,
            None => AuthTokenUpdateStrategy::Rotate,
        };
        operations.push(Operation::RotateAuthToken {
            auth_token,
            strategy,
        });
    }

    // Stable sort: operations constructed above keep their relative order
    // inside each class.
    operations.sort_by_key(Operation::ordering_class);

    Ok(operations)
}

/// Batch every changed modifiable attribute into a single modify input.
/// Returns `None` when no such attribute changed.
fn build_modify_input(
    data: &ResourceData,
    id: &str,
) -> Result<Option<ModifyReplicationGroupInput>> {
    let mut input = ModifyReplicationGroupInput {
        replication_group_id: id.to_string(),
        apply_immediately: data.get_bool("apply_immediately").unwrap_or(false),
        ..Default::default()
    };
    let mut requested = false;

    if data.has_change("engine") {
        let (old, new) = data.get_change("engine");
        let old = old.and_then(|v| v.as_str().map(str::to_lowercase));
        let new = new.and_then(|v| v.as_str().map(str::to_lowercase));

        // Engine family changes are one-way.
        if old.as_deref() == Some("redis") && new.as_deref() == Some("valkey") {
            if !data.has_change("engine_version") {
                return Err(EngineError::Validation(
                    "\"engine_version\" must be set explicitly when changing \"engine\" to \"valkey\""
                        .to_string(),
                ));
            }
            input.engine = new;
            requested = true;
        } else {
            return Err(EngineError::Validation(format!(
                "\"engine\" can only be changed from \"redis\" to \"valkey\", not {:?} to {:?}",
                old.unwrap_or_default(),
                new.unwrap_or_default()
            )));
        }
    }

    if data.has_change("automatic_failover_enabled") {
        input.automatic_failover_enabled = data.get_bool("automatic_failover_enabled");
        requested = true;
    }

    if data.has_change("multi_az_enabled") {
        input.multi_az_enabled = data.get_bool("multi_az_enabled");
        requested = true;
    }

    if data.has_change("description") {
        input.description = data.get_str("description");
        requested = true;
    }

    if data.has_change("cluster_mode") {
        input.cluster_mode = parse_cluster_mode(data)?;
        requested = true;
    }

    if data.has_change("engine_version") {
        input.engine_version = data.get_str("engine_version");
        requested = true;
    }

    if data.has_change("maintenance_window") {
        input.maintenance_window = data.get_str("maintenance_window");
        requested = true;
    }

    if data.has_change("node_type") {
        input.node_type = data.get_str("node_type");
        requested = true;
    }

    if data.has_change("notification_topic_arn") {
        input.notification_topic_arn = data.get_str("notification_topic_arn");
        requested = true;
    }

    if data.has_change("parameter_group_name") {
        input.parameter_group_name = data.get_str("parameter_group_name");
        requested = true;
    }

    if data.has_change("security_group_ids") {
        let ids = data.get_str_list("security_group_ids");
        if !ids.is_empty() {
            input.security_group_ids = ids;
            requested = true;
        }
    }

    if data.has_change("security_group_names") {
        let names = data.get_str_list("security_group_names");
        if !names.is_empty() {
            input.security_group_names = names;
            requested = true;
        }
    }

    if data.has_change("snapshot_retention_limit") {
        let (old, new) = int_change(data, "snapshot_retention_limit");
        if old == 0 {
            // First member performs the backups once snapshotting turns on.
            input.snapshotting_cluster_id = Some(format!("{id}-001"));
        }
        input.snapshot_retention_limit = Some(new.max(0) as u32);
        requested = true;
    }

    if data.has_change("snapshot_window") {
        input.snapshot_window = data.get_str("snapshot_window");
        requested = true;
    }

    if data.has_change("transit_encryption_enabled") {
        input.transit_encryption_enabled = data.get_bool("transit_encryption_enabled");
        requested = true;
    }

    if data.has_change("transit_encryption_mode") {
        if let Some(mode) = data.get_str("transit_encryption_mode") {
            input.transit_encryption_mode = Some(match mode.as_str() {
                "preferred" => TransitEncryptionMode::Preferred,
                "required" => TransitEncryptionMode::Required,
                other => {
                    return Err(EngineError::Validation(format!(
                        "invalid transit encryption mode {other:?}"
                    )));
                }
            });
            requested = true;
        }
    }

    if data.has_change("user_group_ids") {
        let (old, new) = data.get_change("user_group_ids");
        let old = shoal_core::data::str_list(old);
        let new = shoal_core::data::str_list(new);

        let to_add: Vec<String> = new.iter().filter(|v| !old.contains(v)).cloned().collect();
        let to_remove: Vec<String> = old.iter().filter(|v| !new.contains(v)).cloned().collect();

        if !to_add.is_empty() {
            input.user_group_ids_to_add = to_add;
            requested = true;
        }
        if !to_remove.is_empty() {
            input.user_group_ids_to_remove = to_remove;
            requested = true;
        }
    }

    Ok(requested.then_some(input))
}

fn parse_cluster_mode(data: &ResourceData) -> Result<Option<ClusterMode>> {
    match data.get_str("cluster_mode").as_deref() {
        None => Ok(None),
        Some("enabled") => Ok(Some(ClusterMode::Enabled)),
        Some("disabled") => Ok(Some(ClusterMode::Disabled)),
        Some("compatible") => Ok(Some(ClusterMode::Compatible)),
        Some(other) => Err(EngineError::Validation(format!(
            "invalid cluster mode {other:?}"
        ))),
    }
}

fn int_change(data: &ResourceData, name: &str) -> (i64, i64) {
    let (old, new) = data.get_change(name);
    (
        old.and_then(|v| v.as_i64()).unwrap_or(0),
        new.and_then(|v| v.as_i64()).unwrap_or(0),
    )
}
