//! Update pass
//!
//! In-place changes go through the planner and executor; tag changes are
//! applied directly since they never disturb availability. Both finish with
//! a Read so state reflects what the remote actually settled on.

use super::ReplicationGroupResource;
use crate::executor::Executor;
use crate::planner;
use serde_json::Value;
use shoal_core::{Diagnostics, ResourceData};
use std::collections::BTreeMap;

const ACTION: &str = "updating cache replication group";

pub(super) async fn update(
    resource: &ReplicationGroupResource,
    data: &mut ResourceData,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let Some(id) = data.id().map(str::to_string) else {
        diags.error("cannot update a cache replication group without an identifier");
        return diags;
    };

    if data.has_changes_except(&["tags", "apply_immediately", "final_snapshot_identifier"]) {
        diags.extend(super::validate_failover(data));
        if diags.has_errors() {
            return diags;
        }

        let operations = match planner::plan(data) {
            Ok(operations) => operations,
            Err(err) => {
                diags.error_for(ACTION, &id, err);
                return diags;
            }
        };

        if !operations.is_empty() {
            tracing::info!(id, count = operations.len(), "applying planned operations");
            let executor = Executor::new(
                resource.api.as_ref(),
                resource.clock.as_ref(),
                &id,
                data.timeouts().update,
            );
            if let Err(err) = executor.run(&operations).await {
                diags.error_for(ACTION, &id, err);
                return diags;
            }
        }
    }

    if data.has_change("tags") {
        if let Err(err) = update_tags(resource, data, &id).await {
            diags.error_for("updating tags for cache replication group", &id, err);
            return diags;
        }
    }

    diags.extend(super::read::read(resource, data).await);
    diags
}

async fn update_tags(
    resource: &ReplicationGroupResource,
    data: &ResourceData,
    id: &str,
) -> shoal_remote::Result<()> {
    let Some(arn) = data.get_str("arn") else {
        tracing::warn!(id, "no ARN in state, skipping tag update");
        return Ok(());
    };

    let (old, new) = data.get_change("tags");
    let old = str_map(old);
    let new = str_map(new);

    let removed: Vec<String> = old
        .keys()
        .filter(|key| !new.contains_key(*key))
        .cloned()
        .collect();
    let added: BTreeMap<String, String> = new
        .into_iter()
        .filter(|(key, value)| old.get(key) != Some(value))
        .collect();

    if !removed.is_empty() {
        resource.api.remove_tags(&arn, &removed).await?;
    }
    if !added.is_empty() {
        resource.api.add_tags(&arn, &added).await?;
    }

    Ok(())
}

fn str_map(value: Option<Value>) -> BTreeMap<String, String> {
    value
        .and_then(|v| match v {
            Value::Object(map) => Some(
                map.into_iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}
