//! Delete pass
//!
//! A member of a global group is disassociated first, tolerating "was never
//! associated". The delete itself is retried while the group is busy or the
//! control plane throttles, then the pass waits until the group is gone. A
//! group that turns out to be already gone is success, not an error.

use super::ReplicationGroupResource;
use crate::retry::retry_when;
use crate::waiter;
use shoal_core::{Diagnostics, ResourceData};
use shoal_remote::input::{DeleteReplicationGroupInput, DisassociateGlobalGroupInput};
use shoal_remote::RemoteFault;

const ACTION: &str = "deleting cache replication group";

pub(super) async fn delete(
    resource: &ReplicationGroupResource,
    data: &mut ResourceData,
) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let Some(id) = data.id().map(str::to_string) else {
        return diags;
    };

    let global_group_id = data.get_str("global_replication_group_id");
    if let Some(global_group_id) = &global_group_id {
        if let Err(err) = disassociate(resource, global_group_id, &id).await {
            diags.error_for(ACTION, &id, err);
            return diags;
        }

        if let Err(err) = waiter::wait_global_group_member_detached(
            resource.api.as_ref(),
            resource.clock.as_ref(),
            global_group_id,
            &id,
            data.timeouts().delete,
        )
        .await
        {
            diags.error_for(ACTION, &id, err);
            return diags;
        }
    }

    tracing::info!(id, "deleting cache replication group");

    let input = DeleteReplicationGroupInput {
        replication_group_id: id.clone(),
        final_snapshot_identifier: data.get_str("final_snapshot_identifier"),
    };
    let outcome = retry_when(
        resource.clock.as_ref(),
        super::DELETE_RETRY_WINDOW,
        || resource.api.delete_replication_group(&input),
        |fault| fault.is_invalid_state() || fault.is_throttled(),
    )
    .await;

    match outcome {
        Ok(()) => {
            if let Err(err) = waiter::wait_replication_group_deleted(
                resource.api.as_ref(),
                resource.clock.as_ref(),
                &id,
                data.timeouts().delete,
            )
            .await
            {
                diags.error_for(ACTION, &id, err);
                return diags;
            }
        }
        Err(fault) if fault.is_not_found() => {
            tracing::debug!(id, "cache replication group already deleted");
        }
        Err(fault) => {
            diags.error_for(ACTION, &id, fault);
            return diags;
        }
    }

    // A group created from a global group gets its own parameter group,
    // which the control plane does not clean up.
    if global_group_id.is_some() {
        if let Some(name) = data.get_str("parameter_group_name") {
            match resource.api.delete_parameter_group(&name).await {
                Ok(()) | Err(RemoteFault::NotFound { .. }) => {}
                Err(fault) => {
                    diags.error_for("deleting parameter group", &name, fault);
                    return diags;
                }
            }
        }
    }

    data.clear_id();
    diags
}

async fn disassociate(
    resource: &ReplicationGroupResource,
    global_group_id: &str,
    id: &str,
) -> shoal_remote::Result<()> {
    let input = DisassociateGlobalGroupInput {
        global_group_id: global_group_id.to_string(),
        replication_group_id: id.to_string(),
        replication_group_region: resource.region.clone(),
    };

    let outcome = retry_when(
        resource.clock.as_ref(),
        super::DELETE_RETRY_WINDOW,
        || resource.api.disassociate_global_group(&input),
        RemoteFault::is_invalid_state,
    )
    .await;

    match outcome {
        Ok(()) => Ok(()),
        // Already detached, or the association never completed.
        Err(fault) if fault.is_not_found() || fault.is_not_associated() => {
            tracing::debug!(id, global_group_id, "membership already removed");
            Ok(())
        }
        Err(fault) => Err(fault),
    }
}
