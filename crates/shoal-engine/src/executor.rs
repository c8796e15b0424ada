//! Operation execution
//!
//! Runs a planned operation list in order. Before each operation the group
//! must be available again; after each one the executor waits for the
//! mutation to settle before moving on. Replica count changes additionally
//! wait on every member cache cluster, since the group can report available
//! while members are still joining or draining.

use crate::clock::Clock;
use crate::error::Result;
use crate::planner::Operation;
use crate::waiter;
use shoal_remote::input::{
    ChangeReplicaCountInput, ModifyReplicationGroupInput, ModifyShardConfigurationInput,
};
use shoal_remote::CacheApi;
use std::time::Duration;

pub struct Executor<'a> {
    api: &'a dyn CacheApi,
    clock: &'a dyn Clock,
    id: &'a str,
    timeout: Duration,
}

impl<'a> Executor<'a> {
    pub fn new(
        api: &'a dyn CacheApi,
        clock: &'a dyn Clock,
        id: &'a str,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            clock,
            id,
            timeout,
        }
    }

    pub async fn run(&self, operations: &[Operation]) -> Result<()> {
        for operation in operations {
            tracing::debug!(
                id = self.id,
                operation = operation.describe(),
                "applying operation"
            );

            waiter::wait_replication_group_available(
                self.api,
                self.clock,
                self.id,
                self.timeout,
                Duration::ZERO,
            )
            .await?;

            self.execute(operation).await?;
            self.settle(operation).await?;
        }

        Ok(())
    }

    async fn execute(&self, operation: &Operation) -> Result<()> {
        let outcome = match operation {
            Operation::ResizeNodeGroups {
                node_group_count,
                node_groups_to_remove,
            } => {
                let input = ModifyShardConfigurationInput {
                    replication_group_id: self.id.to_string(),
                    apply_immediately: true,
                    node_group_count: *node_group_count,
                    node_groups_to_remove: node_groups_to_remove.clone(),
                };
                self.api.modify_shard_configuration(&input).await
            }
            Operation::IncreaseReplicas { new_replica_count } => {
                let input = ChangeReplicaCountInput {
                    replication_group_id: self.id.to_string(),
                    apply_immediately: true,
                    new_replica_count: *new_replica_count,
                };
                self.api.increase_replica_count(&input).await
            }
            Operation::DecreaseReplicas { new_replica_count } => {
                let input = ChangeReplicaCountInput {
                    replication_group_id: self.id.to_string(),
                    apply_immediately: true,
                    new_replica_count: *new_replica_count,
                };
                self.api.decrease_replica_count(&input).await
            }
            Operation::Modify(input) => {
                let input = ModifyReplicationGroupInput {
                    replication_group_id: self.id.to_string(),
                    ..(**input).clone()
                };
                self.api.modify_replication_group(&input).await
            }
            Operation::RotateAuthToken {
                auth_token,
                strategy,
            } => {
                // Credential changes always apply immediately.
                let input = ModifyReplicationGroupInput {
                    replication_group_id: self.id.to_string(),
                    apply_immediately: true,
                    auth_token: Some(auth_token.clone()),
                    auth_token_update_strategy: Some(*strategy),
                    ..Default::default()
                };
                self.api.modify_replication_group(&input).await
            }
        };

        match outcome {
            Ok(_) => Ok(()),
            Err(fault) if fault.is_no_modifications_requested() => {
                // The remote already matches the request.
                tracing::debug!(
                    id = self.id,
                    operation = operation.describe(),
                    "no modifications were requested"
                );
                Ok(())
            }
            Err(fault) => Err(fault.into()),
        }
    }

    async fn settle(&self, operation: &Operation) -> Result<()> {
        if matches!(
            operation,
            Operation::IncreaseReplicas { .. } | Operation::DecreaseReplicas { .. }
        ) {
            waiter::wait_member_clusters_available(self.api, self.clock, self.id, self.timeout)
                .await?;
        }

        waiter::wait_replication_group_available(
            self.api,
            self.clock,
            self.id,
            self.timeout,
            Duration::ZERO,
        )
        .await?;

        Ok(())
    }
}
