//! Status polling
//!
//! A single-threaded poll loop: each tick refreshes the remote object and
//! classifies its status as pending (keep waiting), target (done) or
//! unlisted (fail). Newly created or modified objects may lag in listing
//! consistency, so waits can start with an initial delay; the inter-poll
//! interval is independent of the overall timeout. On deadline expiry the
//! loop returns an explicit timeout error naming the last observed status —
//! never a silent success.

use crate::clock::Clock;
use crate::error::{EngineError, Result};
use crate::finder;
use async_trait::async_trait;
use shoal_remote::model::{
    CacheCluster, CacheClusterStatus, GlobalGroupMemberStatus, GlobalGroupStatus,
    GlobalReplicationGroup, ReplicationGroup, ReplicationGroupStatus,
};
use shoal_remote::{CacheApi, kinds};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub initial_delay: Duration,
    pub poll_interval: Duration,
}

impl WaitConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            initial_delay: Duration::ZERO,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }
}

/// Classification of one observed status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Pending,
    Target,
    Unlisted,
}

/// One poll result: the object snapshot (when the remote had one), its
/// classification, and the status label used in error messages.
#[derive(Debug)]
pub struct Observation<T> {
    pub object: Option<T>,
    pub class: StatusClass,
    pub status: String,
}

#[async_trait]
pub trait StatusPoll: Send + Sync {
    type Object: Send;

    async fn poll(&self) -> Result<Observation<Self::Object>>;
}

/// Drive a poll to its target state.
///
/// `Ok(None)` is only possible for polls whose target is the absence of the
/// object (deletion, detachment).
pub async fn wait_for<P: StatusPoll + ?Sized>(
    poll: &P,
    clock: &dyn Clock,
    config: WaitConfig,
) -> Result<Option<P::Object>> {
    let deadline = clock.now() + config.timeout;

    if !config.initial_delay.is_zero() {
        clock.sleep(config.initial_delay).await;
    }

    loop {
        let observation = poll.poll().await?;

        match observation.class {
            StatusClass::Target => return Ok(observation.object),
            StatusClass::Unlisted => {
                return Err(EngineError::UnexpectedStatus {
                    status: observation.status,
                });
            }
            StatusClass::Pending => {}
        }

        if clock.now() >= deadline {
            return Err(EngineError::WaitTimeout {
                status: observation.status,
            });
        }

        tracing::debug!(status = %observation.status, "still pending, polling again");
        clock.sleep(config.poll_interval).await;
    }
}

// --- concrete polls ---

struct ReplicationGroupAvailable<'a> {
    api: &'a dyn CacheApi,
    id: &'a str,
}

#[async_trait]
impl StatusPoll for ReplicationGroupAvailable<'_> {
    type Object = ReplicationGroup;

    async fn poll(&self) -> Result<Observation<ReplicationGroup>> {
        match finder::find_replication_group_by_id(self.api, self.id).await {
            Ok(group) => {
                let class = match group.status {
                    ReplicationGroupStatus::Available => StatusClass::Target,
                    ReplicationGroupStatus::Creating
                    | ReplicationGroupStatus::Modifying
                    | ReplicationGroupStatus::Snapshotting => StatusClass::Pending,
                    _ => StatusClass::Unlisted,
                };
                Ok(Observation {
                    status: group.status.to_string(),
                    object: Some(group),
                    class,
                })
            }
            // Freshly created groups can lag in the listing.
            Err(err) if err.is_not_found() => Ok(Observation {
                object: None,
                class: StatusClass::Pending,
                status: "not-found".to_string(),
            }),
            Err(err) => Err(err),
        }
    }
}

pub async fn wait_replication_group_available(
    api: &dyn CacheApi,
    clock: &dyn Clock,
    id: &str,
    timeout: Duration,
    initial_delay: Duration,
) -> Result<ReplicationGroup> {
    let poll = ReplicationGroupAvailable { api, id };
    let config = WaitConfig::new(timeout).with_initial_delay(initial_delay);

    wait_for(&poll, clock, config)
        .await?
        .ok_or_else(|| EngineError::not_found(kinds::REPLICATION_GROUP, id))
}

struct ReplicationGroupDeleted<'a> {
    api: &'a dyn CacheApi,
    id: &'a str,
}

#[async_trait]
impl StatusPoll for ReplicationGroupDeleted<'_> {
    type Object = ReplicationGroup;

    async fn poll(&self) -> Result<Observation<ReplicationGroup>> {
        match finder::find_replication_group_by_id(self.api, self.id).await {
            Ok(group) => {
                let class = match group.status {
                    ReplicationGroupStatus::Creating
                    | ReplicationGroupStatus::Available
                    | ReplicationGroupStatus::Modifying
                    | ReplicationGroupStatus::Deleting => StatusClass::Pending,
                    _ => StatusClass::Unlisted,
                };
                Ok(Observation {
                    status: group.status.to_string(),
                    object: Some(group),
                    class,
                })
            }
            Err(err) if err.is_not_found() => Ok(Observation {
                object: None,
                class: StatusClass::Target,
                status: "deleted".to_string(),
            }),
            Err(err) => Err(err),
        }
    }
}

pub async fn wait_replication_group_deleted(
    api: &dyn CacheApi,
    clock: &dyn Clock,
    id: &str,
    timeout: Duration,
) -> Result<()> {
    let poll = ReplicationGroupDeleted { api, id };
    let config = WaitConfig::new(timeout).with_initial_delay(Duration::from_secs(30));

    wait_for(&poll, clock, config).await?;
    Ok(())
}

struct MemberClustersAvailable<'a> {
    api: &'a dyn CacheApi,
    id: &'a str,
}

#[async_trait]
impl StatusPoll for MemberClustersAvailable<'_> {
    type Object = Vec<CacheCluster>;

    async fn poll(&self) -> Result<Observation<Vec<CacheCluster>>> {
        match finder::find_member_clusters(self.api, self.id).await {
            Ok(clusters) => {
                // Report the first member still in flight; the end state is
                // every member available.
                let status = clusters
                    .iter()
                    .map(|c| c.status)
                    .find(|s| *s != CacheClusterStatus::Available)
                    .unwrap_or(CacheClusterStatus::Available);
                let class = match status {
                    CacheClusterStatus::Available => StatusClass::Target,
                    _ => StatusClass::Pending,
                };
                Ok(Observation {
                    object: Some(clusters),
                    class,
                    status: status.to_string(),
                })
            }
            Err(err) if err.is_not_found() => Ok(Observation {
                object: None,
                class: StatusClass::Pending,
                status: "not-found".to_string(),
            }),
            Err(err) => Err(err),
        }
    }
}

pub async fn wait_member_clusters_available(
    api: &dyn CacheApi,
    clock: &dyn Clock,
    id: &str,
    timeout: Duration,
) -> Result<Vec<CacheCluster>> {
    let poll = MemberClustersAvailable { api, id };
    let config = WaitConfig::new(timeout);

    wait_for(&poll, clock, config)
        .await?
        .ok_or_else(|| EngineError::not_found(kinds::REPLICATION_GROUP, id))
}

struct GlobalGroupAvailable<'a> {
    api: &'a dyn CacheApi,
    id: &'a str,
}

#[async_trait]
impl StatusPoll for GlobalGroupAvailable<'_> {
    type Object = GlobalReplicationGroup;

    async fn poll(&self) -> Result<Observation<GlobalReplicationGroup>> {
        match finder::find_global_group_by_id(self.api, self.id).await {
            Ok(group) => {
                let class = match group.status {
                    GlobalGroupStatus::Available | GlobalGroupStatus::PrimaryOnly => {
                        StatusClass::Target
                    }
                    GlobalGroupStatus::Creating | GlobalGroupStatus::Modifying => {
                        StatusClass::Pending
                    }
                    _ => StatusClass::Unlisted,
                };
                Ok(Observation {
                    status: group.status.to_string(),
                    object: Some(group),
                    class,
                })
            }
            Err(err) if err.is_not_found() => Ok(Observation {
                object: None,
                class: StatusClass::Pending,
                status: "not-found".to_string(),
            }),
            Err(err) => Err(err),
        }
    }
}

pub async fn wait_global_group_available(
    api: &dyn CacheApi,
    clock: &dyn Clock,
    id: &str,
    timeout: Duration,
) -> Result<GlobalReplicationGroup> {
    let poll = GlobalGroupAvailable { api, id };
    let config = WaitConfig::new(timeout);

    wait_for(&poll, clock, config)
        .await?
        .ok_or_else(|| EngineError::not_found(kinds::GLOBAL_GROUP, id))
}

struct GlobalGroupMemberDetached<'a> {
    api: &'a dyn CacheApi,
    global_group_id: &'a str,
    member_id: &'a str,
}

#[async_trait]
impl StatusPoll for GlobalGroupMemberDetached<'_> {
    type Object = GlobalReplicationGroup;

    async fn poll(&self) -> Result<Observation<GlobalReplicationGroup>> {
        match finder::find_global_group_by_id(self.api, self.global_group_id).await {
            Ok(group) => {
                let member_status = group
                    .members
                    .iter()
                    .find(|m| m.replication_group_id == self.member_id)
                    .map(|m| m.status);
                let (class, status) = match member_status {
                    None | Some(GlobalGroupMemberStatus::Detached) => {
                        (StatusClass::Target, "detached".to_string())
                    }
                    Some(status) => (StatusClass::Pending, status.to_string()),
                };
                Ok(Observation {
                    object: Some(group),
                    class,
                    status,
                })
            }
            // The whole global group being gone counts as detached.
            Err(err) if err.is_not_found() => Ok(Observation {
                object: None,
                class: StatusClass::Target,
                status: "detached".to_string(),
            }),
            Err(err) => Err(err),
        }
    }
}

pub async fn wait_global_group_member_detached(
    api: &dyn CacheApi,
    clock: &dyn Clock,
    global_group_id: &str,
    member_id: &str,
    timeout: Duration,
) -> Result<()> {
    let poll = GlobalGroupMemberDetached {
        api,
        global_group_id,
        member_id,
    };
    let config = WaitConfig::new(timeout);

    wait_for(&poll, clock, config).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedPoll {
        script: Mutex<VecDeque<(StatusClass, &'static str)>>,
        polls: Mutex<u32>,
    }

    impl ScriptedPoll {
        fn new(script: &[(StatusClass, &'static str)]) -> Self {
            Self {
                script: Mutex::new(script.iter().copied().collect()),
                polls: Mutex::new(0),
            }
        }

        fn polls(&self) -> u32 {
            *self.polls.lock().unwrap()
        }
    }

    #[async_trait]
    impl StatusPoll for ScriptedPoll {
        type Object = &'static str;

        async fn poll(&self) -> Result<Observation<&'static str>> {
            *self.polls.lock().unwrap() += 1;
            let (class, status) = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((StatusClass::Pending, "creating"));
            Ok(Observation {
                object: Some("object"),
                class,
                status: status.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_reaches_target_within_three_polls() {
        let poll = ScriptedPoll::new(&[
            (StatusClass::Pending, "creating"),
            (StatusClass::Pending, "creating"),
            (StatusClass::Target, "available"),
        ]);
        let clock = ManualClock::new();

        let result = wait_for(&poll, &clock, WaitConfig::new(Duration::from_secs(600)))
            .await
            .unwrap();

        assert_eq!(result, Some("object"));
        assert_eq!(poll.polls(), 3);
    }

    #[tokio::test]
    async fn test_timeout_reports_last_status() {
        let poll = ScriptedPoll::new(&[]);
        let clock = ManualClock::new();

        let err = wait_for(&poll, &clock, WaitConfig::new(Duration::from_secs(30)))
            .await
            .unwrap_err();

        match err {
            EngineError::WaitTimeout { status } => assert_eq!(status, "creating"),
            other => panic!("expected timeout, got {other:?}"),
        }
        // 30s budget with 10s polls: t=0, 10, 20, 30.
        assert_eq!(poll.polls(), 4);
    }

    #[tokio::test]
    async fn test_unlisted_status_fails_fast() {
        let poll = ScriptedPoll::new(&[(StatusClass::Unlisted, "create-failed")]);
        let clock = ManualClock::new();

        let err = wait_for(&poll, &clock, WaitConfig::new(Duration::from_secs(600)))
            .await
            .unwrap_err();

        match err {
            EngineError::UnexpectedStatus { status } => assert_eq!(status, "create-failed"),
            other => panic!("expected unexpected-status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_initial_delay_consumes_budget() {
        let poll = ScriptedPoll::new(&[]);
        let clock = ManualClock::new();
        let config = WaitConfig::new(Duration::from_secs(20))
            .with_initial_delay(Duration::from_secs(30));

        let err = wait_for(&poll, &clock, config).await.unwrap_err();

        assert!(matches!(err, EngineError::WaitTimeout { .. }));
        // Deadline already passed after the initial delay: one poll only.
        assert_eq!(poll.polls(), 1);
    }
}
