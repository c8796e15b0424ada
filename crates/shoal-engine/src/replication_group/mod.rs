//! Cache replication group resource
//!
//! The canonical resource tying the engine together: schema and plan-time
//! validation here, the lifecycle passes in the submodules. Attribute names
//! form the declarative surface; several remote settings are only visible on
//! member cache clusters and are flattened back during Read.

mod create;
mod delete;
mod read;
mod update;

use crate::clock::{Clock, SystemClock};
use serde_json::Value;
use shoal_core::{AttrSpec, Diagnostics, RawValue, ReconcileTimeouts, Resource, ResourceData, Schema};
use shoal_remote::CacheApi;
use std::sync::Arc;
use std::time::Duration;

/// Listing lag after an accepted create request.
const CREATE_INITIAL_DELAY: Duration = Duration::from_secs(30);

/// A delete issued while the group is busy (snapshotting, modifying) is
/// retried within this window before giving up.
const DELETE_RETRY_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Global group settling after a secondary joins.
const GLOBAL_GROUP_AVAILABLE_TIMEOUT: Duration = Duration::from_secs(25 * 60);

pub struct ReplicationGroupResource {
    api: Arc<dyn CacheApi>,
    clock: Arc<dyn Clock>,
    region: String,
    timeouts: ReconcileTimeouts,
}

impl ReplicationGroupResource {
    pub fn new(api: Arc<dyn CacheApi>, region: impl Into<String>) -> Self {
        Self {
            api,
            clock: Arc::new(SystemClock),
            region: region.into(),
            timeouts: ReconcileTimeouts::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeouts(mut self, timeouts: ReconcileTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn schema() -> Schema {
        Schema::new()
            .attr(
                "replication_group_id",
                AttrSpec::required()
                    .force_new()
                    .validate_with(validate_group_id),
            )
            .attr("description", AttrSpec::required())
            .attr(
                "engine",
                AttrSpec::optional_computed()
                    .with_default(Value::String("redis".to_string()))
                    .validate_with(validate_engine),
            )
            .attr("engine_version", AttrSpec::optional_computed())
            .attr("node_type", AttrSpec::optional_computed())
            .attr(
                "num_cache_clusters",
                AttrSpec::optional_computed()
                    .conflicts_with(&["num_node_groups", "replicas_per_node_group"]),
            )
            .attr(
                "num_node_groups",
                AttrSpec::optional_computed().conflicts_with(&["num_cache_clusters"]),
            )
            .attr(
                "replicas_per_node_group",
                AttrSpec::optional_computed()
                    .conflicts_with(&["num_cache_clusters"])
                    .validate_with(validate_replica_count),
            )
            .attr(
                "automatic_failover_enabled",
                AttrSpec::optional().with_default(Value::Bool(false)),
            )
            .attr(
                "multi_az_enabled",
                AttrSpec::optional().with_default(Value::Bool(false)),
            )
            .attr(
                "cluster_mode",
                AttrSpec::optional_computed().validate_with(validate_cluster_mode),
            )
            .attr("parameter_group_name", AttrSpec::optional_computed())
            .attr("port", AttrSpec::optional().force_new())
            .attr("subnet_group_name", AttrSpec::optional_computed().force_new())
            .attr("security_group_ids", AttrSpec::optional_computed())
            .attr("security_group_names", AttrSpec::optional_computed().force_new())
            .attr("preferred_cache_cluster_azs", AttrSpec::optional())
            .attr("maintenance_window", AttrSpec::optional_computed())
            .attr("notification_topic_arn", AttrSpec::optional())
            .attr("snapshot_arns", AttrSpec::optional().force_new())
            .attr("snapshot_name", AttrSpec::optional().force_new())
            .attr("snapshot_window", AttrSpec::optional_computed())
            .attr(
                "snapshot_retention_limit",
                AttrSpec::optional()
                    .with_default(Value::Number(0.into()))
                    .validate_with(validate_snapshot_retention),
            )
            .attr("final_snapshot_identifier", AttrSpec::optional())
            .attr("kms_key_id", AttrSpec::optional().force_new())
            .attr(
                "at_rest_encryption_enabled",
                AttrSpec::optional_computed().force_new(),
            )
            .attr("transit_encryption_enabled", AttrSpec::optional_computed())
            .attr(
                "transit_encryption_mode",
                AttrSpec::optional_computed().validate_with(validate_transit_mode),
            )
            .attr(
                "auth_token",
                AttrSpec::optional()
                    .sensitive()
                    .conflicts_with(&["user_group_ids"])
                    .validate_with(validate_auth_token),
            )
            .attr(
                "auth_token_update_strategy",
                AttrSpec::optional()
                    .required_with(&["auth_token"])
                    .with_default(Value::String("rotate".to_string()))
                    .validate_with(validate_update_strategy),
            )
            .attr(
                "user_group_ids",
                AttrSpec::optional().conflicts_with(&["auth_token"]),
            )
            .attr(
                "global_replication_group_id",
                AttrSpec::optional().force_new().conflicts_with(&[
                    "num_node_groups",
                    "parameter_group_name",
                    "engine",
                    "engine_version",
                    "node_type",
                    "security_group_names",
                    "transit_encryption_enabled",
                    "at_rest_encryption_enabled",
                    "snapshot_arns",
                    "snapshot_name",
                ]),
            )
            .attr(
                "apply_immediately",
                AttrSpec::optional().with_default(Value::Bool(false)),
            )
            .attr("tags", AttrSpec::optional())
            .attr("arn", AttrSpec::computed())
            .attr("cluster_enabled", AttrSpec::computed())
            .attr("member_clusters", AttrSpec::computed())
            .attr("primary_endpoint_address", AttrSpec::computed())
            .attr("reader_endpoint_address", AttrSpec::computed())
            .attr("configuration_endpoint_address", AttrSpec::computed())
            .attr("engine_version_actual", AttrSpec::computed())
    }
}

#[async_trait::async_trait]
impl Resource for ReplicationGroupResource {
    async fn create(&self, data: &mut ResourceData) -> Diagnostics {
        create::create(self, data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Diagnostics {
        read::read(self, data).await
    }

    async fn update(&self, data: &mut ResourceData) -> Diagnostics {
        update::update(self, data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Diagnostics {
        delete::delete(self, data).await
    }

    async fn import(&self, id: &str, data: &mut ResourceData) -> Diagnostics {
        data.adopt_id(id);
        let mut diags = read::read(self, data).await;
        if !diags.has_errors() && data.id().is_none() {
            diags.error(format!(
                "cache replication group ({id}) not found, cannot import"
            ));
        }
        diags
    }
}

/// Cross-attribute checks the schema table cannot express.
fn validate_failover(data: &ResourceData) -> Diagnostics {
    let mut diags = Diagnostics::new();

    let failover = data.get_bool("automatic_failover_enabled").unwrap_or(false);
    let multi_az = data.get_bool("multi_az_enabled").unwrap_or(false);

    if multi_az && !failover {
        diags.error(
            "\"multi_az_enabled\" requires \"automatic_failover_enabled\" to be true",
        );
    }

    if failover {
        // Only enforceable when the member count is known at plan time.
        if let RawValue::Known(value) = data.raw_config("num_cache_clusters") {
            if value.as_i64().is_some_and(|n| n < 2) {
                diags.error(
                    "\"automatic_failover_enabled\" requires \"num_cache_clusters\" of at least 2",
                );
            }
        }
    }

    diags
}

fn validate_group_id(value: &Value) -> Result<(), String> {
    let Some(s) = value.as_str() else {
        return Err("must be a string".to_string());
    };
    if s.is_empty() || s.len() > 40 {
        return Err("must be between 1 and 40 characters".to_string());
    }
    if !s.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err("must begin with a letter".to_string());
    }
    if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err("must only contain letters, digits and hyphens".to_string());
    }
    if s.contains("--") {
        return Err("must not contain consecutive hyphens".to_string());
    }
    if s.ends_with('-') {
        return Err("must not end with a hyphen".to_string());
    }
    Ok(())
}

fn validate_engine(value: &Value) -> Result<(), String> {
    match value.as_str().map(str::to_lowercase).as_deref() {
        Some("redis" | "valkey") => Ok(()),
        _ => Err("must be \"redis\" or \"valkey\"".to_string()),
    }
}

fn validate_replica_count(value: &Value) -> Result<(), String> {
    match value.as_i64() {
        Some(0..=5) => Ok(()),
        _ => Err("must be between 0 and 5".to_string()),
    }
}

fn validate_cluster_mode(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some("enabled" | "disabled" | "compatible") => Ok(()),
        _ => Err("must be \"enabled\", \"disabled\" or \"compatible\"".to_string()),
    }
}

fn validate_transit_mode(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some("preferred" | "required") => Ok(()),
        _ => Err("must be \"preferred\" or \"required\"".to_string()),
    }
}

fn validate_snapshot_retention(value: &Value) -> Result<(), String> {
    match value.as_i64() {
        Some(0..=35) => Ok(()),
        _ => Err("must be between 0 and 35 days".to_string()),
    }
}

fn validate_auth_token(value: &Value) -> Result<(), String> {
    let Some(s) = value.as_str() else {
        return Err("must be a string".to_string());
    };
    if s.len() < 16 || s.len() > 128 {
        return Err("must be between 16 and 128 characters".to_string());
    }
    let forbidden = ['/', '"', '@', ' '];
    if !s
        .chars()
        .all(|c| c.is_ascii_graphic() && !forbidden.contains(&c))
    {
        return Err(
            "must only contain printable ASCII characters other than '/', '\"', '@' and spaces"
                .to_string(),
        );
    }
    Ok(())
}

fn validate_update_strategy(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(s) => s
            .parse::<shoal_remote::model::AuthTokenUpdateStrategy>()
            .map(|_| ()),
        None => Err("must be a string".to_string()),
    }
}
