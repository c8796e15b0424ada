//! Remote object lookup
//!
//! Finders iterate every page of a describe call, apply a caller-supplied
//! predicate, and normalize "does not exist" into [`EngineError::NotFound`].
//! Transport and auth errors pass through verbatim.

use crate::error::{EngineError, Result};
use shoal_remote::input::{
    DescribeCacheClustersInput, DescribeGlobalGroupsInput, DescribeReplicationGroupsInput,
};
use shoal_remote::model::{CacheCluster, GlobalReplicationGroup, ReplicationGroup};
use shoal_remote::{CacheApi, kinds};

/// Assert a listing produced exactly one match.
pub fn single<T>(mut items: Vec<T>) -> Result<T> {
    match items.len() {
        0 => Err(EngineError::EmptyResult),
        1 => Ok(items.remove(0)),
        n => Err(EngineError::TooManyResults(n)),
    }
}

pub async fn find_replication_groups(
    api: &dyn CacheApi,
    input: DescribeReplicationGroupsInput,
    filter: impl Fn(&ReplicationGroup) -> bool,
) -> Result<Vec<ReplicationGroup>> {
    let mut output = Vec::new();
    let mut page_token = None;

    loop {
        let request = DescribeReplicationGroupsInput {
            page_token,
            ..input.clone()
        };
        let page = api.describe_replication_groups(&request).await?;
        output.extend(page.items.into_iter().filter(&filter));

        page_token = page.next_token;
        if page_token.is_none() {
            break;
        }
    }

    Ok(output)
}

pub async fn find_replication_group_by_id(
    api: &dyn CacheApi,
    id: &str,
) -> Result<ReplicationGroup> {
    let input = DescribeReplicationGroupsInput {
        replication_group_id: Some(id.to_string()),
        ..Default::default()
    };

    let groups = find_replication_groups(api, input, |_| true).await?;

    single(groups).map_err(|err| match err {
        EngineError::EmptyResult => EngineError::not_found(kinds::REPLICATION_GROUP, id),
        other => other,
    })
}

pub async fn find_cache_clusters(
    api: &dyn CacheApi,
    input: DescribeCacheClustersInput,
    filter: impl Fn(&CacheCluster) -> bool,
) -> Result<Vec<CacheCluster>> {
    let mut output = Vec::new();
    let mut page_token = None;

    loop {
        let request = DescribeCacheClustersInput {
            page_token,
            ..input.clone()
        };
        let page = api.describe_cache_clusters(&request).await?;
        output.extend(page.items.into_iter().filter(&filter));

        page_token = page.next_token;
        if page_token.is_none() {
            break;
        }
    }

    Ok(output)
}

/// The member cache clusters of a replication group. Resolves the group
/// first; an empty member listing is an [`EngineError::EmptyResult`].
pub async fn find_member_clusters(
    api: &dyn CacheApi,
    group_id: &str,
) -> Result<Vec<CacheCluster>> {
    let group = find_replication_group_by_id(api, group_id).await?;
    let member_ids = group.member_clusters;

    let clusters = find_cache_clusters(api, DescribeCacheClustersInput::default(), |cluster| {
        member_ids.contains(&cluster.cache_cluster_id)
    })
    .await?;

    if clusters.is_empty() {
        return Err(EngineError::EmptyResult);
    }

    Ok(clusters)
}

pub async fn find_global_group_by_id(
    api: &dyn CacheApi,
    id: &str,
) -> Result<GlobalReplicationGroup> {
    let input = DescribeGlobalGroupsInput {
        global_group_id: Some(id.to_string()),
        show_member_info: true,
        ..Default::default()
    };

    let mut output = Vec::new();
    let mut page_token = None;
    loop {
        let request = DescribeGlobalGroupsInput {
            page_token,
            ..input.clone()
        };
        let page = api.describe_global_groups(&request).await?;
        output.extend(page.items);

        page_token = page.next_token;
        if page_token.is_none() {
            break;
        }
    }

    single(output).map_err(|err| match err {
        EngineError::EmptyResult => EngineError::not_found(kinds::GLOBAL_GROUP, id),
        other => other,
    })
}
