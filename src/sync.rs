use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::task::JoinSet;

use crate::aggregate::aggregate;
use crate::model::{Category, Group, Payload, PK_CATEGORIES, PK_GROUPS};
use crate::store::{Store, StoreError};

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SyncReport {
    pub written: usize,
    pub failed: usize,
}

impl SyncReport {
    pub fn ok(&self) -> bool {
        self.failed == 0
    }
}

/// Rebuilds every invite-link bucket and reports whether all writes landed.
/// Store failures are logged here and never returned.
pub async fn update_invite_links(store: Arc<dyn Store>, payload: &Payload) -> bool {
    match sync_at(store, payload, Utc::now()).await {
        Ok(report) if report.ok() => {
            tracing::info!(written = report.written, "invite links updated");
            true
        }
        Ok(report) => {
            tracing::error!(
                written = report.written,
                failed = report.failed,
                "Error updating invite links: some buckets were not written"
            );
            false
        }
        Err(e) => {
            tracing::error!(error = %e, "Error updating invite links");
            false
        }
    }
}

/// One full cycle with a fixed clock. Read failures abort before any write;
/// write failures are counted, not retried.
pub async fn sync_at(
    store: Arc<dyn Store>,
    payload: &Payload,
    now: DateTime<Utc>,
) -> Result<SyncReport, StoreError> {
    let (group_items, category_items) = tokio::try_join!(
        store.query_partition(PK_GROUPS),
        store.query_partition(PK_CATEGORIES),
    )?;

    let groups: Vec<Group> = group_items.iter().map(Group::from_item).collect();
    let categories: Vec<Category> = category_items.iter().map(Category::from_item).collect();
    tracing::info!(
        groups = groups.len(),
        categories = categories.len(),
        domain = payload.domain_filter().unwrap_or("*"),
        "loaded source records"
    );

    let updated = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let summaries = aggregate(&groups, &categories, payload.domain_filter(), &updated);

    let mut tasks = JoinSet::new();
    for (key, summary) in summaries {
        let store = Arc::clone(&store);
        tasks.spawn(async move {
            let res = store.put_item(summary.into_item()).await;
            (key, res)
        });
    }

    let mut report = SyncReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => report.written += 1,
            Ok((key, Err(e))) => {
                tracing::error!(bucket = %key, error = %e, "invite link put failed");
                report.failed += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "invite link put task aborted");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}
