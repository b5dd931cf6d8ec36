use anyhow::Result;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::model::leave_type::LeaveType;

/// Leave types are immutable after creation, so cached entries never go
/// stale; the TTL only bounds memory for long-forgotten types.
pub static LEAVE_TYPE_CACHE: Lazy<Cache<u64, LeaveType>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn get(id: u64) -> Option<LeaveType> {
    LEAVE_TYPE_CACHE.get(&id).await
}

pub async fn insert(leave_type: LeaveType) {
    LEAVE_TYPE_CACHE.insert(leave_type.id, leave_type).await;
}

/// Load every configured leave type into the cache at boot.
pub async fn warmup_leave_type_cache(pool: &MySqlPool) -> Result<usize> {
    let rows = sqlx::query_as::<_, LeaveType>(
        r#"
        SELECT id, name, days_allowed, renew_period, renew_period_count,
               carry_over, paid_leave, leave_encashment, anchor_date, created_at
        FROM leave_types
        "#,
    )
    .fetch_all(pool)
    .await?;

    let count = rows.len();
    let futures: Vec<_> = rows
        .into_iter()
        .map(|leave_type| {
            let id = leave_type.id;
            LEAVE_TYPE_CACHE.insert(id, leave_type)
        })
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;

    Ok(count)
}
