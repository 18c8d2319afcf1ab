use super::*;

fn token(id: i64, expires_at: u64) -> InstallationToken {
    InstallationToken::new(format!("tok-{id}"), expires_at, id)
}

#[test]
fn set_then_get_round_trips() {
    let cache = TokenCache::new();
    cache.set(token(1, 2_000));
    assert_eq!(cache.get(1), Some(token(1, 2_000)));
    assert_eq!(cache.get(2), None);
}

#[test]
fn delete_removes_single_entry() {
    let cache = TokenCache::new();
    cache.set(token(1, 2_000));
    cache.set(token(2, 2_000));
    cache.delete(1);
    assert_eq!(cache.get(1), None);
    assert!(cache.get(2).is_some());
}

#[test]
fn clear_empties_cache() {
    let cache = TokenCache::new();
    cache.set(token(1, 2_000));
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn due_for_refresh_filters_by_threshold() {
    let cache = TokenCache::new();
    cache.set(token(1, 1_000 + 7 * 60)); // 7 min out
    cache.set(token(2, 1_000 + 20 * 60)); // 20 min out
    let due = cache.due_for_refresh(1_000, std::time::Duration::from_secs(10 * 60));
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].installation_id, 1);
}

#[test]
fn prune_expired_drops_past_tokens_keeps_nonexpiring() {
    let cache = TokenCache::new();
    cache.set(token(1, 500)); // already past
    cache.set(token(2, 2_000)); // still ahead
    cache.set(token(3, 0)); // non-expiring sentinel
    cache.prune_expired(1_000);
    assert_eq!(cache.get(1), None);
    assert!(cache.get(2).is_some());
    assert!(cache.get(3).is_some());
}

#[test]
fn record_refresh_tracks_totals_and_failures() {
    let cache = TokenCache::new();
    cache.record_refresh(100, true);
    cache.record_refresh(200, false);
    let stats = cache.stats();
    assert_eq!(stats.total_refreshes, 2);
    assert_eq!(stats.total_failures, 1);
    assert_eq!(stats.last_run_secs, 200);
}
