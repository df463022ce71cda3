//! Prometheus counters exposed on `/metrics`

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

lazy_static! {
    /// Number of `vod_play_from`/`vod_play_url` pairs decoded
    pub static ref PLAY_PARSE_TOTAL: IntCounter = register_int_counter!(
        "play_parse_total",
        "Number of raw play field pairs decoded"
    )
    .unwrap();

    /// Player URL resolutions, by policy (passthrough/wrapped/direct)
    pub static ref PLAYER_RESOLVE_TOTAL: IntCounterVec = register_int_counter_vec!(
        "player_resolve_total",
        "Player URL resolutions by policy",
        &["policy"]
    )
    .unwrap();

    /// Cache lookups, by result (hit/disk_hit/miss/expired)
    pub static ref CACHE_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "cache_requests_total",
        "TTL cache lookups by result",
        &["result"]
    )
    .unwrap();
}
