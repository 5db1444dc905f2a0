//! Application-wide constants

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub const DEFAULT_METRIC_LIMIT: u32 = 100;
pub const MAX_METRIC_LIMIT: u32 = 1000;

/// Upper bound on the time range a single aggregation request may span.
pub const MAX_AGGREGATION_RANGE_DAYS: i64 = 366;
pub const MAX_CALCULATE_METRIC_TYPES: usize = 20;

pub const DEFAULT_ACTIVITY_WINDOW_DAYS: i64 = 30;

pub const DEFAULT_JWT_AUDIENCE: &str = "authenticated";
pub const REALTIME_WEBSOCKET_PATH: &str = "/realtime/v1/websocket";
pub const REALTIME_HEARTBEAT_INTERVAL_MS: u64 = 30_000;
pub const REQUEST_ID_HEADER: &str = "x-request-id";
