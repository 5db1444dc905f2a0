pub mod auth;
pub mod metrics;
pub mod rate_limit;

pub use auth::{AuthUser, OrgScope, PlatformAdmin};
pub use metrics::{track_requests, RequestMetrics};
pub use rate_limit::{rate_limit, ClientRateLimiter};
