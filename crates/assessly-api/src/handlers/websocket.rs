//! Realtime connection metadata. No socket is served here; clients connect to
//! Supabase Realtime directly with these details.

use axum::{extract::State, Json};
use serde::Serialize;

use assessly_shared::constants::{REALTIME_HEARTBEAT_INTERVAL_MS, REALTIME_WEBSOCKET_PATH};

use crate::handlers::ensure_enabled;
use crate::middleware::AuthUser;
use crate::response::ApiResult;
use crate::state::AppState;

const REALTIME_PROTOCOL: &str = "phoenix";
const REALTIME_CHANNELS: [&str; 3] = [
    "realtime:public:assessments",
    "realtime:public:reports",
    "realtime:public:dashboard_metrics",
];

#[derive(Debug, Serialize)]
pub struct WebSocketInfo {
    pub url: String,
    pub protocol: &'static str,
    pub channels: Vec<&'static str>,
    pub heartbeat_interval_ms: u64,
    pub apikey: String,
}

pub async fn websocket_info(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<WebSocketInfo>> {
    ensure_enabled(state.config.features.websocket, "websocket")?;

    Ok(Json(WebSocketInfo {
        url: realtime_url(&state.config.supabase.url),
        protocol: REALTIME_PROTOCOL,
        channels: REALTIME_CHANNELS.to_vec(),
        heartbeat_interval_ms: REALTIME_HEARTBEAT_INTERVAL_MS,
        apikey: state.config.supabase.anon_key.clone(),
    }))
}

/// `https://x.supabase.co` becomes `wss://x.supabase.co/realtime/v1/websocket`.
pub fn realtime_url(supabase_url: &str) -> String {
    let base = supabase_url.trim().trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}{}", base, REALTIME_WEBSOCKET_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_realtime_url() {
        assert_eq!(
            realtime_url("https://abc.supabase.co/"),
            "wss://abc.supabase.co/realtime/v1/websocket"
        );
        assert_eq!(
            realtime_url("http://localhost:54321"),
            "ws://localhost:54321/realtime/v1/websocket"
        );
    }
}
