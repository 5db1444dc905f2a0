use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use assessly_core::{MetricUnit, NewPerformanceMetric, PerformanceQuery};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PerformanceListQuery {
    #[validate(length(min = 1, max = 64))]
    pub metric_name: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: Option<u32>,
}

impl From<PerformanceListQuery> for PerformanceQuery {
    fn from(q: PerformanceListQuery) -> Self {
        PerformanceQuery {
            metric_name: q.metric_name,
            from: q.from,
            to: q.to,
            limit: q.limit.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPerformanceRequest {
    #[validate(length(min = 1, max = 64, message = "Metric name must be between 1 and 64 characters"))]
    pub metric_name: String,
    #[validate(range(min = 0.0, message = "Value cannot be negative"))]
    pub value: f64,
    pub unit: MetricUnit,
    pub tags: Option<Value>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl From<RecordPerformanceRequest> for NewPerformanceMetric {
    fn from(req: RecordPerformanceRequest) -> Self {
        NewPerformanceMetric {
            metric_name: req.metric_name,
            value: req.value,
            unit: req.unit,
            tags: req.tags,
            recorded_at: req.recorded_at,
        }
    }
}
