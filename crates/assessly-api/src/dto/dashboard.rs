use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use assessly_core::services::CalculateRequest;
use assessly_core::{AggregateFunction, AggregateInterval, AggregateRequest, MetricQuery, NewMetric};

#[derive(Debug, Default, Deserialize, Validate)]
pub struct MetricListQuery {
    #[validate(length(min = 1, max = 64))]
    pub metric_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
    pub limit: Option<u32>,
}

impl From<MetricListQuery> for MetricQuery {
    fn from(q: MetricListQuery) -> Self {
        MetricQuery {
            metric_type: q.metric_type,
            from: q.from,
            to: q.to,
            // zero lets the service pick its default
            limit: q.limit.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordMetricRequest {
    #[validate(length(min = 1, max = 64, message = "Metric type must be between 1 and 64 characters"))]
    pub metric_type: String,
    pub value: f64,
    pub dimensions: Option<Value>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl From<RecordMetricRequest> for NewMetric {
    fn from(req: RecordMetricRequest) -> Self {
        NewMetric {
            metric_type: req.metric_type,
            value: req.value,
            dimensions: req.dimensions,
            recorded_at: req.recorded_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AggregateMetricsRequest {
    #[validate(length(min = 1, max = 64, message = "Metric type must be between 1 and 64 characters"))]
    pub metric_type: String,
    pub interval: AggregateInterval,
    #[serde(default = "default_function")]
    pub function: AggregateFunction,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

fn default_function() -> AggregateFunction {
    AggregateFunction::Sum
}

impl From<AggregateMetricsRequest> for AggregateRequest {
    fn from(req: AggregateMetricsRequest) -> Self {
        AggregateRequest {
            metric_type: req.metric_type,
            interval: req.interval,
            function: req.function,
            from: req.from,
            to: req.to,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CalculateMetricsRequest {
    #[validate(length(min = 1, max = 20, message = "Between 1 and 20 metric types are required"))]
    pub metric_types: Vec<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl From<CalculateMetricsRequest> for CalculateRequest {
    fn from(req: CalculateMetricsRequest) -> Self {
        CalculateRequest {
            metric_types: req.metric_types,
            from: req.from,
            to: req.to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_defaults_to_sum() {
        let req: AggregateMetricsRequest = serde_json::from_str(
            r#"{"metric_type": "completions", "interval": "day",
                "from": "2026-01-01T00:00:00Z", "to": "2026-02-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.function, AggregateFunction::Sum);
        assert_eq!(req.interval, AggregateInterval::Day);
    }

    #[test]
    fn test_unknown_interval_is_rejected() {
        let result: Result<AggregateMetricsRequest, _> = serde_json::from_str(
            r#"{"metric_type": "completions", "interval": "fortnight",
                "from": "2026-01-01T00:00:00Z", "to": "2026-02-01T00:00:00Z"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_calculate_requires_metric_types() {
        let req: CalculateMetricsRequest = serde_json::from_str(
            r#"{"metric_types": [], "from": "2026-01-01T00:00:00Z", "to": "2026-02-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(req.validate().is_err());
    }
}
