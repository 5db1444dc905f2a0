//! System performance metric entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::dashboard_metric::is_valid_metric_name;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    Ms,
    Percent,
    Count,
    Bytes,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Ms => "ms",
            MetricUnit::Percent => "percent",
            MetricUnit::Count => "count",
            MetricUnit::Bytes => "bytes",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ms" => Some(MetricUnit::Ms),
            "percent" => Some(MetricUnit::Percent),
            "count" => Some(MetricUnit::Count),
            "bytes" => Some(MetricUnit::Bytes),
            _ => None,
        }
    }
}

/// Platform-level measurement; not scoped to an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub id: Uuid,
    pub metric_name: String,
    pub value: f64,
    pub unit: MetricUnit,
    pub tags: Value,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPerformanceMetric {
    pub metric_name: String,
    pub value: f64,
    pub unit: MetricUnit,
    pub tags: Option<Value>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl PerformanceMetric {
    pub fn new(input: NewPerformanceMetric) -> Result<Self, DomainError> {
        if !is_valid_metric_name(&input.metric_name) {
            return Err(DomainError::ValidationError(format!(
                "Invalid metric name: {}",
                input.metric_name
            )));
        }
        if !input.value.is_finite() || input.value < 0.0 {
            return Err(DomainError::ValidationError(
                "Performance values must be finite and non-negative".into(),
            ));
        }
        if input.unit == MetricUnit::Percent && input.value > 100.0 {
            return Err(DomainError::ValidationError("Percent values cannot exceed 100".into()));
        }
        let tags = match input.tags {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(v @ Value::Object(_)) => v,
            Some(_) => {
                return Err(DomainError::ValidationError("Tags must be a JSON object".into()))
            }
        };
        Ok(Self {
            id: Uuid::new_v4(),
            metric_name: input.metric_name,
            value: input.value,
            unit: input.unit,
            tags,
            recorded_at: input.recorded_at.unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PerformanceQuery {
    pub metric_name: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: u32,
}

/// Live counters of the running process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSnapshot {
    pub uptime_secs: u64,
    pub requests_total: u64,
    pub requests_in_flight: u64,
    pub error_responses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(value: f64, unit: MetricUnit) -> NewPerformanceMetric {
        NewPerformanceMetric {
            metric_name: "api_latency_p95".into(),
            value,
            unit,
            tags: None,
            recorded_at: None,
        }
    }

    #[test]
    fn test_new_performance_metric() {
        let metric = PerformanceMetric::new(input(120.0, MetricUnit::Ms)).unwrap();
        assert_eq!(metric.unit, MetricUnit::Ms);
        assert!(metric.tags.is_object());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(PerformanceMetric::new(input(-1.0, MetricUnit::Ms)).is_err());
        assert!(PerformanceMetric::new(input(101.0, MetricUnit::Percent)).is_err());
        assert!(PerformanceMetric::new(input(f64::INFINITY, MetricUnit::Count)).is_err());
    }
}
