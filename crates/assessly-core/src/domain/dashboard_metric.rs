//! Dashboard metric entity and aggregation types
//!
//! Bucketing and window arithmetic are done in SQL by the repository; the only
//! arithmetic here is the period-over-period change derived from two windows.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::AssessmentStats;
use crate::error::DomainError;

static METRIC_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,63}$").expect("valid metric name regex"));

/// `snake_case`, starts with a letter, at most 64 characters.
pub fn is_valid_metric_name(name: &str) -> bool {
    METRIC_NAME_RE.is_match(name)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetric {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub metric_type: String,
    pub value: f64,
    pub dimensions: Value,
    pub recorded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMetric {
    pub metric_type: String,
    pub value: f64,
    pub dimensions: Option<Value>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl DashboardMetric {
    pub fn new(organization_id: Uuid, input: NewMetric) -> Result<Self, DomainError> {
        if !is_valid_metric_name(&input.metric_type) {
            return Err(DomainError::ValidationError(format!(
                "Invalid metric type: {}",
                input.metric_type
            )));
        }
        if !input.value.is_finite() {
            return Err(DomainError::ValidationError("Metric value must be finite".into()));
        }
        let dimensions = match input.dimensions {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(v @ Value::Object(_)) => v,
            Some(_) => {
                return Err(DomainError::ValidationError(
                    "Metric dimensions must be a JSON object".into(),
                ))
            }
        };
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            organization_id,
            metric_type: input.metric_type,
            value: input.value,
            dimensions,
            recorded_at: input.recorded_at.unwrap_or(now),
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricQuery {
    pub metric_type: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateInterval {
    Hour,
    Day,
    Week,
    Month,
}

impl AggregateInterval {
    /// Field name accepted by Postgres `date_trunc`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateInterval::Hour => "hour",
            AggregateInterval::Day => "day",
            AggregateInterval::Week => "week",
            AggregateInterval::Month => "month",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

#[derive(Debug, Clone)]
pub struct AggregateRequest {
    pub metric_type: String,
    pub interval: AggregateInterval,
    pub function: AggregateFunction,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// One `date_trunc` bucket as computed by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketStats {
    pub bucket: DateTime<Utc>,
    pub samples: i64,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl BucketStats {
    pub fn select(&self, function: AggregateFunction) -> f64 {
        match function {
            AggregateFunction::Sum => self.sum,
            AggregateFunction::Avg => self.avg,
            AggregateFunction::Min => self.min,
            AggregateFunction::Max => self.max,
            AggregateFunction::Count => self.samples as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricBucket {
    pub bucket: DateTime<Utc>,
    pub value: f64,
    pub samples: i64,
}

#[derive(Debug, Clone)]
pub struct WindowQuery {
    pub metric_types: Vec<String>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Summary of one metric type over a time window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub metric_type: String,
    pub count: i64,
    pub sum: Option<f64>,
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl WindowStats {
    pub fn empty(metric_type: &str) -> Self {
        Self {
            metric_type: metric_type.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCalculation {
    pub metric_type: String,
    pub current: WindowStats,
    pub previous: WindowStats,
    /// Change of the window sum relative to the previous window, in percent.
    pub change_percent: Option<f64>,
}

impl MetricCalculation {
    /// Pair current and previous window rows per requested type, in request order.
    /// Types missing from a window count as empty.
    pub fn from_windows(
        metric_types: &[String],
        current: Vec<WindowStats>,
        previous: Vec<WindowStats>,
    ) -> Vec<MetricCalculation> {
        let mut current: HashMap<String, WindowStats> =
            current.into_iter().map(|w| (w.metric_type.clone(), w)).collect();
        let mut previous: HashMap<String, WindowStats> =
            previous.into_iter().map(|w| (w.metric_type.clone(), w)).collect();

        metric_types
            .iter()
            .map(|metric_type| {
                let cur = current
                    .remove(metric_type)
                    .unwrap_or_else(|| WindowStats::empty(metric_type));
                let prev = previous
                    .remove(metric_type)
                    .unwrap_or_else(|| WindowStats::empty(metric_type));
                let change_percent = change_percent(cur.sum, prev.sum);
                MetricCalculation {
                    metric_type: metric_type.clone(),
                    current: cur,
                    previous: prev,
                    change_percent,
                }
            })
            .collect()
    }
}

pub fn change_percent(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    match (current, previous) {
        (Some(cur), Some(prev)) if prev != 0.0 => Some((cur - prev) / prev.abs() * 100.0),
        (None, Some(prev)) if prev != 0.0 => Some(-100.0),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub active_members: i64,
    pub total_members: i64,
    pub assessments: AssessmentStats,
    pub reports: i64,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_name_validation() {
        assert!(is_valid_metric_name("completion_rate"));
        assert!(is_valid_metric_name("a1"));
        assert!(!is_valid_metric_name("CompletionRate"));
        assert!(!is_valid_metric_name("1rate"));
        assert!(!is_valid_metric_name(""));
        assert!(!is_valid_metric_name(&"a".repeat(65)));
    }

    #[test]
    fn test_new_metric_rejects_bad_input() {
        let org = Uuid::new_v4();
        let base = NewMetric {
            metric_type: "score".into(),
            value: 1.0,
            dimensions: None,
            recorded_at: None,
        };
        assert!(DashboardMetric::new(org, base.clone()).is_ok());
        assert!(DashboardMetric::new(org, NewMetric { value: f64::NAN, ..base.clone() }).is_err());
        assert!(DashboardMetric::new(
            org,
            NewMetric { dimensions: Some(json!([1, 2])), ..base.clone() }
        )
        .is_err());
        let metric =
            DashboardMetric::new(org, NewMetric { dimensions: Some(Value::Null), ..base }).unwrap();
        assert_eq!(metric.dimensions, json!({}));
    }

    #[test]
    fn test_change_percent() {
        assert_eq!(change_percent(Some(150.0), Some(100.0)), Some(50.0));
        assert_eq!(change_percent(Some(50.0), Some(-100.0)), Some(150.0));
        assert_eq!(change_percent(None, Some(10.0)), Some(-100.0));
        assert_eq!(change_percent(Some(10.0), Some(0.0)), None);
        assert_eq!(change_percent(Some(10.0), None), None);
    }

    #[test]
    fn test_from_windows_keeps_request_order_and_fills_gaps() {
        let types = vec!["logins".to_string(), "completions".to_string()];
        let current = vec![WindowStats {
            metric_type: "completions".into(),
            count: 2,
            sum: Some(30.0),
            avg: Some(15.0),
            min: Some(10.0),
            max: Some(20.0),
        }];
        let previous = vec![WindowStats {
            metric_type: "completions".into(),
            count: 1,
            sum: Some(20.0),
            avg: Some(20.0),
            min: Some(20.0),
            max: Some(20.0),
        }];

        let result = MetricCalculation::from_windows(&types, current, previous);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].metric_type, "logins");
        assert_eq!(result[0].current.count, 0);
        assert_eq!(result[0].change_percent, None);
        assert_eq!(result[1].metric_type, "completions");
        assert_eq!(result[1].change_percent, Some(50.0));
    }

    #[test]
    fn test_bucket_select() {
        let bucket = BucketStats {
            bucket: Utc::now(),
            samples: 4,
            sum: 10.0,
            avg: 2.5,
            min: 1.0,
            max: 4.0,
        };
        assert_eq!(bucket.select(AggregateFunction::Count), 4.0);
        assert_eq!(bucket.select(AggregateFunction::Avg), 2.5);
        assert_eq!(bucket.select(AggregateFunction::Max), 4.0);
    }
}
