//! Board analytics aggregates and the view data the dashboard draws from them

use super::models::{Priority, Task, TaskStatus, User};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregates returned by `GET /boards/:id/analytics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardAnalytics {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    #[serde(default)]
    pub overdue_tasks: u64,
    #[serde(default, alias = "tasksByStatus")]
    pub by_status: BTreeMap<TaskStatus, u64>,
    #[serde(default, alias = "tasksByPriority")]
    pub by_priority: BTreeMap<Priority, u64>,
    /// Task count per assignee user id
    #[serde(default, alias = "tasksPerAssignee")]
    pub by_assignee: BTreeMap<String, u64>,
    #[serde(default)]
    pub completion_trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub completed: u64,
}

/// One bar or slice of a dashboard chart
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: u64,
}

/// Everything the analytics dashboard renders
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsView {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub overdue_tasks: u64,
    /// 0.0 to 100.0, one decimal place
    pub completion_percent: f64,
    pub status_series: Vec<SeriesPoint>,
    pub priority_series: Vec<SeriesPoint>,
    /// Busiest assignee first
    pub assignee_series: Vec<SeriesPoint>,
    pub trend: Vec<TrendPoint>,
}

impl BoardAnalytics {
    /// Compute aggregates locally from the tasks the store holds
    ///
    /// Used when the analytics endpoint is unavailable; there is no trend
    /// because completion history is only known to the server.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, now: DateTime<Utc>) -> Self {
        let mut analytics = BoardAnalytics::default();

        for task in tasks {
            analytics.total_tasks += 1;
            if task.is_done() {
                analytics.completed_tasks += 1;
            }
            if task.is_overdue(now) {
                analytics.overdue_tasks += 1;
            }
            *analytics.by_status.entry(task.status).or_default() += 1;
            *analytics.by_priority.entry(task.priority).or_default() += 1;
            for assignee in &task.assignees {
                *analytics.by_assignee.entry(assignee.clone()).or_default() += 1;
            }
        }

        analytics
    }

    pub fn completion_percent(&self) -> f64 {
        if self.total_tasks == 0 {
            return 0.0;
        }
        let percent = self.completed_tasks as f64 * 100.0 / self.total_tasks as f64;
        (percent * 10.0).round() / 10.0
    }

    /// Shape the aggregates for display
    ///
    /// Status and priority series always list every variant in display
    /// order, with zeros for missing buckets. Assignee ids are resolved to
    /// names through `members`; unknown ids are shown as-is.
    pub fn view(&self, members: &[User]) -> AnalyticsView {
        let status_series = TaskStatus::ALL
            .iter()
            .map(|status| SeriesPoint {
                label: status.label().to_string(),
                value: self.by_status.get(status).copied().unwrap_or(0),
            })
            .collect();

        let priority_series = Priority::ALL
            .iter()
            .map(|priority| SeriesPoint {
                label: priority.as_str().to_string(),
                value: self.by_priority.get(priority).copied().unwrap_or(0),
            })
            .collect();

        let mut assignee_series: Vec<SeriesPoint> = self
            .by_assignee
            .iter()
            .map(|(user_id, count)| SeriesPoint {
                label: members
                    .iter()
                    .find(|m| &m.id == user_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_else(|| user_id.clone()),
                value: *count,
            })
            .collect();
        assignee_series.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));

        let mut trend = self.completion_trend.clone();
        trend.sort_by_key(|point| point.date);

        AnalyticsView {
            total_tasks: self.total_tasks,
            completed_tasks: self.completed_tasks,
            overdue_tasks: self.overdue_tasks,
            completion_percent: self.completion_percent(),
            status_series,
            priority_series,
            assignee_series,
            trend,
        }
    }
}
