//! Domain Layer
//!
//! Board entities plus the pure logic presentation components run on them.
//! Nothing here performs I/O.

pub mod analytics;
pub mod mentions;
pub mod models;
pub mod notifications;

pub use analytics::{AnalyticsView, BoardAnalytics, SeriesPoint, TrendPoint};
pub use mentions::{active_mention, extract_mentions, filter_candidates, insert_mention, MentionQuery};
pub use models::{Board, Column, Member, Notification, Priority, Task, TaskStatus, User};
pub use notifications::NotificationCenter;
