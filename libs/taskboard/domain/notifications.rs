//! Read-state bookkeeping for the notification dropdown

use super::models::Notification;

/// The current user's notifications, newest first
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list wholesale, e.g. after `GET /notifications`
    pub fn replace_all(&mut self, mut items: Vec<Notification>) {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut seen = std::collections::HashSet::new();
        items.retain(|n| seen.insert(n.id.clone()));
        self.items = items;
    }

    /// Add or refresh one notification, keeping newest-first order
    pub fn push(&mut self, notification: Notification) {
        self.items.retain(|n| n.id != notification.id);
        let at = self
            .items
            .iter()
            .position(|n| n.created_at <= notification.created_at)
            .unwrap_or(self.items.len());
        self.items.insert(at, notification);
    }

    /// Mark one notification read; false when the id is unknown
    ///
    /// Only the flag of the matching notification changes.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    /// Mark every notification read and return how many changed
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.items.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        changed
    }

    /// Remove a notification, as clicking it in the dropdown does
    pub fn dismiss(&mut self, id: &str) -> Option<Notification> {
        let index = self.items.iter().position(|n| n.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(|n| !n.read)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn notification(id: &str, minutes: i64, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            recipient: "u1".to_string(),
            message: format!("message {}", id),
            read,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes),
        }
    }

    fn center() -> NotificationCenter {
        let mut center = NotificationCenter::new();
        center.replace_all(vec![
            notification("a", 0, false),
            notification("b", 10, false),
            notification("c", 5, true),
        ]);
        center
    }

    #[test]
    fn test_replace_all_sorts_newest_first() {
        let ids: Vec<_> = center().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_mark_read_changes_only_that_flag() {
        let mut center = center();
        let before = center.clone();

        assert!(center.mark_read("a"));

        for (after, before) in center.iter().zip(before.iter()) {
            if after.id == "a" {
                assert!(after.read);
                assert_eq!(after.message, before.message);
                assert_eq!(after.created_at, before.created_at);
            } else {
                assert_eq!(after, before);
            }
        }
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn test_mark_read_unknown_id_is_noop() {
        let mut center = center();
        assert!(!center.mark_read("missing"));
        assert_eq!(center.unread_count(), 2);
    }

    #[test]
    fn test_mark_all_read_sets_every_flag() {
        let mut center = center();
        assert_eq!(center.mark_all_read(), 2);
        assert!(center.iter().all(|n| n.read));
        assert_eq!(center.unread_count(), 0);
        assert_eq!(center.mark_all_read(), 0);
    }

    #[test]
    fn test_push_keeps_order_and_replaces_duplicates() {
        let mut center = center();
        center.push(notification("d", 7, false));
        center.push(notification("b", 10, true));

        let ids: Vec<_> = center.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec!["b", "d", "c", "a"]);
        assert!(center.get("b").unwrap().read);
    }

    #[test]
    fn test_dismiss_removes_one() {
        let mut center = center();
        let removed = center.dismiss("c").unwrap();
        assert_eq!(removed.id, "c");
        assert_eq!(center.len(), 2);
        assert!(center.dismiss("c").is_none());
    }
}
