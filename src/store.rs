//! store.rs — announcement persistence behind an async trait, plus the
//! in-memory implementation used by the service and tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

use crate::classify::Category;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub relevant_interests: Vec<String>,
    pub relevant_majors: Vec<String>,
}

/// Create candidate; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub date: DateTime<Utc>,
    pub relevant_interests: Vec<String>,
    pub relevant_majors: Vec<String>,
}

#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    async fn create(&self, new: NewAnnouncement) -> Result<Announcement>;
    async fn get(&self, id: u64) -> Result<Option<Announcement>>;
    /// All announcements, newest first.
    async fn list(&self) -> Result<Vec<Announcement>>;
    /// `category: None` keeps every category; an empty `interests` slice
    /// keeps every announcement, otherwise at least one must overlap.
    async fn list_filtered(
        &self,
        category: Option<Category>,
        interests: &[String],
    ) -> Result<Vec<Announcement>>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<Announcement>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AnnouncementStore for MemoryStore {
    async fn create(&self, new: NewAnnouncement) -> Result<Announcement> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.next_id += 1;
        let row = Announcement {
            id: inner.next_id,
            title: new.title,
            content: new.content,
            category: new.category,
            date: new.date,
            relevant_interests: new.relevant_interests,
            relevant_majors: new.relevant_majors,
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn get(&self, id: u64) -> Result<Option<Announcement>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.rows.iter().find(|a| a.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Announcement>> {
        self.list_filtered(None, &[]).await
    }

    async fn list_filtered(
        &self,
        category: Option<Category>,
        interests: &[String],
    ) -> Result<Vec<Announcement>> {
        let mut out: Vec<Announcement> = {
            let inner = self.inner.lock().expect("store mutex poisoned");
            inner
                .rows
                .iter()
                .filter(|a| category.map_or(true, |c| a.category == c))
                .filter(|a| {
                    interests.is_empty()
                        || a.relevant_interests.iter().any(|i| interests.contains(i))
                })
                .cloned()
                .collect()
        };
        // newest first; equal dates fall back to the later id
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(
        title: &str,
        category: Category,
        day: u32,
        interests: &[&str],
    ) -> NewAnnouncement {
        NewAnnouncement {
            title: title.into(),
            content: format!("{title} body"),
            category,
            date: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
            relevant_interests: interests.iter().map(|s| s.to_string()).collect(),
            relevant_majors: vec!["ccs".into()],
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_from_one() {
        let s = MemoryStore::new();
        let a = s.create(candidate("a", Category::Academics, 1, &[])).await;
        let b = s.create(candidate("b", Category::Academics, 2, &[])).await;
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(2).await.unwrap().unwrap().title, "b");
        assert!(s.get(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn filter_by_category_and_interest_newest_first() {
        let s = MemoryStore::new();
        for c in [
            candidate("old", Category::CampusEvents, 1, &["sports"]),
            candidate("new", Category::CampusEvents, 5, &["arts", "sports"]),
            candidate("other", Category::Academics, 3, &["sports"]),
        ] {
            s.create(c).await.unwrap();
        }

        let all = s.list().await.unwrap();
        let titles: Vec<_> = all.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "other", "old"]);

        let events = s
            .list_filtered(Some(Category::CampusEvents), &["sports".to_string()])
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "new");

        let arts = s.list_filtered(None, &["arts".to_string()]).await.unwrap();
        assert_eq!(arts.len(), 1);
    }
}
