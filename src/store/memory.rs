use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{LeaveError, LeaveResult, ValidationError};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::store::{LeaveFilter, LeavePage, LeaveStore};

#[derive(Default)]
struct Inner {
    next_id: u64,
    requests: BTreeMap<u64, LeaveRequest>,
}

/// Process-local store, used when no database is configured.
#[derive(Default)]
pub struct InMemoryLeaveStore {
    inner: RwLock<Inner>,
}

fn poisoned<T>(_: T) -> LeaveError {
    LeaveError::Communication("leave store lock poisoned".into())
}

impl InMemoryLeaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaveStore for InMemoryLeaveStore {
    async fn insert(&self, request: &LeaveRequest) -> LeaveResult<LeaveRequest> {
        if request.id.is_some() {
            return Err(ValidationError::AlreadyCreated.into());
        }
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.next_id += 1;
        let id = inner.next_id;

        let mut stored = request.clone();
        stored.id = Some(id);
        inner.requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn fetch(&self, id: u64) -> LeaveResult<Option<LeaveRequest>> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.requests.get(&id).cloned())
    }

    async fn update(&self, expected: LeaveStatus, request: &LeaveRequest) -> LeaveResult<()> {
        let id = request.id.ok_or(LeaveError::NotFound(0))?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        let current = inner.requests.get_mut(&id).ok_or(LeaveError::NotFound(id))?;
        if current.status != expected {
            return Err(ValidationError::StatusChanged { expected }.into());
        }
        *current = request.clone();
        Ok(())
    }

    async fn list(&self, filter: &LeaveFilter) -> LeaveResult<LeavePage> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut matching: Vec<&LeaveRequest> = inner.requests.values().filter(|r| filter.matches(r)).collect();
        // newest first, ties by id so the order is stable
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let (data, page, per_page) = match filter.window() {
            Some((limit, offset)) => (
                matching
                    .into_iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect(),
                filter.page.unwrap_or(1),
                limit,
            ),
            None => {
                let all: Vec<LeaveRequest> = matching.into_iter().cloned().collect();
                let len = all.len() as u64;
                (all, 1, len)
            }
        };

        Ok(LeavePage {
            data,
            page,
            per_page,
            total,
        })
    }

    async fn delete(&self, id: u64) -> LeaveResult<bool> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        Ok(inner.requests.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave_request::tests::{christmas_draft, date};
    use crate::model::leave_request::LeaveCategory;

    #[actix_web::test]
    async fn insert_assigns_ids_and_refuses_existing() {
        let store = InMemoryLeaveStore::new();
        let first = store.insert(&christmas_draft()).await.unwrap();
        let second = store.insert(&christmas_draft()).await.unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));

        let err = store.insert(&first).await.unwrap_err();
        assert!(matches!(err, LeaveError::Validation(ValidationError::AlreadyCreated)));
    }

    #[actix_web::test]
    async fn update_is_guarded_by_status() {
        let store = InMemoryLeaveStore::new();
        let stored = store.insert(&christmas_draft()).await.unwrap();

        let mut submitted = stored.clone();
        submitted.status = LeaveStatus::Soumise;
        store.update(LeaveStatus::Brouillon, &submitted).await.unwrap();

        let mut stale = stored.clone();
        stale.reason = Some("autre".into());
        let err = store.update(LeaveStatus::Brouillon, &stale).await.unwrap_err();
        assert!(matches!(
            err,
            LeaveError::Validation(ValidationError::StatusChanged { expected: LeaveStatus::Brouillon })
        ));
        let current = store.fetch(1).await.unwrap().unwrap();
        assert_eq!(current.status, LeaveStatus::Soumise);

        let mut missing = submitted.clone();
        missing.id = Some(99);
        assert!(matches!(
            store.update(LeaveStatus::Soumise, &missing).await,
            Err(LeaveError::NotFound(99))
        ));
    }

    #[actix_web::test]
    async fn list_filters_and_paginates() {
        let store = InMemoryLeaveStore::new();
        for i in 0..5u32 {
            let mut r = christmas_draft();
            r.created_at += chrono::Duration::minutes(i as i64);
            if i % 2 == 0 {
                r.status = LeaveStatus::Soumise;
            }
            if i == 4 {
                r.employee_id = 2000;
                r.category = LeaveCategory::Maladie;
                r.start_date = date(2025, 1, 6);
                r.end_date = date(2025, 1, 7);
            }
            store.insert(&r).await.unwrap();
        }

        let all = store.list(&LeaveFilter::default()).await.unwrap();
        assert_eq!(all.total, 5);
        // newest first
        assert_eq!(all.data[0].id, Some(5));

        let submitted = store.list(&LeaveFilter::with_statuses(&[LeaveStatus::Soumise])).await.unwrap();
        assert_eq!(submitted.total, 3);

        let mine = store.list(&LeaveFilter::for_employee(1000)).await.unwrap();
        assert_eq!(mine.total, 4);

        let sick = LeaveFilter {
            category: Some(LeaveCategory::Maladie),
            year: Some(2025),
            ..Default::default()
        };
        assert_eq!(store.list(&sick).await.unwrap().total, 1);

        let page = store.list(&LeaveFilter::default().paginate(Some(2), Some(2))).await.unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.per_page, 2);
        let ids: Vec<_> = page.data.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some(3), Some(2)]);
    }

    #[actix_web::test]
    async fn delete_reports_absence() {
        let store = InMemoryLeaveStore::new();
        store.insert(&christmas_draft()).await.unwrap();
        assert!(store.delete(1).await.unwrap());
        assert!(!store.delete(1).await.unwrap());
        assert!(store.fetch(1).await.unwrap().is_none());
    }

    #[test]
    fn pagination_is_clamped() {
        let filter = LeaveFilter::default().paginate(Some(0), Some(1000));
        assert_eq!(filter.window(), Some((100, 0)));
        let filter = LeaveFilter::default().paginate(None, None);
        assert_eq!(filter.window(), Some((10, 0)));
    }

    #[actix_web::test]
    async fn page_far_past_the_end_is_empty() {
        let store = InMemoryLeaveStore::new();
        store.insert(&christmas_draft()).await.unwrap();

        let filter = LeaveFilter::default().paginate(Some(u64::MAX), Some(100));
        assert_eq!(filter.window(), Some((100, u64::MAX)));

        let page = store.list(&filter).await.unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.page, u64::MAX);
        assert_eq!(page.per_page, 100);
        assert_eq!(page.total, 1);
    }
}
