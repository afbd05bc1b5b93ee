use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use crate::scoring::{Category, PointMap, QuestionId, QuestionRule, RuleTable};
use crate::submissions::domain::{SubmissionId, SubmissionPayload};
use crate::submissions::repository::{RepositoryError, SubmissionRecord, SubmissionRepository};
use crate::submissions::service::SubmissionService;

/// Question 1 decides between A and B; question 2 always feeds D on its first answer.
pub(super) fn rule_table() -> Arc<RuleTable> {
    let rules = QuestionId::all().map(|question| {
        let rule = match question.get() {
            1 => QuestionRule::new(
                PointMap::new().with(Category::A, 1.0),
                PointMap::new().with(Category::B, 1.0),
            ),
            2 => QuestionRule::new(PointMap::new().with(Category::D, 6.0), PointMap::new()),
            _ => QuestionRule::default(),
        };
        (question, rule)
    });
    Arc::new(RuleTable::from_rules(rules).expect("valid rule table"))
}

pub(super) fn all_answers(choice: u8) -> Map<String, Value> {
    QuestionId::all()
        .map(|question| (question.to_string(), json!(choice)))
        .collect()
}

pub(super) fn payload(name: &str, answers: Map<String, Value>) -> SubmissionPayload {
    SubmissionPayload {
        name: name.to_string(),
        answers,
    }
}

pub(super) fn instant(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 3, hour, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn build_service() -> (SubmissionService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = SubmissionService::new(rule_table(), repository.clone());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<SubmissionId, SubmissionRecord>>>,
}

impl SubmissionRepository for MemoryRepository {
    fn insert(&self, record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<SubmissionRecord> = guard.values().cloned().collect();
        records.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        records.truncate(limit);
        Ok(records)
    }

    fn delete(&self, id: &SubmissionId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

/// Repository that refuses every write, for exercising error propagation.
#[derive(Default)]
pub(super) struct OfflineRepository;

impl SubmissionRepository for OfflineRepository {
    fn insert(&self, _record: SubmissionRecord) -> Result<SubmissionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &SubmissionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
