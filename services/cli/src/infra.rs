use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use attachment_scoring::config::AppConfig;
use attachment_scoring::error::AppError;
use attachment_scoring::scoring::RuleTable;
use attachment_scoring::submissions::{
    RepositoryError, SubmissionId, SubmissionRecord, SubmissionRepository,
};
use serde_json::Value;

#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionRepository {
    records: Arc<Mutex<HashMap<SubmissionId, SubmissionRecord>>>,
}

impl SubmissionRepository for InMemorySubmissionRepository {
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
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Loads the rule table named on the command line, falling back to the configured source.
pub(crate) fn load_rule_table(
    config: &AppConfig,
    override_path: Option<PathBuf>,
) -> Result<Arc<RuleTable>, AppError> {
    let table = match override_path {
        Some(path) => Arc::new(RuleTable::from_path(path)?),
        None => config.scoring.rule_table()?,
    };
    Ok(table)
}

pub(crate) fn read_json_file(path: &Path) -> Result<Value, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attachment_scoring::scoring::{AnswerSet, Score};
    use attachment_scoring::submissions::{RespondentName, ViewedPeriod};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, hour: u32) -> SubmissionRecord {
        let at = Utc
            .with_ymd_and_hms(2025, 10, 3, hour, 0, 0)
            .single()
            .expect("valid instant");
        SubmissionRecord {
            id: SubmissionId(id.to_string()),
            name: RespondentName::parse("Test").expect("valid name"),
            answers: AnswerSet::new(),
            score: Score::zero(),
            created_at: at,
            viewed_at: at,
            viewed_period: ViewedPeriod::for_instant(at),
        }
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let repository = InMemorySubmissionRepository::default();
        repository.insert(record("sub-1", 1)).expect("first insert");

        assert!(matches!(
            repository.insert(record("sub-1", 2)),
            Err(RepositoryError::Conflict)
        ));
    }

    #[test]
    fn recent_orders_newest_first() {
        let repository = InMemorySubmissionRepository::default();
        repository.insert(record("sub-1", 1)).expect("insert");
        repository.insert(record("sub-2", 8)).expect("insert");
        repository.insert(record("sub-3", 4)).expect("insert");

        let ids: Vec<String> = repository
            .recent(2)
            .expect("listing")
            .into_iter()
            .map(|record| record.id.0)
            .collect();
        assert_eq!(ids, vec!["sub-2".to_string(), "sub-3".to_string()]);
    }

    #[test]
    fn delete_reports_missing_records() {
        let repository = InMemorySubmissionRepository::default();
        assert!(matches!(
            repository.delete(&SubmissionId("sub-9".to_string())),
            Err(RepositoryError::NotFound)
        ));
    }
}
