use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::store::schema::{AnswerRecord, StorageData};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateKind {
    Inserted,
    Refreshed,
}

/// Last confirmed-correct answer for every (question, translation) pair
/// seen so far. Records are only ever added or overwritten.
#[derive(Clone, Debug, Default)]
pub struct AnswerStore {
    records: Vec<AnswerRecord>,
    index: HashMap<(String, String), usize>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted records. A duplicated pair keeps the later entry.
    pub fn from_records(records: Vec<AnswerRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            let key = (record.question.clone(), record.translation.clone());
            match store.index.get(&key) {
                Some(&i) => store.records[i] = record,
                None => {
                    store.index.insert(key, store.records.len());
                    store.records.push(record);
                }
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    pub fn find(&self, question: &str, translation: &str) -> Option<&AnswerRecord> {
        self.index
            .get(&(question.to_string(), translation.to_string()))
            .map(|&i| &self.records[i])
    }

    /// Overwrite the pair's answer in place, or append a new record.
    pub fn update(
        &mut self,
        question: &str,
        translation: &str,
        answer: &str,
        at: DateTime<Utc>,
    ) -> UpdateKind {
        let key = (question.to_string(), translation.to_string());
        if let Some(&i) = self.index.get(&key) {
            let record = &mut self.records[i];
            record.answer = answer.to_string();
            record.updated_at = at;
            return UpdateKind::Refreshed;
        }

        self.index.insert(key, self.records.len());
        self.records.push(AnswerRecord {
            question: question.to_string(),
            translation: translation.to_string(),
            answer: answer.to_string(),
            updated_at: at,
        });
        UpdateKind::Inserted
    }

    pub fn update_now(&mut self, question: &str, translation: &str, answer: &str) -> UpdateKind {
        self.update(question, translation, answer, Utc::now())
    }

    /// A stored answer other than `exclude`, chosen uniformly over records.
    pub fn pick_decoy<R: Rng + ?Sized>(&self, exclude: &str, rng: &mut R) -> Option<&str> {
        let pool: Vec<&str> = self
            .records
            .iter()
            .map(|r| r.answer.as_str())
            .filter(|answer| *answer != exclude)
            .collect();
        pool.choose(rng).copied()
    }

    pub fn to_data(&self) -> StorageData {
        StorageData {
            records: self.records.clone(),
        }
    }
}

impl From<StorageData> for AnswerStore {
    fn from(data: StorageData) -> Self {
        Self::from_records(data.records)
    }
}
