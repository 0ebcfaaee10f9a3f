//! 记录持久化 - 业务能力层
//!
//! 以记录 ID 为键 upsert 到文档库

use tracing::{error, info};

use crate::error::StoreResult;
use crate::infrastructure::{DocumentStore, Filter, UpsertOutcome};
use crate::models::CanonicalRecord;

/// 记录持久化能力
///
/// 不持有存储资源，只借用
pub struct ExercisePersistence<'a, S: DocumentStore> {
    store: &'a S,
}

impl<'a, S: DocumentStore> ExercisePersistence<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// 写入单条记录
    pub fn persist(&self, record: &CanonicalRecord) -> StoreResult<UpsertOutcome> {
        let document = serde_json::to_value(record)?;
        self.store.upsert(&record.id, &document)
    }

    /// 写入一批记录，返回新增 + 修改的数量
    ///
    /// 任意一条失败时整批记为 0，不重试
    pub fn persist_batch(&self, records: &[CanonicalRecord]) -> usize {
        match self.try_persist_batch(records) {
            Ok(written) => {
                match self.store.count(&Filter::all()) {
                    Ok(total) => info!("💾 写入 {} 条记录，文档库共 {} 条", written, total),
                    Err(e) => info!("💾 写入 {} 条记录（统计总数失败: {}）", written, e),
                }
                written
            }
            Err(e) => {
                error!("❌ 写入文档库失败: {}", e);
                0
            }
        }
    }

    fn try_persist_batch(&self, records: &[CanonicalRecord]) -> StoreResult<usize> {
        let mut written = 0;
        for record in records {
            if self.persist(record)?.is_write() {
                written += 1;
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::infrastructure::{AggregateRow, SqliteStore};
    use crate::models::{OperationKind, RawExerciseTuple, SourceContext};
    use crate::services::{classifier, record_builder};
    use serde_json::Value as JsonValue;

    fn record(a: i64, b: i64, millis: i64) -> CanonicalRecord {
        let ctx = SourceContext {
            url: "https://x/sumas.php".to_string(),
            level_tier: 1,
            group_id: "G1".to_string(),
        };
        let tuple = RawExerciseTuple::new(OperationKind::Addition, a, b, a + b, &ctx);
        record_builder::build_at(&tuple, classifier::classify(tuple.kind, a, b), millis)
    }

    #[test]
    fn test_same_id_twice_keeps_one_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        let persistence = ExercisePersistence::new(&store);
        let r = record(3, 4, 42);

        assert_eq!(persistence.persist(&r).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(persistence.persist(&r).unwrap(), UpsertOutcome::Unchanged);
        assert_eq!(store.count(&Filter::all()).unwrap(), 1);
    }

    #[test]
    fn test_batch_counts_inserted_and_modified() {
        let store = SqliteStore::open_in_memory().unwrap();
        let persistence = ExercisePersistence::new(&store);

        let first = vec![record(1, 2, 1), record(3, 4, 1)];
        assert_eq!(persistence.persist_batch(&first), 2);
        // 完全相同的记录不计入
        assert_eq!(persistence.persist_batch(&first), 0);

        let mut changed = record(1, 2, 1);
        changed.usage_stats.times_recommended = 5;
        assert_eq!(persistence.persist_batch(&[changed]), 1);
        assert_eq!(store.count(&Filter::all()).unwrap(), 2);
    }

    struct BrokenStore;

    impl DocumentStore for BrokenStore {
        fn upsert(&self, _key: &str, _document: &JsonValue) -> StoreResult<UpsertOutcome> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }

        fn count(&self, _filter: &Filter) -> StoreResult<usize> {
            Ok(0)
        }

        fn find(&self, _filter: &Filter, _limit: Option<usize>) -> StoreResult<Vec<JsonValue>> {
            Ok(Vec::new())
        }

        fn aggregate(&self, _group_by: &[&str]) -> StoreResult<Vec<AggregateRow>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_store_failure_counts_zero() {
        let persistence = ExercisePersistence::new(&BrokenStore);
        assert_eq!(persistence.persist_batch(&[record(1, 1, 1)]), 0);
    }
}
