//! 文档存储 - 基础设施层
//!
//! 以 JSON 文档为单位的存储能力：按 key upsert、按条件计数/查询、按路径分组聚合。
//! 路径使用 JSON path 写法，例如 `$.metadata.tipo_operacion`。

use std::path::Path;

use rusqlite::{params_from_iter, Connection, OptionalExtension};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::StoreResult;

/// upsert 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// 新插入
    Inserted,
    /// 已存在且内容被修改
    Modified,
    /// 已存在且内容相同
    Unchanged,
}

impl UpsertOutcome {
    /// 是否实际写入了数据
    pub fn is_write(self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged)
    }
}

/// 查询条件：若干条件的合取
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    /// 路径上的值（按文本比较）等于给定值
    Eq(String, String),
    /// 路径存在且不为 null
    Exists(String),
}

impl Filter {
    /// 匹配全部文档
    pub fn all() -> Self {
        Self::default()
    }

    /// 追加一个相等条件
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Eq(path.into(), value.into()));
        self
    }

    /// 追加一个存在性条件
    pub fn exists(mut self, path: impl Into<String>) -> Self {
        self.conditions.push(Condition::Exists(path.into()));
        self
    }

    fn where_clause(&self) -> (String, Vec<String>) {
        if self.conditions.is_empty() {
            return (String::new(), Vec::new());
        }
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for condition in &self.conditions {
            match condition {
                Condition::Eq(path, value) => {
                    clauses.push(format!(
                        "CAST(json_extract(document, ?{}) AS TEXT) = ?{}",
                        params.len() + 1,
                        params.len() + 2
                    ));
                    params.push(path.clone());
                    params.push(value.clone());
                }
                Condition::Exists(path) => {
                    clauses.push(format!(
                        "json_extract(document, ?{}) IS NOT NULL",
                        params.len() + 1
                    ));
                    params.push(path.clone());
                }
            }
        }
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

/// 分组聚合的一行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRow {
    /// 与分组路径一一对应的键，缺失字段为 None
    pub keys: Vec<Option<String>>,
    pub count: usize,
}

/// 文档存储能力
pub trait DocumentStore {
    /// 按 key 写入文档，已存在则覆盖
    fn upsert(&self, key: &str, document: &JsonValue) -> StoreResult<UpsertOutcome>;

    /// 统计满足条件的文档数量
    fn count(&self, filter: &Filter) -> StoreResult<usize>;

    /// 查询满足条件的文档
    fn find(&self, filter: &Filter, limit: Option<usize>) -> StoreResult<Vec<JsonValue>>;

    /// 按若干路径分组计数，结果按键升序
    fn aggregate(&self, group_by: &[&str]) -> StoreResult<Vec<AggregateRow>>;
}

/// 基于 SQLite 的文档存储
///
/// 每个文档以 JSON 文本保存在一行中，主键为文档 key
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// 打开（或创建）数据库文件
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self { conn };
        store.init_schema()?;
        info!("✓ 文档库已打开: {}", path.display());
        Ok(store)
    }

    /// 打开内存数据库
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS problems (
                problem_id TEXT PRIMARY KEY,
                document   TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(())
    }
}

impl DocumentStore for SqliteStore {
    fn upsert(&self, key: &str, document: &JsonValue) -> StoreResult<UpsertOutcome> {
        let serialized = serde_json::to_string(document)?;
        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT document FROM problems WHERE problem_id = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            None => {
                tx.execute(
                    "INSERT INTO problems (problem_id, document) VALUES (?1, ?2)",
                    [key, serialized.as_str()],
                )?;
                UpsertOutcome::Inserted
            }
            Some(previous) if previous == serialized => UpsertOutcome::Unchanged,
            Some(_) => {
                tx.execute(
                    "UPDATE problems SET document = ?2, updated_at = datetime('now') \
                     WHERE problem_id = ?1",
                    [key, serialized.as_str()],
                )?;
                UpsertOutcome::Modified
            }
        };

        tx.commit()?;
        debug!("upsert {} -> {:?}", key, outcome);
        Ok(outcome)
    }

    fn count(&self, filter: &Filter) -> StoreResult<usize> {
        let (where_clause, params) = filter.where_clause();
        let sql = format!("SELECT COUNT(*) FROM problems{}", where_clause);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(count as usize)
    }

    fn find(&self, filter: &Filter, limit: Option<usize>) -> StoreResult<Vec<JsonValue>> {
        let (where_clause, params) = filter.where_clause();
        let sql = format!(
            "SELECT problem_id, document FROM problems{} ORDER BY rowid{}",
            where_clause,
            match limit {
                Some(n) => format!(" LIMIT {}", n),
                None => String::new(),
            }
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(key, raw)| {
                serde_json::from_str(&raw)
                    .map_err(|source| crate::error::StoreError::Deserialize { key, source })
            })
            .collect()
    }

    fn aggregate(&self, group_by: &[&str]) -> StoreResult<Vec<AggregateRow>> {
        if group_by.is_empty() {
            let count = self.count(&Filter::all())?;
            return Ok(vec![AggregateRow {
                keys: Vec::new(),
                count,
            }]);
        }

        let columns: Vec<String> = (0..group_by.len())
            .map(|i| format!("CAST(json_extract(document, ?{}) AS TEXT) AS k{}", i + 1, i))
            .collect();
        let keys: Vec<String> = (0..group_by.len()).map(|i| format!("k{}", i)).collect();
        let sql = format!(
            "SELECT {}, COUNT(*) FROM problems GROUP BY {} ORDER BY {}",
            columns.join(", "),
            keys.join(", "),
            keys.join(", ")
        );

        let width = group_by.len();
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(group_by.iter()), |row| {
                let mut keys = Vec::with_capacity(width);
                for i in 0..width {
                    keys.push(row.get::<_, Option<String>>(i)?);
                }
                let count: i64 = row.get(width)?;
                Ok(AggregateRow {
                    keys,
                    count: count as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use serde_json::json;

    fn doc(kind: &str, statement: &str) -> JsonValue {
        json!({
            "enunciado": statement,
            "metadata": {
                "tipo_operacion": kind,
                "dificultad": { "nivel": "Básico", "score": 0.8 }
            }
        })
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("problems.sqlite");
        let store = SqliteStore::open(&path).unwrap();
        store.upsert("P1", &doc("suma", "Calcula: 1 + 1")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_open_reports_unusable_parent() {
        // 父路径是普通文件，无法创建目录
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().join("problems.sqlite");
        let err = SqliteStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Io(_)), "{:?}", err);
    }

    #[test]
    fn test_upsert_outcomes() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = doc("suma", "Calcula: 3 + 4");

        assert_eq!(store.upsert("P1", &first).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(store.upsert("P1", &first).unwrap(), UpsertOutcome::Unchanged);
        assert_eq!(
            store.upsert("P1", &doc("suma", "Calcula: 3 + 5")).unwrap(),
            UpsertOutcome::Modified
        );
        assert_eq!(store.count(&Filter::all()).unwrap(), 1);
    }

    #[test]
    fn test_count_and_find_with_filter() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert("P1", &doc("suma", "Calcula: 1 + 1")).unwrap();
        store.upsert("P2", &doc("resta", "Calcula: 5 - 1")).unwrap();
        store.upsert("P3", &doc("suma", "Calcula: 2 + 2")).unwrap();

        let sums = Filter::all().eq("$.metadata.tipo_operacion", "suma");
        assert_eq!(store.count(&sums).unwrap(), 2);

        let found = store.find(&sums, Some(1)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["enunciado"], json!("Calcula: 1 + 1"));

        let numeric = Filter::all().eq("$.metadata.dificultad.score", "0.8");
        assert_eq!(store.count(&numeric).unwrap(), 3);
    }

    #[test]
    fn test_exists_filter() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert("P1", &doc("suma", "Calcula: 1 + 1")).unwrap();
        store.upsert("P2", &json!({ "enunciado": "sin tipo" })).unwrap();

        let typed = Filter::all().exists("$.metadata.tipo_operacion");
        assert_eq!(store.count(&typed).unwrap(), 1);

        let typed_sums = typed.eq("$.metadata.tipo_operacion", "suma");
        assert_eq!(store.find(&typed_sums, Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_aggregate_groups_and_missing_keys() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.upsert("P1", &doc("suma", "Calcula: 1 + 1")).unwrap();
        store.upsert("P2", &doc("suma", "Calcula: 1 + 1")).unwrap();
        store.upsert("P3", &doc("resta", "Calcula: 5 - 1")).unwrap();
        store.upsert("P4", &json!({ "enunciado": "sin tipo" })).unwrap();

        let rows = store.aggregate(&["$.metadata.tipo_operacion"]).unwrap();
        assert_eq!(
            rows,
            vec![
                AggregateRow { keys: vec![None], count: 1 },
                AggregateRow { keys: vec![Some("resta".to_string())], count: 1 },
                AggregateRow { keys: vec![Some("suma".to_string())], count: 2 },
            ]
        );

        let pairs = store
            .aggregate(&["$.metadata.tipo_operacion", "$.enunciado"])
            .unwrap();
        let dup = pairs.iter().find(|r| r.count > 1).unwrap();
        assert_eq!(
            dup.keys,
            vec![Some("suma".to_string()), Some("Calcula: 1 + 1".to_string())]
        );
    }
}
