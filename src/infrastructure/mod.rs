//! 基础设施层：持有稀缺资源（浏览器页面、数据库连接），只暴露能力

pub mod document_store;
pub mod js_executor;

pub use document_store::{AggregateRow, DocumentStore, Filter, SqliteStore, UpsertOutcome};
pub use js_executor::{JsExecutor, PageRenderer};
