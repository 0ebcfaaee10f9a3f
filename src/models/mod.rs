pub mod exercise;
pub mod loaders;
pub mod record;

pub use exercise::{OperationKind, RawExerciseTuple, RawField, SourceContext};
pub use loaders::{load_source_urls, SourceList};
pub use record::{
    CanonicalRecord, DifficultyClassification, DifficultyLevel, RecordMetadata, SourceRef, Step,
    StepDetail, Taxonomy, UsageStats,
};
