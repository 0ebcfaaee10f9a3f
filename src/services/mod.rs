pub mod classifier;
pub mod dispatcher;
pub mod page_reader;
pub mod parsers;
pub mod persistence;
pub mod record_builder;
pub mod report;

pub use dispatcher::UrlDispatcher;
pub use page_reader::PageReader;
pub use parsers::ExerciseParser;
pub use persistence::ExercisePersistence;
pub use report::{MetricsCollector, MetricsReport};
