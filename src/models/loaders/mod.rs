pub mod source_loader;

pub use source_loader::{load_source_urls, SourceList};
