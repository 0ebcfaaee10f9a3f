pub mod ingest_flow;
pub mod ingest_state;
pub mod url_ctx;

pub use ingest_flow::{IngestFlow, UrlOutcome};
pub use ingest_state::{IngestState, StateMachine};
pub use url_ctx::UrlCtx;
