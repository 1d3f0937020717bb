pub mod qa_llm;
pub mod session_store;
pub mod summary_llm;

pub use qa_llm::OpenAiQaAdapter;
pub use session_store::JsonSessionStore;
pub use summary_llm::OpenAiSummaryAdapter;
