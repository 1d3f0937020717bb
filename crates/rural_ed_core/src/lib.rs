pub mod catalog;
pub mod domain;
pub mod feedback;
pub mod planner;
pub mod ports;
pub mod qa;
pub mod retriever;
pub mod session;
pub mod settings;
pub mod summarizer;

pub use catalog::{CatalogError, CatalogLoad};
pub use domain::{
    Assessment, DayPlan, Language, QARecord, Resource, SessionDocument, StudentProfile, StudyPlan,
};
pub use feedback::FeedbackAgent;
pub use ports::{
    PortError, PortResult, QuestionAnsweringService, SessionRepository, SummarizationService,
};
pub use qa::{MockQaAgent, TemplateBank};
pub use retriever::RetrieverAgent;
pub use settings::PipelineSettings;
pub use summarizer::MockSummarizer;
