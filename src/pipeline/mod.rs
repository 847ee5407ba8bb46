pub mod criteria;
pub mod evaluate;
pub mod orchestrator;

pub use criteria::{SearchCriteria, SearchRequest};
pub use evaluate::{OfficerSummary, OverdueRecord, evaluate};
pub use orchestrator::{ReportSummary, generate_overdue_report};
