pub mod config;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

pub use config::Config;

use registry::Registry;
use report::ReportStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub registry: Arc<dyn Registry>,
    pub reports: ReportStore,
}
