use serde::Serialize;

use crate::error::AppError;
use crate::registry::Registry;
use crate::report::ReportStore;
use crate::telemetry::metrics::{
    REPORT_COMPANIES_CHECKED, REPORT_COMPANIES_OVERDUE, REPORT_GENERATION_DURATION,
};

use super::criteria::{SearchCriteria, SearchRequest};
use super::evaluate::evaluate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub filename: String,
    pub overdue_count: usize,
    pub companies_checked: usize,
}

/// Validates the request, then runs search, evaluation and export.
///
/// Companies are evaluated one after another in search order, so report rows
/// keep that order. Only a failed search or a failed write aborts the run.
#[tracing::instrument(
    name = "pipeline report",
    skip(registry, store, request),
    fields(
        search.incorporated_from,
        search.incorporated_to,
        search.volume,
        report.companies_checked,
        report.overdue_count,
        report.duration_ms,
    )
)]
pub async fn generate_overdue_report(
    registry: &dyn Registry,
    store: &ReportStore,
    request: &SearchRequest,
) -> Result<ReportSummary, AppError> {
    let criteria = SearchCriteria::try_from(request)?;
    let start = std::time::Instant::now();

    let span = tracing::Span::current();
    span.record(
        "search.incorporated_from",
        tracing::field::display(criteria.incorporated_from),
    );
    span.record(
        "search.incorporated_to",
        tracing::field::display(criteria.incorporated_to),
    );
    span.record("search.volume", criteria.volume);

    // Stage 1: Clear out the previous report
    store.purge_prior_reports().await;

    // Stage 2: Search the registry
    let companies = registry
        .search_companies(
            criteria.incorporated_from,
            criteria.incorporated_to,
            criteria.volume,
        )
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    tracing::info!(companies = companies.len(), "Found companies");

    // Stage 3: Evaluate each company in order
    let total = companies.len();
    let mut records = Vec::new();
    for (index, company) in companies.iter().enumerate() {
        tracing::debug!(
            company.number = %company.company_number,
            progress = %format!("{}/{}", index + 1, total),
            "Checking company"
        );

        if let Some(record) = evaluate(registry, &company.company_number).await {
            records.push(record);
        }
    }

    // Stage 4: Export
    let filename = store.write(&records).await?;

    let duration = start.elapsed();
    REPORT_GENERATION_DURATION.record(duration.as_secs_f64(), &[]);
    REPORT_COMPANIES_CHECKED.record(total as f64, &[]);
    REPORT_COMPANIES_OVERDUE.record(records.len() as f64, &[]);

    span.record("report.companies_checked", total);
    span.record("report.overdue_count", records.len());
    span.record("report.duration_ms", duration.as_millis() as u64);

    tracing::info!(
        filename = %filename,
        overdue = records.len(),
        checked = total,
        "Overdue report generated"
    );

    Ok(ReportSummary {
        filename,
        overdue_count: records.len(),
        companies_checked: total,
    })
}
