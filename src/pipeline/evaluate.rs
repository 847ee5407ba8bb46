use crate::registry::{CompanyProfile, Officer, Registry, RegistryError};

pub const NOT_AVAILABLE: &str = "N/A";

/// Details of the first officer the registry lists for a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfficerSummary {
    pub name: String,
    pub nationality: String,
    pub occupation: String,
    pub role: String,
    pub country_of_residence: String,
}

impl OfficerSummary {
    pub fn not_available() -> Self {
        Self {
            name: NOT_AVAILABLE.to_string(),
            nationality: NOT_AVAILABLE.to_string(),
            occupation: NOT_AVAILABLE.to_string(),
            role: NOT_AVAILABLE.to_string(),
            country_of_residence: NOT_AVAILABLE.to_string(),
        }
    }

    // Only the first officer is reported; no filtering by role or resignation.
    pub fn from_officers(officers: &[Officer]) -> Self {
        let Some(officer) = officers.first() else {
            return Self::not_available();
        };

        Self {
            name: or_na(&officer.name),
            nationality: or_na(&officer.nationality),
            occupation: or_na(&officer.occupation),
            role: or_na(&officer.officer_role),
            country_of_residence: or_na(&officer.country_of_residence),
        }
    }

    /// Degrades a failed officers lookup to the "N/A" summary.
    pub fn from_fetch(company_number: &str, fetched: Result<Vec<Officer>, RegistryError>) -> Self {
        match fetched {
            Ok(officers) => Self::from_officers(&officers),
            Err(err) => {
                tracing::warn!(
                    company.number = %company_number,
                    error = %err,
                    "Error fetching officers, reporting N/A"
                );
                Self::not_available()
            }
        }
    }
}

/// One spreadsheet row. Every field is rendered text so rows stay uniform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueRecord {
    pub name: String,
    pub number: String,
    pub company_type: String,
    pub registered_office_address: String,
    pub confirmation_statement_overdue: String,
    pub confirmation_next_due: String,
    pub confirmation_next_made_up_to: String,
    pub accounts_overdue: String,
    pub accounts_next_due: String,
    pub accounts_next_made_up_to: String,
    pub officer: OfficerSummary,
}

impl OverdueRecord {
    pub const COLUMNS: [&'static str; 15] = [
        "Name",
        "Number",
        "Company_Type",
        "Registered_Office_Address",
        "Confirmation_Statement_Overdue",
        "Confirmation_next_due",
        "Confirmation_next_made_up_to",
        "Accounts_Overdue",
        "Accounts_next_due",
        "Accounts_next_made_up_to",
        "Officer_Name",
        "Nationality",
        "Occupation",
        "Officer_Role",
        "Country_of_Residence",
    ];

    /// Missing filing sections render as "N/A" so every row has all columns.
    pub fn from_profile(profile: &CompanyProfile, officer: OfficerSummary) -> Self {
        let (confirmation_statement_overdue, confirmation_next_due, confirmation_next_made_up_to) =
            match &profile.confirmation_statement {
                Some(statement) => (
                    yes_no(statement.is_overdue()),
                    or_na(&statement.next_due),
                    or_na(&statement.next_made_up_to),
                ),
                None => not_available_triple(),
            };

        let (accounts_overdue, accounts_next_due, accounts_next_made_up_to) =
            match &profile.accounts {
                Some(accounts) => (
                    yes_no(accounts.is_overdue()),
                    or_na(&accounts.next_due),
                    or_na(&accounts.next_made_up_to),
                ),
                None => not_available_triple(),
            };

        Self {
            name: profile.company_name.clone(),
            number: profile.company_number.clone(),
            company_type: profile.company_type.clone(),
            registered_office_address: profile
                .registered_office_address
                .clone()
                .unwrap_or_default()
                .one_line(),
            confirmation_statement_overdue,
            confirmation_next_due,
            confirmation_next_made_up_to,
            accounts_overdue,
            accounts_next_due,
            accounts_next_made_up_to,
            officer,
        }
    }

    /// Cell values in `COLUMNS` order.
    pub fn cells(&self) -> [&str; 15] {
        [
            &self.name,
            &self.number,
            &self.company_type,
            &self.registered_office_address,
            &self.confirmation_statement_overdue,
            &self.confirmation_next_due,
            &self.confirmation_next_made_up_to,
            &self.accounts_overdue,
            &self.accounts_next_due,
            &self.accounts_next_made_up_to,
            &self.officer.name,
            &self.officer.nationality,
            &self.officer.occupation,
            &self.officer.role,
            &self.officer.country_of_residence,
        ]
    }
}

fn or_na(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn yes_no(flag: bool) -> String {
    let rendered = if flag { "Yes" } else { "No" };
    rendered.to_string()
}

fn not_available_triple() -> (String, String, String) {
    (
        NOT_AVAILABLE.to_string(),
        NOT_AVAILABLE.to_string(),
        NOT_AVAILABLE.to_string(),
    )
}

/// Checks one company and returns its report row if a filing is overdue.
///
/// A failed profile lookup counts as "not overdue": the company is skipped and
/// the batch carries on. Officers are only fetched for qualifying companies.
#[tracing::instrument(
    name = "pipeline_stage evaluate",
    skip(registry),
    fields(
        pipeline.stage = "evaluate",
        company.overdue,
    )
)]
pub async fn evaluate(registry: &dyn Registry, company_number: &str) -> Option<OverdueRecord> {
    let profile = match registry.fetch_profile(company_number).await {
        Ok(profile) => profile,
        Err(err) => {
            tracing::warn!(
                company.number = %company_number,
                error = %err,
                "Error fetching company profile, skipping"
            );
            return None;
        }
    };

    let overdue = profile.is_overdue();
    tracing::Span::current().record("company.overdue", overdue);

    if !overdue {
        return None;
    }

    let officer =
        OfficerSummary::from_fetch(company_number, registry.fetch_officers(company_number).await);

    Some(OverdueRecord::from_profile(&profile, officer))
}
