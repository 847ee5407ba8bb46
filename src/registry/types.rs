//! Response shapes for the Companies House endpoints the report reads.
//!
//! Only the fields the report uses are modelled. Everything the registry may
//! omit is optional so that a sparse profile still decodes.

use serde::Deserialize;

/// `GET /advanced-search/companies`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<CompanyStub>,
}

/// One search hit. Only the number is needed to drive evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompanyStub {
    pub company_number: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_status: Option<String>,
}

/// `GET /company/{company_number}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_number: String,
    #[serde(rename = "type", default)]
    pub company_type: String,
    #[serde(default)]
    pub registered_office_address: Option<RegisteredOfficeAddress>,
    #[serde(default)]
    pub confirmation_statement: Option<ConfirmationStatement>,
    #[serde(default)]
    pub accounts: Option<Accounts>,
}

impl CompanyProfile {
    pub fn confirmation_statement_overdue(&self) -> bool {
        self.confirmation_statement
            .as_ref()
            .is_some_and(ConfirmationStatement::is_overdue)
    }

    pub fn accounts_overdue(&self) -> bool {
        self.accounts.as_ref().is_some_and(Accounts::is_overdue)
    }

    pub fn is_overdue(&self) -> bool {
        self.confirmation_statement_overdue() || self.accounts_overdue()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegisteredOfficeAddress {
    #[serde(default)]
    pub address_line_1: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl RegisteredOfficeAddress {
    /// `line 1, locality, country, postcode`, with missing parts left blank.
    pub fn one_line(&self) -> String {
        [
            &self.address_line_1,
            &self.locality,
            &self.country,
            &self.postal_code,
        ]
        .map(|part| part.as_deref().unwrap_or(""))
        .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfirmationStatement {
    #[serde(default)]
    pub overdue: Option<bool>,
    #[serde(default)]
    pub next_due: Option<String>,
    #[serde(default)]
    pub next_made_up_to: Option<String>,
}

impl ConfirmationStatement {
    pub fn is_overdue(&self) -> bool {
        self.overdue.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Accounts {
    #[serde(default)]
    pub next_accounts: Option<NextAccounts>,
    #[serde(default)]
    pub next_due: Option<String>,
    #[serde(default)]
    pub next_made_up_to: Option<String>,
}

impl Accounts {
    pub fn is_overdue(&self) -> bool {
        self.next_accounts
            .as_ref()
            .and_then(|next| next.overdue)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NextAccounts {
    #[serde(default)]
    pub overdue: Option<bool>,
}

/// `GET /company/{company_number}/officers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfficerList {
    #[serde(default)]
    pub items: Vec<Officer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Officer {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub officer_role: Option<String>,
    #[serde(default)]
    pub country_of_residence: Option<String>,
}
