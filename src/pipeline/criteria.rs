use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppError;

/// Body of `POST /search-companies` as the front-end sends it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub incorporated_from: Option<String>,
    pub incorporated_to: Option<String>,
    pub volume: Option<Volume>,
}

/// Form inputs arrive either as JSON numbers or as numeric strings. Any
/// number is accepted here so that `-1.5` fails as negative rather than as
/// malformed JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Volume {
    Number(serde_json::Number),
    Text(String),
}

impl Volume {
    fn to_count(&self) -> Result<u32, AppError> {
        let value = match self {
            Volume::Number(n) => n.as_f64(),
            Volume::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::Validation("Volume must be a whole number.".into()))?;

        if value < 0.0 {
            return Err(AppError::Validation("Volume cannot be negative.".into()));
        }
        if value.fract() != 0.0 {
            return Err(AppError::Validation("Volume must be a whole number.".into()));
        }
        if value > f64::from(u32::MAX) {
            return Err(AppError::Validation("Volume is too large.".into()));
        }

        Ok(value as u32)
    }
}

/// A validated search: `incorporated_from <= incorporated_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCriteria {
    pub incorporated_from: NaiveDate,
    pub incorporated_to: NaiveDate,
    pub volume: u32,
}

impl TryFrom<&SearchRequest> for SearchCriteria {
    type Error = AppError;

    fn try_from(request: &SearchRequest) -> Result<Self, Self::Error> {
        let volume = request
            .volume
            .as_ref()
            .ok_or_else(|| AppError::Validation("Volume is required.".into()))?
            .to_count()?;

        let incorporated_from = parse_date("Incorporated From", request.incorporated_from.as_deref())?;
        let incorporated_to = parse_date("Incorporated To", request.incorporated_to.as_deref())?;

        if incorporated_to < incorporated_from {
            return Err(AppError::Validation(
                "\"Incorporated To\" date cannot be less than \"Incorporated From\" date.".into(),
            ));
        }

        Ok(Self {
            incorporated_from,
            incorporated_to,
            volume,
        })
    }
}

fn parse_date(label: &str, value: Option<&str>) -> Result<NaiveDate, AppError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("\"{label}\" date is required.")))?;

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("\"{label}\" date must use the YYYY-MM-DD format."))
    })
}
