use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use careletter_core::{ChoiceContext, ClientType, Placeholders, Track};
use careletter_renderer::AdviceSummary;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::AppError;

/// One letter's worth of operator input, read from a TOML file.
///
/// Money is best written as a string (`hourly_rate = "250"`) so that no
/// precision is lost on the way in.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub our_ref: String,
    #[serde(default)]
    pub your_ref: String,
    /// `YYYY-MM-DD`; today when absent.
    pub letter_date: Option<String>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_address_line1: String,
    #[serde(default)]
    pub client_address_line2: Option<String>,
    #[serde(default)]
    pub client_postcode: String,
    pub client_type: Option<ClientType>,
    #[serde(default)]
    pub claim_assigned: bool,
    pub track: Option<Track>,
    #[serde(default)]
    pub dispute_nature: String,
    #[serde(default)]
    pub initial_steps: String,
    #[serde(default)]
    pub timescale: String,
    pub hourly_rate: Option<Decimal>,
    pub cost: Option<CostEstimate>,
    #[serde(default)]
    pub fee_lines: Vec<String>,
    #[serde(default)]
    pub advice: AdviceInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CostEstimate {
    Range { low: Decimal, high: Decimal },
    Fixed { fixed_fee: Decimal },
}

impl CostEstimate {
    pub fn text(&self) -> String {
        match self {
            CostEstimate::Range { low, high } => {
                format!("{} to {} plus VAT", format_money(*low), format_money(*high))
            }
            CostEstimate::Fixed { fixed_fee } => {
                format!("a fixed fee of {} plus VAT", format_money(*fixed_fee))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdviceInput {
    /// Defaults to the letter date.
    pub date: Option<String>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub content: String,
}

impl Request {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let source = fs::read_to_string(path).map_err(|source| AppError::RequestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(source)?)
    }

    /// Rejects requests that cannot produce a usable letter.
    pub fn validate(&self) -> Result<(), AppError> {
        let required_text = [
            ("our_ref", &self.our_ref),
            ("client_name", &self.client_name),
            ("client_address_line1", &self.client_address_line1),
            ("client_postcode", &self.client_postcode),
        ];
        for (field, value) in required_text {
            if value.trim().is_empty() {
                return Err(AppError::MissingField(field));
            }
        }
        self.context()?;

        if required("hourly_rate", self.hourly_rate.as_ref())?.is_sign_negative() {
            return Err(invalid("hourly_rate", "must not be negative"));
        }
        match required("cost", self.cost.as_ref())? {
            CostEstimate::Range { low, high } => {
                if low.is_sign_negative() || high.is_sign_negative() {
                    return Err(invalid("cost", "must not be negative"));
                }
                if low > high {
                    return Err(invalid("cost", "low end exceeds high end"));
                }
            }
            CostEstimate::Fixed { fixed_fee } => {
                if fixed_fee.is_sign_negative() {
                    return Err(invalid("cost", "must not be negative"));
                }
            }
        }
        Ok(())
    }

    pub fn context(&self) -> Result<ChoiceContext, AppError> {
        let client_type = *required("client_type", self.client_type.as_ref())?;
        let track = *required("track", self.track.as_ref())?;
        Ok(ChoiceContext::new(client_type, self.claim_assigned, track))
    }

    pub fn letter_date(&self) -> Result<Date, AppError> {
        match &self.letter_date {
            Some(text) => parse_date("letter_date", text),
            None => Ok(OffsetDateTime::now_utc().date()),
        }
    }

    /// Placeholder values for this request, layered over the firm details.
    pub fn placeholders(
        &self,
        firm: &BTreeMap<String, String>,
        letter_date: Date,
    ) -> Result<Placeholders, AppError> {
        let mut placeholders: Placeholders = firm.iter().map(|(k, v)| (k.clone(), v)).collect();
        placeholders.extend([
            ("our_ref", self.our_ref.trim().to_string()),
            ("your_ref", self.your_ref.trim().to_string()),
            ("letter_date", format_date("letter_date", letter_date)?),
            ("client_name", self.client_name.trim().to_string()),
            ("client_address_line1", self.client_address_line1.trim().to_string()),
            (
                "client_address_line2",
                self.client_address_line2
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
            ),
            ("client_postcode", self.client_postcode.trim().to_string()),
            ("client_address", self.address()),
            ("dispute_nature", self.dispute_nature.trim().to_string()),
            ("initial_steps", self.initial_steps.trim().to_string()),
            ("timescale", self.timescale.trim().to_string()),
            (
                "track_name",
                required("track", self.track.as_ref())?
                    .display_name()
                    .to_string(),
            ),
            (
                "hourly_rate",
                format_money(*required("hourly_rate", self.hourly_rate.as_ref())?),
            ),
            ("cost_estimate", required("cost", self.cost.as_ref())?.text()),
        ]);
        Ok(placeholders)
    }

    /// Address lines joined with commas, skipping empty ones.
    pub fn address(&self) -> String {
        [
            Some(self.client_address_line1.as_str()),
            self.client_address_line2.as_deref(),
            Some(self.client_postcode.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }

    pub fn fee_lines(&self, defaults: &[String]) -> Vec<String> {
        if self.fee_lines.is_empty() {
            defaults.to_vec()
        } else {
            self.fee_lines.clone()
        }
    }

    pub fn advice_summary(&self, letter_date: Date) -> Result<AdviceSummary, AppError> {
        let date = match &self.advice.date {
            Some(text) => parse_date("advice.date", text)?,
            None => letter_date,
        };
        Ok(AdviceSummary {
            client_name: self.client_name.trim().to_string(),
            our_ref: self.our_ref.trim().to_string(),
            date: format_date("advice.date", date)?,
            method: self.advice.method.trim().to_string(),
            content: self.advice.content.trim().to_string(),
        })
    }

    /// File-name fragment for the client: whitespace becomes `_` and anything
    /// that is not alphanumeric, `-` or `_` is dropped.
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .client_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .chars()
            .filter(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_'))
            .collect();
        if stem.is_empty() {
            "Client".to_string()
        } else {
            stem
        }
    }
}

fn required<'a, T>(field: &'static str, value: Option<&'a T>) -> Result<&'a T, AppError> {
    value.ok_or(AppError::MissingField(field))
}

fn invalid(field: &'static str, reason: &str) -> AppError {
    AppError::InvalidField {
        field,
        reason: reason.to_string(),
    }
}

fn parse_date(field: &'static str, text: &str) -> Result<Date, AppError> {
    Date::parse(text.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|err| invalid(field, &err.to_string()))
}

/// `15 October 2026`.
pub fn format_date(field: &'static str, date: Date) -> Result<String, AppError> {
    date.format(format_description!(
        "[day padding:none] [month repr:long] [year]"
    ))
    .map_err(|err| invalid(field, &err.to_string()))
}

/// Pounds with two decimal places and thousands separators, e.g. `£1,250.00`.
pub fn format_money(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs().round_dp(2));
    let (whole, pence) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}£{}.{}", sign, grouped, pence)
}
