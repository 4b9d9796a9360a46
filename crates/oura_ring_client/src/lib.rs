//! `OuraClient` trait and the category model for the Oura v2 `usercollection` API.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod normalize;

/// One unstructured record as returned by the API (normally a JSON object).
pub type Record = serde_json::Value;

/// Extracted records for every fetched category, in fetch order.
pub type CategoryData = BTreeMap<Category, Vec<Record>>;

/// Time-of-day suffix the heart-rate endpoint expects on both range bounds.
pub const HEART_RATE_TIME_SUFFIX: &str = "T00:00:00-23:59";

#[derive(Debug, Error)]
pub enum OuraError {
    #[error("Request failed with error: {status}{}", detail_suffix(.detail))]
    RequestFailed { status: u16, detail: Option<String> },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("unexpected {category} payload: {reason}")]
    UnexpectedPayload { category: Category, reason: String },
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(" - {d}")).unwrap_or_default()
}

/// The ten data types the client knows how to fetch.
///
/// Variant order is the order endpoints are requested in by
/// [`OuraClient::fetch_all`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HeartRate,
    PersonalInfo,
    Sessions,
    Tag,
    Workout,
    DailyActivity,
    DailySleep,
    Sleep,
    Readiness,
    IdealBedtime,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::HeartRate,
        Category::PersonalInfo,
        Category::Sessions,
        Category::Tag,
        Category::Workout,
        Category::DailyActivity,
        Category::DailySleep,
        Category::Sleep,
        Category::Readiness,
        Category::IdealBedtime,
    ];

    /// Key used in aggregated output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::HeartRate => "heart_rate",
            Category::PersonalInfo => "personal_info",
            Category::Sessions => "sessions",
            Category::Tag => "tag",
            Category::Workout => "workout",
            Category::DailyActivity => "daily_activity",
            Category::DailySleep => "daily_sleep",
            Category::Sleep => "sleep",
            Category::Readiness => "readiness",
            Category::IdealBedtime => "ideal_bedtime",
        }
    }

    /// Human-readable label, as shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Category::HeartRate => "Heart Rate",
            Category::PersonalInfo => "Personal Info",
            Category::Sessions => "Sessions",
            Category::Tag => "Tags",
            Category::Workout => "Workouts",
            Category::DailyActivity => "Daily Activity",
            Category::DailySleep => "Daily Sleep",
            Category::Sleep => "Sleep",
            Category::Readiness => "Daily Readiness",
            Category::IdealBedtime => "Ideal Bedtime",
        }
    }

    /// Path segment under `/v2/usercollection/`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::HeartRate => "heartrate",
            Category::PersonalInfo => "personal_info",
            Category::Sessions => "sessions",
            Category::Tag => "tag",
            Category::Workout => "workout",
            Category::DailyActivity => "daily_activity",
            Category::DailySleep => "daily_sleep",
            Category::Sleep => "sleep",
            Category::Readiness => "daily_readiness",
            Category::IdealBedtime => "sleep_time",
        }
    }

    /// Build the date-range query for this category's endpoint.
    ///
    /// Heart rate takes datetimes under `start_datetime`/`end_datetime`; every
    /// other endpoint takes plain dates under `start_date`/`end_date`.
    pub fn range_query(&self, range: &DateRange) -> RangeQuery {
        match self {
            Category::HeartRate => RangeQuery {
                start_field: "start_datetime",
                end_field: "end_datetime",
                start: format!("{}{}", range.start, HEART_RATE_TIME_SUFFIX),
                end: format!("{}{}", range.end, HEART_RATE_TIME_SUFFIX),
            },
            _ => RangeQuery::dates(range),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = OuraError;

    /// Accepts the snake_case key, the human label, or the endpoint name,
    /// ignoring case and treating spaces and dashes as underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        let category = match key.as_str() {
            "heart_rate" | "heartrate" => Category::HeartRate,
            "personal_info" => Category::PersonalInfo,
            "sessions" | "session" => Category::Sessions,
            "tag" | "tags" => Category::Tag,
            "workout" | "workouts" => Category::Workout,
            "daily_activity" => Category::DailyActivity,
            "daily_sleep" => Category::DailySleep,
            "sleep" => Category::Sleep,
            "readiness" | "daily_readiness" => Category::Readiness,
            "ideal_bedtime" | "sleep_time" => Category::IdealBedtime,
            _ => return Err(OuraError::UnknownCategory(s.to_string())),
        };
        Ok(category)
    }
}

/// Inclusive date range, `YYYY-MM-DD` on both ends. Not validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Query parameters carrying a date range, with per-endpoint field names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeQuery {
    pub start_field: &'static str,
    pub end_field: &'static str,
    pub start: String,
    pub end: String,
}

impl RangeQuery {
    pub fn dates(range: &DateRange) -> Self {
        Self {
            start_field: "start_date",
            end_field: "end_date",
            start: range.start.clone(),
            end: range.end.clone(),
        }
    }

    pub fn pairs(&self) -> [(&str, &str); 2] {
        [
            (self.start_field, self.start.as_str()),
            (self.end_field, self.end.as_str()),
        ]
    }
}

#[async_trait]
pub trait OuraClient: Send + Sync + 'static {
    /// Fetch the raw JSON body of one category's endpoint.
    async fn fetch_endpoint(
        &self,
        category: Category,
        range: &DateRange,
    ) -> Result<serde_json::Value, OuraError>;

    /// Fetch only `category` and extract its records.
    async fn fetch_category(
        &self,
        category: Category,
        range: &DateRange,
    ) -> Result<Vec<Record>, OuraError> {
        let body = self.fetch_endpoint(category, range).await?;
        normalize::extract(category, body)
    }

    /// Fetch every category one after another. The first failure aborts the
    /// whole aggregation.
    async fn fetch_all(&self, range: &DateRange) -> Result<CategoryData, OuraError> {
        let mut data = CategoryData::new();
        for category in Category::ALL {
            let records = self.fetch_category(category, range).await?;
            data.insert(category, records);
        }
        tracing::info!(categories = data.len(), "aggregated oura data");
        Ok(data)
    }
}

/// Fetch all categories, then return only the requested one.
///
/// Fails if any endpoint fails, even when `category` itself was fetched
/// successfully.
pub async fn fetch_and_select<C>(
    client: &C,
    category: Category,
    range: &DateRange,
) -> Result<Vec<Record>, OuraError>
where
    C: OuraClient + ?Sized,
{
    let mut data = client.fetch_all(range).await?;
    data.remove(&category)
        .ok_or_else(|| OuraError::UnexpectedPayload {
            category,
            reason: "category missing from aggregated data".into(),
        })
}

/// Fetch `category` for `start_date..=end_date` from the public Oura API.
pub async fn fetch_real_data(
    category: Category,
    access_token: secrecy::SecretString,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<Record>, OuraError> {
    fetch_real_data_at(
        http_client::DEFAULT_BASE_URL,
        category,
        access_token,
        start_date,
        end_date,
    )
    .await
}

/// [`fetch_real_data`] against another API host, e.g. a mock server.
pub async fn fetch_real_data_at(
    base_url: &str,
    category: Category,
    access_token: secrecy::SecretString,
    start_date: &str,
    end_date: &str,
) -> Result<Vec<Record>, OuraError> {
    let client = http_client::ReqwestOuraClient::new(base_url, access_token);
    fetch_and_select(&client, category, &DateRange::new(start_date, end_date)).await
}
