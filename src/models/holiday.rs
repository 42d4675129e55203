use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{as_object, is_truthy, text_field, ValidationError};
use crate::database::{Document, ObjectId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    /// ISO-8601 UTC timestamp, millisecond precision
    pub date: String,
    pub holiday_type: String,
    pub year: i32,
    #[serde(default)]
    pub alternate_working_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document for Holiday {
    const COLLECTION: &'static str = "holidays";

    fn id(&self) -> &ObjectId {
        &self.id
    }
}

impl Holiday {
    pub fn new(title: impl Into<String>, date: DateTime<Utc>, holiday_type: impl Into<String>, year: i32) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            title: title.into(),
            date: format_timestamp(&date),
            holiday_type: holiday_type.into(),
            year,
            alternate_working_date: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }
}

const REQUIRED: [&str; 4] = ["title", "date", "holidayType", "year"];

/// Validated body of a holiday PUT/PATCH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayUpdate {
    pub title: String,
    pub date: DateTime<Utc>,
    pub holiday_type: String,
    pub year: i32,
    pub alternate_working_date: Option<DateTime<Utc>>,
}

/// Fields written to the store for a holiday update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayChanges {
    pub title: String,
    pub date: String,
    pub holiday_type: String,
    pub year: i32,
    pub alternate_working_date: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl HolidayUpdate {
    pub fn from_body(body: &Value) -> Result<Self, ValidationError> {
        let object = as_object(body)?;

        let missing: Vec<&'static str> = REQUIRED
            .iter()
            .copied()
            .filter(|field| !is_truthy(object, field))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields {
                message: "Please provide all required fields.",
                fields: missing,
            });
        }

        let title = text_field(object, "title").ok_or_else(|| invalid(object, "title"))?;
        let holiday_type = text_field(object, "holidayType").ok_or_else(|| invalid(object, "holidayType"))?;
        let year = parse_year(object)?;
        let date = required_date(object, "date")?;

        let alternate_working_date = if is_truthy(object, "alternateWorkingDate") {
            Some(required_date(object, "alternateWorkingDate")?)
        } else {
            None
        };

        Ok(Self {
            title,
            date,
            holiday_type,
            year,
            alternate_working_date,
        })
    }

    pub fn into_changes(self, now: DateTime<Utc>) -> HolidayChanges {
        HolidayChanges {
            title: self.title,
            date: format_timestamp(&self.date),
            holiday_type: self.holiday_type,
            year: self.year,
            alternate_working_date: self.alternate_working_date.as_ref().map(format_timestamp),
            updated_at: now,
        }
    }
}

fn invalid(object: &Map<String, Value>, field: &'static str) -> ValidationError {
    ValidationError::InvalidField {
        field,
        value: object.get(field).map(Value::to_string).unwrap_or_default(),
    }
}

/// A whole number in 1..=9999, given as a JSON number (`2024` or `2024.0`) or
/// a numeric string
fn parse_year(object: &Map<String, Value>) -> Result<i32, ValidationError> {
    let year = match object.get("year") {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    };
    match year {
        Some(y) if (1..=9999).contains(&y) => Ok(y as i32),
        _ => Err(invalid(object, "year")),
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15).then(|| f as i64)
}

fn required_date(object: &Map<String, Value>, field: &'static str) -> Result<DateTime<Utc>, ValidationError> {
    let value = object.get(field).unwrap_or(&Value::Null);
    parse_date(value).ok_or_else(|| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Parse a calendar date or timestamp. Strings may be RFC 3339, a bare
/// `YYYY-MM-DD`, or a naive date-time (taken as UTC); numbers are epoch millis.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    const NAIVE_FORMATS: [&str; 4] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.and_utc())
}

/// `2024-11-01T00:00:00.000Z`
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
