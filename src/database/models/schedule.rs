use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{sqlite::SqliteRow, types::Json, FromRow, Row};

/// A class that repeats on a set of weekdays until an optional expiry date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringSchedule {
    pub id: i64,
    pub school_name: String,
    pub class_name: String,
    pub days_of_week: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    pub expiry_date: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for RecurringSchedule {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let Json(days_of_week): Json<Vec<String>> = row.try_get("days_of_week")?;
        Ok(Self {
            id: row.try_get("id")?,
            school_name: row.try_get("school_name")?,
            class_name: row.try_get("class_name")?,
            days_of_week,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            expiry_date: row.try_get("expiry_date")?,
        })
    }
}

/// A single class session on one date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OneOffSchedule {
    pub id: i64,
    pub school_name: String,
    pub class_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

/// Request payload for creating or replacing a recurring schedule.
///
/// Every field is optional at the wire level so a missing one can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringScheduleDraft {
    pub school_name: Option<String>,
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_days")]
    pub days_of_week: Option<Vec<String>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub expiry_date: Option<String>,
}

/// Validated recurring schedule fields, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringScheduleFields {
    pub school_name: String,
    pub class_name: String,
    pub days_of_week: Vec<String>,
    pub start_time: String,
    pub end_time: String,
    pub expiry_date: Option<String>,
}

impl RecurringScheduleDraft {
    /// Check required fields in wire order and return the first missing one
    pub fn validate(self) -> Result<RecurringScheduleFields, &'static str> {
        Ok(RecurringScheduleFields {
            school_name: self.school_name.ok_or("schoolName")?,
            class_name: self.class_name.ok_or("className")?,
            days_of_week: self.days_of_week.ok_or("daysOfWeek")?,
            start_time: self.start_time.ok_or("startTime")?,
            end_time: self.end_time.ok_or("endTime")?,
            // The frontend sends "" for "no expiry"
            expiry_date: self.expiry_date.filter(|d| !d.trim().is_empty()),
        })
    }
}

/// Request payload for creating or replacing a one-off schedule
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneOffScheduleDraft {
    pub school_name: Option<String>,
    pub class_name: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneOffScheduleFields {
    pub school_name: String,
    pub class_name: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl OneOffScheduleDraft {
    pub fn validate(self) -> Result<OneOffScheduleFields, &'static str> {
        Ok(OneOffScheduleFields {
            school_name: self.school_name.ok_or("schoolName")?,
            class_name: self.class_name.ok_or("className")?,
            date: self.date.ok_or("date")?,
            start_time: self.start_time.ok_or("startTime")?,
            end_time: self.end_time.ok_or("endTime")?,
        })
    }
}

/// Weekday identifiers are an open vocabulary; numbers are accepted and kept as text.
fn deserialize_days<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Day {
        Text(String),
        Number(i64),
    }

    let days: Option<Vec<Day>> = Option::deserialize(deserializer)?;
    Ok(days.map(|days| {
        days.into_iter()
            .map(|day| match day {
                Day::Text(text) => text,
                Day::Number(n) => n.to_string(),
            })
            .collect()
    }))
}
