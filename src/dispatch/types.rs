use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A driver as supplied by the planning store, read-only for ranking.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Driver {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    /// Courses already assigned today
    #[serde(default)]
    pub courses_today: u32,
    /// Most recently completed course, if any
    #[serde(default)]
    pub last_course: Option<LastCourse>,
    /// Always true until a real-time status feed exists
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Driver {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            courses_today: 0,
            last_course: None,
            available: true,
        }
    }

    pub fn with_courses_today(mut self, courses_today: u32) -> Self {
        self.courses_today = courses_today;
        self
    }

    pub fn with_last_course(mut self, last_course: LastCourse) -> Self {
        self.last_course = Some(last_course);
        self
    }

    /// Shorthand for a last course that ended at `drop_off`
    pub fn with_last_drop_off(self, drop_off: impl Into<String>) -> Self {
        self.with_last_course(LastCourse::ending_at(drop_off))
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Where the driver is assumed to be: the drop-off of their last course,
    /// when one is recorded and non-blank.
    pub fn last_drop_off(&self) -> Option<&str> {
        self.last_course
            .as_ref()
            .and_then(|course| course.drop_off.as_deref())
            .filter(|address| !address.trim().is_empty())
    }
}

/// The part of a driver's previous course that matters for ranking.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LastCourse {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub drop_off: Option<String>,
}

impl LastCourse {
    pub fn ending_at(drop_off: impl Into<String>) -> Self {
        Self {
            id: None,
            drop_off: Some(drop_off.into()),
        }
    }
}

/// A pending transport request awaiting a driver.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Course {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    pub pickup: String,
    #[serde(default)]
    pub drop_off: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Course {
    pub fn new(pickup: impl Into<String>) -> Self {
        Self {
            id: None,
            pickup: pickup.into(),
            drop_off: None,
            scheduled_at: None,
        }
    }

    pub fn with_drop_off(mut self, drop_off: impl Into<String>) -> Self {
        self.drop_off = Some(drop_off.into());
        self
    }

    pub fn with_scheduled_at(mut self, scheduled_at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(scheduled_at);
        self
    }
}

// Store ids are integers in some exports and strings in others
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
