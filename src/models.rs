use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Raw `startTime` value as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StartTime {
    Text(String),
    Other(Value),
}

impl StartTime {
    /// Empty strings, `false`, `0` and empty collections count as unset.
    pub fn is_set(&self) -> bool {
        match self {
            StartTime::Text(text) => !text.is_empty(),
            StartTime::Other(value) => match value {
                Value::Null => false,
                Value::Bool(flag) => *flag,
                Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
                Value::String(text) => !text.is_empty(),
                Value::Array(items) => !items.is_empty(),
                Value::Object(map) => !map.is_empty(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClassOption {
    pub name: Option<String>,
}

/// A lesson's `classOption`: either populated or left as an opaque reference.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum ClassOptionRef {
    Expanded(ClassOption),
    Reference(Value),
}

impl From<Value> for ClassOptionRef {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => serde_json::from_value(Value::Object(map.clone()))
                .map(ClassOptionRef::Expanded)
                .unwrap_or(ClassOptionRef::Reference(Value::Object(map))),
            other => ClassOptionRef::Reference(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[schema(value_type = Option<String>, format = "date-time", example = "2024-01-15T12:00:00Z")]
    pub start_time: Option<StartTime>,
    #[schema(value_type = Option<Object>)]
    pub class_option: Option<ClassOptionRef>,
}

/// A booking's `lesson`: populated lessons carry the schedule, ids do not.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum LessonRef {
    Expanded(Lesson),
    Reference(Value),
}

impl From<Value> for LessonRef {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => serde_json::from_value(Value::Object(map.clone()))
                .map(LessonRef::Expanded)
                .unwrap_or(LessonRef::Reference(Value::Object(map))),
            other => LessonRef::Reference(other),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct Booking {
    #[schema(value_type = Option<Object>)]
    pub lesson: Option<LessonRef>,
}

impl Booking {
    pub fn expanded_lesson(&self) -> Option<&Lesson> {
        match self.lesson.as_ref()? {
            LessonRef::Expanded(lesson) => Some(lesson),
            LessonRef::Reference(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}
