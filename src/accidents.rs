//! Accident records as returned by the TfL `AccidentStats` API and the
//! reduced form kept after filtering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Casualty `mode` that marks a cyclist.
pub const CYCLIST_MODE: &str = "PedalCycle";

/// Why a raw record could not be reduced to a [`FilteredAccident`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
    #[error("record has no `{0}` field")]
    MissingField(&'static str),
    #[error("field `{field}` is a JSON {found}")]
    InvalidField {
        field: &'static str,
        found: &'static str,
    },
    #[error("`casualties` is a JSON {0}, expected an object or an array")]
    UnexpectedCasualties(&'static str),
}

/// Shape of the `casualties` field. The API sends a bare object when an
/// accident has one casualty and an array otherwise.
#[derive(Debug, Clone, Copy)]
pub enum Casualties<'a> {
    Single(&'a Map<String, Value>),
    Many(&'a [Value]),
}

impl<'a> Casualties<'a> {
    pub fn from_value(value: &'a Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(casualty) => Ok(Casualties::Single(casualty)),
            Value::Array(list) => Ok(Casualties::Many(list)),
            other => Err(RecordError::UnexpectedCasualties(json_kind(other))),
        }
    }

    /// True when at least one casualty was on a pedal cycle.
    pub fn involves_cyclist(&self) -> bool {
        match self {
            Casualties::Single(casualty) => is_cyclist(casualty),
            Casualties::Many(list) => list
                .iter()
                .filter_map(Value::as_object)
                .any(is_cyclist),
        }
    }
}

fn is_cyclist(casualty: &Map<String, Value>) -> bool {
    casualty.get("mode").and_then(Value::as_str) == Some(CYCLIST_MODE)
}

/// A borrowed view over one raw accident object.
#[derive(Debug, Clone, Copy)]
pub struct AccidentRecord<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> AccidentRecord<'a> {
    pub fn from_value(value: &'a Value) -> Result<Self, RecordError> {
        value
            .as_object()
            .map(|fields| AccidentRecord { fields })
            .ok_or(RecordError::NotAnObject(json_kind(value)))
    }

    pub fn casualties(&self) -> Result<Casualties<'a>, RecordError> {
        let value = self
            .fields
            .get("casualties")
            .ok_or(RecordError::MissingField("casualties"))?;
        Casualties::from_value(value)
    }

    pub fn latitude(&self) -> Result<f64, RecordError> {
        self.number("lat")
    }

    pub fn longitude(&self) -> Result<f64, RecordError> {
        self.number("lon")
    }

    pub fn severity(&self) -> Result<&'a str, RecordError> {
        let value = self.field("severity")?;
        value.as_str().ok_or(RecordError::InvalidField {
            field: "severity",
            found: json_kind(value),
        })
    }

    /// Reduces the record to `(lat, lon, severity)` when a cyclist was
    /// involved, `None` otherwise.
    pub fn to_cyclist_accident(&self) -> Result<Option<FilteredAccident>, RecordError> {
        if !self.casualties()?.involves_cyclist() {
            return Ok(None);
        }

        Ok(Some(FilteredAccident::new(
            self.latitude()?,
            self.longitude()?,
            self.severity()?,
        )))
    }

    fn field(&self, name: &'static str) -> Result<&'a Value, RecordError> {
        self.fields.get(name).ok_or(RecordError::MissingField(name))
    }

    fn number(&self, name: &'static str) -> Result<f64, RecordError> {
        let value = self.field(name)?;
        value.as_f64().ok_or(RecordError::InvalidField {
            field: name,
            found: json_kind(value),
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Accident severity as labelled by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Slight,
    Serious,
    Fatal,
    Unknown,
}

impl Severity {
    /// Parses an API label. `Severe` is an older spelling of `Serious`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Slight" => Severity::Slight,
            "Serious" | "Severe" => Severity::Serious,
            "Fatal" => Severity::Fatal,
            _ => Severity::Unknown,
        }
    }

    /// Weight an accident of this severity contributes to a location.
    pub fn weight(self) -> u32 {
        match self {
            Severity::Slight => 1,
            Severity::Serious => 2,
            Severity::Fatal => 3,
            Severity::Unknown => 0,
        }
    }
}

/// One cyclist accident kept by the filter.
///
/// Stored on disk as a `[lat, lon, severity]` array; the severity label is
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64, String)", into = "(f64, f64, String)")]
pub struct FilteredAccident {
    pub latitude: f64,
    pub longitude: f64,
    pub severity: String,
}

impl FilteredAccident {
    pub fn new(latitude: f64, longitude: f64, severity: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            severity: severity.into(),
        }
    }

    pub fn severity_class(&self) -> Severity {
        Severity::from_label(&self.severity)
    }
}

impl From<(f64, f64, String)> for FilteredAccident {
    fn from((latitude, longitude, severity): (f64, f64, String)) -> Self {
        Self {
            latitude,
            longitude,
            severity,
        }
    }
}

impl From<FilteredAccident> for (f64, f64, String) {
    fn from(accident: FilteredAccident) -> Self {
        (accident.latitude, accident.longitude, accident.severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reduce(value: Value) -> Result<Option<FilteredAccident>, RecordError> {
        AccidentRecord::from_value(&value)?.to_cyclist_accident()
    }

    #[test]
    fn test_single_cyclist_casualty_qualifies() {
        let accident = reduce(json!({
            "lat": 51.5, "lon": -0.1, "severity": "Slight",
            "casualties": {"mode": "PedalCycle"}
        }))
        .unwrap();

        assert_eq!(accident, Some(FilteredAccident::new(51.5, -0.1, "Slight")));
    }

    #[test]
    fn test_casualty_list_with_cyclist_qualifies_once() {
        let accident = reduce(json!({
            "lat": 51.4, "lon": -0.3, "severity": "Serious",
            "casualties": [
                {"mode": "Car"},
                {"mode": "PedalCycle"},
                {"mode": "PedalCycle"}
            ]
        }))
        .unwrap();

        assert_eq!(accident, Some(FilteredAccident::new(51.4, -0.3, "Serious")));
    }

    #[test]
    fn test_no_cyclist_is_skipped() {
        let single = reduce(json!({
            "lat": 51.6, "lon": -0.2, "severity": "Fatal",
            "casualties": {"mode": "Pedestrian"}
        }))
        .unwrap();
        let list = reduce(json!({
            "lat": 51.6, "lon": -0.2, "severity": "Fatal",
            "casualties": [{"mode": "Car"}]
        }))
        .unwrap();
        let empty = reduce(json!({
            "lat": 51.6, "lon": -0.2, "severity": "Fatal",
            "casualties": []
        }))
        .unwrap();

        assert_eq!(single, None);
        assert_eq!(list, None);
        assert_eq!(empty, None);
    }

    #[test]
    fn test_casualty_object_without_mode_is_not_cyclist() {
        let accident = reduce(json!({
            "lat": 51.6, "lon": -0.2, "severity": "Slight",
            "casualties": {"age": 30}
        }))
        .unwrap();
        assert_eq!(accident, None);
    }

    #[test]
    fn test_non_object_casualty_entries_are_ignored() {
        let cyclist = reduce(json!({
            "lat": 51.6, "lon": -0.2, "severity": "Slight",
            "casualties": [1, "PedalCycle", null, {"mode": "PedalCycle"}]
        }))
        .unwrap();
        let none = reduce(json!({
            "lat": 51.6, "lon": -0.2, "severity": "Slight",
            "casualties": [1, "PedalCycle", [{"mode": "PedalCycle"}]]
        }))
        .unwrap();

        assert_eq!(cyclist, Some(FilteredAccident::new(51.6, -0.2, "Slight")));
        assert_eq!(none, None);
    }

    #[test]
    fn test_unexpected_casualties_shape() {
        let err = reduce(json!({
            "lat": 51.6, "lon": -0.2, "severity": "Slight",
            "casualties": "PedalCycle"
        }))
        .unwrap_err();
        assert_eq!(err, RecordError::UnexpectedCasualties("string"));
    }

    #[test]
    fn test_missing_casualties() {
        let err = reduce(json!({"lat": 51.6, "lon": -0.2, "severity": "Slight"})).unwrap_err();
        assert_eq!(err, RecordError::MissingField("casualties"));
    }

    #[test]
    fn test_cyclist_record_with_bad_coordinates() {
        let err = reduce(json!({
            "lat": "51.6", "lon": -0.2, "severity": "Slight",
            "casualties": {"mode": "PedalCycle"}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidField {
                field: "lat",
                found: "string"
            }
        );
    }

    #[test]
    fn test_non_cyclist_record_ignores_missing_location() {
        // Location is only read once the record qualifies.
        let accident = reduce(json!({"casualties": {"mode": "Car"}})).unwrap();
        assert_eq!(accident, None);
    }

    #[test]
    fn test_record_must_be_object() {
        let err = reduce(json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, RecordError::NotAnObject("array"));
    }

    #[test]
    fn test_filtered_accident_serializes_as_triple() {
        let accident = FilteredAccident::new(51.5, -0.1, "Slight");
        let encoded = serde_json::to_string(&accident).unwrap();
        assert_eq!(encoded, r#"[51.5,-0.1,"Slight"]"#);

        let decoded: FilteredAccident = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, accident);
    }

    #[test]
    fn test_severity_weights() {
        assert_eq!(Severity::from_label("Slight").weight(), 1);
        assert_eq!(Severity::from_label("Serious").weight(), 2);
        assert_eq!(Severity::from_label("Severe").weight(), 2);
        assert_eq!(Severity::from_label("Fatal").weight(), 3);
        assert_eq!(Severity::from_label("Unreported"), Severity::Unknown);
        assert_eq!(Severity::Unknown.weight(), 0);
    }
}
