//! Typed, read-only view over one activity object returned by the search
//! endpoint.
//!
//! The service nests aggregate measurements under `activitySummary`, each as a
//! `{"value": …, "uom": …}` pair (plus `display` for timestamps). Accessors
//! either return the value, return `None` for optional measurements the
//! service did not report, or fail with [`GarminError::MalformedRecord`] /
//! [`GarminError::UnitMismatch`].

use crate::GarminError;
use crate::utils::{
    extract_clock_time, parse_begin_timestamp, value_as_f64, value_as_i64, whitespace_to_spaces,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

pub const SUMMARY_KEY: &str = "activitySummary";

const KILOMETER: &str = "kilometer";
const SECOND: &str = "second";

#[derive(Clone, Debug, PartialEq)]
pub struct ActivityRecord {
    raw: Value,
}

impl ActivityRecord {
    /// Wrap a raw activity object. Fails if it has no summary section.
    pub fn new(raw: Value) -> Result<Self, GarminError> {
        if !raw.is_object() {
            return Err(GarminError::MalformedRecord(
                "activity is not a JSON object".into(),
            ));
        }
        if !raw.get(SUMMARY_KEY).is_some_and(Value::is_object) {
            return Err(GarminError::MalformedRecord(format!(
                "activity has no {SUMMARY_KEY} section"
            )));
        }
        Ok(Self { raw })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    fn summary(&self) -> &Value {
        &self.raw[SUMMARY_KEY]
    }

    pub fn id(&self) -> Result<i64, GarminError> {
        let v = self
            .raw
            .get("activityId")
            .ok_or_else(|| GarminError::MalformedRecord("missing activityId".into()))?;
        value_as_i64(v)
            .ok_or_else(|| GarminError::MalformedRecord(format!("non-numeric activityId: {v}")))
    }

    /// User-assigned title; empty when the service sends none.
    pub fn name(&self) -> &str {
        self.raw
            .get("activityName")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// General type of the activity (running, cycling, …), ignoring the subtype.
    pub fn category(&self) -> Result<&str, GarminError> {
        self.raw
            .pointer("/activityType/parent/key")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GarminError::MalformedRecord("missing activityType.parent.key".into())
            })
    }

    pub fn is_run(&self) -> Result<bool, GarminError> {
        Ok(self.category()? == "running")
    }

    pub fn distance_km(&self) -> Result<f64, GarminError> {
        self.measurement("SumDistance", "distance", KILOMETER)
    }

    pub fn duration_sec(&self) -> Result<f64, GarminError> {
        self.measurement("SumDuration", "duration", SECOND)
    }

    /// Free-text description with every whitespace character turned into a space.
    pub fn comment(&self) -> String {
        let text = self
            .raw
            .get("activityDescription")
            .and_then(Value::as_str)
            .unwrap_or_default();
        whitespace_to_spaces(text)
    }

    pub fn begin_timestamp_utc(&self) -> Result<DateTime<Utc>, GarminError> {
        let s = self
            .summary()
            .pointer("/BeginTimestamp/value")
            .and_then(Value::as_str)
            .ok_or_else(|| GarminError::MalformedRecord("missing BeginTimestamp.value".into()))?;
        parse_begin_timestamp(s)
            .ok_or_else(|| GarminError::MalformedRecord(format!("bad BeginTimestamp: {s}")))
    }

    /// Begin timestamp plus the activity duration.
    pub fn end_timestamp_utc(&self) -> Result<DateTime<Utc>, GarminError> {
        let begin = self.begin_timestamp_utc()?;
        let duration = self.duration_sec()?;
        TimeDelta::try_milliseconds((duration * 1000.0).round() as i64)
            .and_then(|offset| begin.checked_add_signed(offset))
            .ok_or_else(|| {
                GarminError::MalformedRecord(format!("SumDuration out of range: {duration}"))
            })
    }

    /// `HH:MM` in the athlete's local time zone, taken from the display string.
    pub fn start_time_local(&self) -> Result<String, GarminError> {
        let display = self
            .summary()
            .pointer("/BeginTimestamp/display")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                GarminError::MalformedRecord("missing BeginTimestamp.display".into())
            })?;
        extract_clock_time(display)
            .map(str::to_string)
            .ok_or_else(|| GarminError::MalformedRecord(format!("no HH:MM in '{display}'")))
    }

    pub fn max_heart_rate_bpm(&self) -> Result<Option<f64>, GarminError> {
        self.optional_value("MaxHeartRate")
    }

    pub fn avg_heart_rate_bpm(&self) -> Result<Option<f64>, GarminError> {
        self.optional_value("WeightedMeanHeartRate")
    }

    pub fn begin_latitude(&self) -> Result<Option<f64>, GarminError> {
        self.optional_value("BeginLatitude")
    }

    pub fn begin_longitude(&self) -> Result<Option<f64>, GarminError> {
        self.optional_value("BeginLongitude")
    }

    fn measurement(
        &self,
        key: &str,
        field: &'static str,
        expected: &'static str,
    ) -> Result<f64, GarminError> {
        let entry = self
            .summary()
            .get(key)
            .ok_or_else(|| GarminError::MalformedRecord(format!("missing {key}")))?;
        let unit = entry
            .get("uom")
            .and_then(Value::as_str)
            .ok_or_else(|| GarminError::MalformedRecord(format!("missing {key}.uom")))?;
        if unit != expected {
            return Err(GarminError::UnitMismatch {
                field,
                expected,
                found: unit.to_string(),
            });
        }
        entry
            .get("value")
            .and_then(value_as_f64)
            .ok_or_else(|| GarminError::MalformedRecord(format!("non-numeric {key}.value")))
    }

    fn optional_value(&self, key: &str) -> Result<Option<f64>, GarminError> {
        let Some(v) = self.summary().get(key).and_then(|e| e.get("value")) else {
            return Ok(None);
        };
        value_as_f64(v)
            .map(Some)
            .ok_or_else(|| GarminError::MalformedRecord(format!("non-numeric {key}.value: {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "activityId": "593520123",
            "activityName": "Morning run",
            "activityDescription": "legs\nheavy\tbut ok",
            "activityType": {"key": "trail_running", "parent": {"key": "running"}},
            "activitySummary": {
                "SumDistance": {"value": "10.02", "uom": "kilometer"},
                "SumDuration": {"value": "3000.5", "uom": "second"},
                "BeginTimestamp": {
                    "value": "2015-10-22T15:19:00.000000Z",
                    "display": "Thu, 2015 Oct 22 17:19"
                },
                "MaxHeartRate": {"value": "181", "uom": "bpm"},
                "WeightedMeanHeartRate": {"value": 152.0, "uom": "bpm"},
                "BeginLatitude": {"value": "52.3702", "uom": "dd"},
                "BeginLongitude": {"value": "4.8952", "uom": "dd"}
            }
        })
    }

    fn record(v: Value) -> ActivityRecord {
        ActivityRecord::new(v).expect("record")
    }

    #[test]
    fn reads_identity_fields() {
        let r = record(sample());
        assert_eq!(r.id().unwrap(), 593_520_123);
        assert_eq!(r.name(), "Morning run");
        assert_eq!(r.category().unwrap(), "running");
        assert!(r.is_run().unwrap());
    }

    #[test]
    fn reads_measurements() {
        let r = record(sample());
        assert_eq!(r.distance_km().unwrap(), 10.02);
        assert_eq!(r.duration_sec().unwrap(), 3000.5);
        assert_eq!(r.max_heart_rate_bpm().unwrap(), Some(181.0));
        assert_eq!(r.avg_heart_rate_bpm().unwrap(), Some(152.0));
        assert_eq!(r.begin_latitude().unwrap(), Some(52.3702));
        assert_eq!(r.begin_longitude().unwrap(), Some(4.8952));
    }

    #[test]
    fn timestamps_and_local_start() {
        let r = record(sample());
        let begin = r.begin_timestamp_utc().unwrap();
        assert_eq!(begin.to_rfc3339(), "2015-10-22T15:19:00+00:00");
        let end = r.end_timestamp_utc().unwrap();
        assert_eq!((end - begin).num_milliseconds(), 3_000_500);
        assert_eq!(r.start_time_local().unwrap(), "17:19");
    }

    #[test]
    fn comment_replaces_whitespace_characters() {
        let r = record(sample());
        assert_eq!(r.comment(), "legs heavy but ok");
    }

    #[test]
    fn wrong_units_fail_loudly() {
        let mut v = sample();
        v["activitySummary"]["SumDistance"]["uom"] = json!("mile");
        v["activitySummary"]["SumDuration"]["uom"] = json!("minute");
        let r = record(v);
        assert!(matches!(
            r.distance_km(),
            Err(GarminError::UnitMismatch { found, .. }) if found == "mile"
        ));
        assert!(matches!(
            r.duration_sec(),
            Err(GarminError::UnitMismatch { expected: "second", .. })
        ));
    }

    #[test]
    fn out_of_range_duration_is_malformed() {
        let mut v = sample();
        v["activitySummary"]["SumDuration"]["value"] = json!("1e13");
        let r = record(v);
        assert!(r.duration_sec().is_ok());
        assert!(matches!(
            r.end_timestamp_utc(),
            Err(GarminError::MalformedRecord(_))
        ));
    }

    #[test]
    fn non_finite_duration_is_malformed() {
        for bad in ["NaN", "inf", "-infinity"] {
            let mut v = sample();
            v["activitySummary"]["SumDuration"]["value"] = json!(bad);
            let r = record(v);
            assert!(
                matches!(r.duration_sec(), Err(GarminError::MalformedRecord(_))),
                "{bad}"
            );
            assert!(r.end_timestamp_utc().is_err(), "{bad}");
        }
    }

    #[test]
    fn missing_optionals_are_none() {
        let mut v = sample();
        let summary = v["activitySummary"].as_object_mut().unwrap();
        summary.remove("MaxHeartRate");
        summary.remove("WeightedMeanHeartRate");
        summary.remove("BeginLatitude");
        summary.remove("BeginLongitude");
        let r = record(v);
        assert_eq!(r.max_heart_rate_bpm().unwrap(), None);
        assert_eq!(r.avg_heart_rate_bpm().unwrap(), None);
        assert_eq!(r.begin_latitude().unwrap(), None);
        assert_eq!(r.begin_longitude().unwrap(), None);
    }

    #[test]
    fn present_but_non_numeric_optional_fails() {
        let mut v = sample();
        v["activitySummary"]["MaxHeartRate"]["value"] = json!({"nested": true});
        let r = record(v);
        assert!(matches!(
            r.max_heart_rate_bpm(),
            Err(GarminError::MalformedRecord(_))
        ));
    }

    #[test]
    fn malformed_shapes_are_rejected() {
        assert!(ActivityRecord::new(json!([])).is_err());
        assert!(ActivityRecord::new(json!({"activityId": 1})).is_err());

        let mut v = sample();
        v["activityId"] = json!("abc");
        assert!(matches!(
            record(v).id(),
            Err(GarminError::MalformedRecord(_))
        ));

        let mut v = sample();
        v["activityType"] = json!({"key": "running"});
        assert!(record(v).category().is_err());

        let mut v = sample();
        v["activitySummary"]["BeginTimestamp"]["value"] = json!("2015-10-22T15:19:00Z");
        assert!(record(v).begin_timestamp_utc().is_err());

        let mut v = sample();
        v["activitySummary"]["BeginTimestamp"]["display"] = json!("Thu, 2015 Oct 22");
        assert!(record(v).start_time_local().is_err());
    }

    #[test]
    fn missing_name_and_description_are_empty() {
        let mut v = sample();
        let obj = v.as_object_mut().unwrap();
        obj.remove("activityName");
        obj.insert("activityDescription".into(), Value::Null);
        let r = record(v);
        assert_eq!(r.name(), "");
        assert_eq!(r.comment(), "");
    }
}
