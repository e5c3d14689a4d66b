//! The msgpack "flexible dictionary" report format (v200).

use std::fmt;

use archfx_api::Api;
use archfx_slug::DeviceIdentifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::datapoint::{WireEvent, WireEventIn, INVALID_READING_ID};
use crate::report::Report;
use crate::timestamp::format_timestamp;
use crate::{DataPoint, ReportError};

/// Value of the `format` key.
pub const FORMAT_TAG: &str = "v200";

/// Endpoint that accepts streamer reports.
pub const UPLOAD_RESOURCE: &str = "streamer/report";

/// File name given to the uploaded report.
pub const UPLOAD_FILENAME: &str = "report.mp";

/// When the device sent a report.
///
/// Newer reports carry an ISO 8601 time; older ones the device uptime in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SentTimestamp {
    Uptime(u64),
    Iso(String),
}

impl From<DateTime<Utc>> for SentTimestamp {
    fn from(time: DateTime<Utc>) -> Self {
        Self::Iso(format_timestamp(&time))
    }
}

impl fmt::Display for SentTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uptime(seconds) => write!(f, "{seconds}"),
            Self::Iso(text) => f.write_str(text),
        }
    }
}

/// Optional settings of [`FlexibleDictionaryReport::from_readings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Sequence id of the report itself.
    pub report_id: u64,
    /// Streamer selector the device used to pick the readings.
    pub selector: u64,
    /// Index of the streamer that sent the report.
    pub streamer: u64,
    /// Device time of sending, stored under `sent_timestamp` when set.
    pub sent_timestamp: Option<DateTime<Utc>>,
    /// Defaults to now.
    pub received_time: Option<DateTime<Utc>>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            report_id: INVALID_READING_ID,
            selector: 0xFFFF,
            streamer: 0x100,
            sent_timestamp: None,
            received_time: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct WireReport<'a> {
    format: &'static str,
    device: u64,
    streamer_index: u64,
    streamer_selector: u64,
    seqid: u64,
    lowest_id: u64,
    highest_id: u64,
    sent_timestamp: Option<SentTimestamp>,
    events: Vec<WireEvent<'a>>,
}

#[derive(Debug, Deserialize)]
struct WireReportIn {
    #[serde(default)]
    device: Option<DeviceIdentifier>,
    #[serde(default)]
    streamer_index: Option<u64>,
    #[serde(default)]
    streamer_selector: Option<u64>,
    #[serde(default)]
    seqid: Option<u64>,
    #[serde(default)]
    lowest_id: Option<u64>,
    #[serde(default)]
    highest_id: Option<u64>,
    #[serde(default, alias = "device_sent_timestamp")]
    sent_timestamp: Option<SentTimestamp>,
    #[serde(default)]
    events: Vec<WireEventIn>,
}

/// A list of readings encoded as a msgpack map.
#[derive(Debug, Clone)]
pub struct FlexibleDictionaryReport {
    raw: Vec<u8>,
    received_time: DateTime<Utc>,
    origin: DeviceIdentifier,
    report_id: u64,
    sent_timestamp: Option<SentTimestamp>,
    origin_streamer: Option<u64>,
    streamer_selector: Option<u64>,
    lowest_id: Option<u64>,
    highest_id: Option<u64>,
    visible_data: Vec<DataPoint>,
}

impl FlexibleDictionaryReport {
    /// Builds a report from readings.
    ///
    /// `lowest_id`/`highest_id` span the readings that carry a reading id.
    pub fn from_readings(
        device: DeviceIdentifier,
        data: &[DataPoint],
        options: ReportOptions,
    ) -> Result<Self, ReportError> {
        let ids = data
            .iter()
            .filter(|point| point.has_reading_id())
            .map(DataPoint::reading_id);
        let lowest_id = ids.clone().min().unwrap_or(INVALID_READING_ID);
        let highest_id = ids.max().unwrap_or(INVALID_READING_ID);

        let wire = WireReport {
            format: FORMAT_TAG,
            device: device.value(),
            streamer_index: options.streamer,
            streamer_selector: options.selector,
            seqid: options.report_id,
            lowest_id,
            highest_id,
            sent_timestamp: options.sent_timestamp.map(SentTimestamp::from),
            events: data.iter().map(DataPoint::to_wire).collect(),
        };

        let raw = rmp_serde::to_vec_named(&wire)?;
        tracing::debug!(
            device = %device,
            readings = data.len(),
            size = raw.len(),
            "report encoded"
        );

        Self::decode_at(raw, options.received_time.unwrap_or_else(Utc::now))
    }

    /// Decodes a report received now.
    pub fn decode(raw: impl Into<Vec<u8>>) -> Result<Self, ReportError> {
        Self::decode_at(raw, Utc::now())
    }

    /// Decodes a report received at `received_time`.
    ///
    /// Also reads the legacy layout: `device` as a slug string,
    /// `device_sent_timestamp` and integer uptimes for the sent time.
    /// The `format` key is not checked, so maps without it or with another
    /// tag decode the same way.
    pub fn decode_at(
        raw: impl Into<Vec<u8>>,
        received_time: DateTime<Utc>,
    ) -> Result<Self, ReportError> {
        let raw = raw.into();
        let wire: WireReportIn = rmp_serde::from_slice(&raw)?;

        let origin = wire.device.ok_or_else(|| {
            ReportError::data(
                "invalid encoded flexible dictionary report: no device key set with the device id",
            )
        })?;

        let visible_data = wire
            .events
            .into_iter()
            .map(DataPoint::from_wire)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw,
            received_time,
            origin,
            report_id: wire.seqid.unwrap_or(INVALID_READING_ID),
            sent_timestamp: wire.sent_timestamp,
            origin_streamer: wire.streamer_index,
            streamer_selector: wire.streamer_selector,
            lowest_id: wire.lowest_id,
            highest_id: wire.highest_id,
            visible_data,
        })
    }

    /// Reads and decodes a report file.
    pub fn read(path: &std::path::Path) -> Result<Self, ReportError> {
        Self::decode(std::fs::read(path)?)
    }

    pub fn report_id(&self) -> u64 {
        self.report_id
    }

    pub fn sent_timestamp(&self) -> Option<&SentTimestamp> {
        self.sent_timestamp.as_ref()
    }

    pub fn origin_streamer(&self) -> Option<u64> {
        self.origin_streamer
    }

    pub fn streamer_selector(&self) -> Option<u64> {
        self.streamer_selector
    }

    pub fn lowest_id(&self) -> Option<u64> {
        self.lowest_id
    }

    pub fn highest_id(&self) -> Option<u64> {
        self.highest_id
    }

    /// Returns the report as a generic map.
    pub fn to_value(&self) -> Result<Value, ReportError> {
        Ok(rmp_serde::from_slice(&self.raw)?)
    }

    /// Uploads the report and returns how many readings the cloud accepted as new.
    pub async fn upload(&self, api: &Api) -> Result<u64, ReportError> {
        let mut resource = api.resource(UPLOAD_RESOURCE);
        if let Some(sent) = &self.sent_timestamp {
            resource = resource.query("timestamp", sent);
        }

        let response = resource.upload_bytes(UPLOAD_FILENAME, self.encode()).await?;
        let count = response
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| ReportError::data(format!("upload response has no count: {response}")))?;

        tracing::info!(device = %self.origin, count, "report uploaded");
        Ok(count)
    }
}

impl Report for FlexibleDictionaryReport {
    fn raw_report(&self) -> &[u8] {
        &self.raw
    }

    fn received_time(&self) -> DateTime<Utc> {
        self.received_time
    }

    fn origin(&self) -> DeviceIdentifier {
        self.origin
    }

    fn visible_data(&self) -> &[DataPoint] {
        &self.visible_data
    }
}

impl fmt::Display for FlexibleDictionaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archfx_slug::VariableIdentifier;
    use chrono::TimeZone;
    use serde_json::json;

    fn time(micros: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 20, 0, 0, 0).unwrap() + chrono::Duration::microseconds(micros)
    }

    fn map(value: Value) -> crate::DataMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn sample_readings() -> Vec<DataPoint> {
        vec![
            DataPoint::new(time(100_000), VariableIdentifier::parse("0001-5030").unwrap(), 2.0)
                .with_summary(map(json!({ "foo": 5, "bar": "foobar" })))
                .unwrap()
                .with_reading_id(1000),
            DataPoint::new(time(200_000), VariableIdentifier::new(0x15030), 3.0)
                .with_summary(map(json!({ "foo": 6, "bar": "foobar" })))
                .unwrap()
                .with_reading_id(1001),
            DataPoint::new(time(200_000), VariableIdentifier::parse("5051").unwrap(), 1.0)
                .with_reading_id(1002),
        ]
    }

    #[test]
    fn test_report_usage() {
        let report = FlexibleDictionaryReport::from_readings(
            DeviceIdentifier::parse("d--1234").unwrap(),
            &sample_readings(),
            ReportOptions {
                report_id: 1003,
                streamer: 0xff,
                sent_timestamp: Some(time(300_000)),
                ..ReportOptions::default()
            },
        )
        .unwrap();

        let decoded = report.to_value().unwrap();
        assert_eq!(decoded["format"], "v200");
        assert_eq!(decoded["device"], 0x1234);
        assert_eq!(decoded["streamer_index"], 0xff);
        assert_eq!(decoded["streamer_selector"], 0xffff);
        assert_eq!(decoded["seqid"], 1003);
        assert_eq!(decoded["lowest_id"], 1000);
        assert_eq!(decoded["highest_id"], 1002);
        assert_eq!(decoded["sent_timestamp"], "2021-01-20T00:00:00.300000+00:00");

        let events = decoded["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["timestamp"], "2021-01-20T00:00:00.100000+00:00");
        assert_eq!(events[1]["timestamp"], "2021-01-20T00:00:00.200000+00:00");
        assert_eq!(events[2]["timestamp"], "2021-01-20T00:00:00.200000+00:00");
        assert_eq!(events[0]["stream"], 0x15030);
        assert_eq!(events[1]["stream"], 0x15030);
        assert_eq!(events[2]["stream"], 0x5051);
        assert_eq!(events[0]["dev_seqid"], 1000);
        assert_eq!(events[1]["dev_seqid"], 1001);
        assert_eq!(events[2]["dev_seqid"], 1002);
        assert_eq!(events[0]["value"], 2.0);
        assert_eq!(events[1]["value"], 3.0);
        assert_eq!(events[2]["value"], 1.0);
        assert!(events.iter().all(|event| event["data"].is_null()));
        assert_eq!(events[0]["extra_data"], json!({ "foo": 5, "bar": "foobar" }));
        assert_eq!(events[1]["extra_data"], json!({ "foo": 6, "bar": "foobar" }));
        assert_eq!(events[2]["extra_data"], json!({}));

        assert_eq!(report.origin().value(), 0x1234);
        assert_eq!(report.visible_data().len(), 3);
        assert_eq!(report.visible_data()[0].stream().value(), 0x15030);
        assert_eq!(report.visible_data()[0].timestamp(), time(100_000));
    }

    #[test]
    fn test_ids_skip_invalid_readings() {
        let readings = vec![
            DataPoint::new(time(0), VariableIdentifier::new(1), 1.0),
            DataPoint::new(time(0), VariableIdentifier::new(1), 1.0).with_reading_id(7),
            DataPoint::new(time(0), VariableIdentifier::new(1), 1.0).with_reading_id(5),
        ];
        let report = FlexibleDictionaryReport::from_readings(
            DeviceIdentifier::new(1),
            &readings,
            ReportOptions::default(),
        )
        .unwrap();
        assert_eq!(report.lowest_id(), Some(5));
        assert_eq!(report.highest_id(), Some(7));
        assert_eq!(report.report_id(), INVALID_READING_ID);
        assert_eq!(report.origin_streamer(), Some(0x100));
        assert_eq!(report.streamer_selector(), Some(0xFFFF));
        assert!(report.sent_timestamp().is_none());

        let empty = FlexibleDictionaryReport::from_readings(
            DeviceIdentifier::new(1),
            &[],
            ReportOptions::default(),
        )
        .unwrap();
        assert_eq!(empty.lowest_id(), Some(INVALID_READING_ID));
        assert_eq!(empty.highest_id(), Some(INVALID_READING_ID));
    }

    #[test]
    fn test_received_time_is_kept() {
        let received = time(0);
        let report = FlexibleDictionaryReport::from_readings(
            DeviceIdentifier::new(1),
            &[],
            ReportOptions {
                received_time: Some(received),
                ..ReportOptions::default()
            },
        )
        .unwrap();
        assert_eq!(report.received_time(), received);
        assert!(report.summary().starts_with("ArchFX Report (length: "));
        assert!(report.summary().ends_with("visible data: 0, not verified and not encrypted)"));
    }
}
