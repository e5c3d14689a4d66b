//! Readings and events carried by reports.

use std::fmt;

use archfx_slug::VariableIdentifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::timestamp::{format_timestamp, parse_timestamp};
use crate::ReportError;

/// Reading id meaning "no id"; readings carrying it are not deduplicated.
pub const INVALID_READING_ID: u64 = 0;

/// Device uptime meaning "unknown".
pub const INVALID_RAW_TIME: u32 = 0xFFFF_FFFF;

/// Key/value section of a data point.
pub type DataMap = Map<String, Value>;

/// One reading or event.
///
/// A data point always has one primary `value`. `summary_data` holds a small
/// summary and `raw_data` an optional, possibly large, full payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    timestamp: DateTime<Utc>,
    stream: VariableIdentifier,
    value: f64,
    summary_data: DataMap,
    raw_data: Option<DataMap>,
    reading_id: u64,
}

impl DataPoint {
    /// Creates a data point without summary, raw data or reading id.
    pub fn new(timestamp: DateTime<Utc>, stream: VariableIdentifier, value: f64) -> Self {
        Self {
            timestamp,
            stream,
            value,
            summary_data: DataMap::new(),
            raw_data: None,
            reading_id: INVALID_READING_ID,
        }
    }

    /// Sets the summary section.
    ///
    /// `value` is reserved for the primary reading and is rejected as a key.
    pub fn with_summary(mut self, summary_data: DataMap) -> Result<Self, ReportError> {
        if summary_data.contains_key("value") {
            return Err(ReportError::data("value is not a valid field for summary_data"));
        }
        self.summary_data = summary_data;
        Ok(self)
    }

    #[must_use]
    pub fn with_raw_data(mut self, raw_data: DataMap) -> Self {
        self.raw_data = Some(raw_data);
        self
    }

    #[must_use]
    pub fn with_reading_id(mut self, reading_id: u64) -> Self {
        self.reading_id = reading_id;
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn stream(&self) -> VariableIdentifier {
        self.stream
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn summary_data(&self) -> &DataMap {
        &self.summary_data
    }

    pub fn raw_data(&self) -> Option<&DataMap> {
        self.raw_data.as_ref()
    }

    pub fn reading_id(&self) -> u64 {
        self.reading_id
    }

    /// Returns true unless the reading id is [`INVALID_READING_ID`].
    pub fn has_reading_id(&self) -> bool {
        self.reading_id != INVALID_READING_ID
    }

    pub(crate) fn to_wire(&self) -> WireEvent<'_> {
        WireEvent {
            stream: self.stream.value(),
            dev_seqid: self.reading_id,
            timestamp: format_timestamp(&self.timestamp),
            value: self.value,
            extra_data: &self.summary_data,
            data: self.raw_data.as_ref(),
        }
    }

    pub(crate) fn from_wire(event: WireEventIn) -> Result<Self, ReportError> {
        let point = Self::new(parse_timestamp(&event.timestamp)?, event.stream, event.value)
            .with_reading_id(event.dev_seqid.unwrap_or(INVALID_READING_ID))
            .with_summary(event.extra_data.unwrap_or_default())?;

        Ok(match event.data {
            Some(raw) => point.with_raw_data(raw),
            None => point,
        })
    }
}

impl fmt::Display for DataPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stream {}: Data at {}, value {}",
            self.stream.value(),
            self.timestamp,
            self.value
        )
    }
}

/// Encoded event map.
#[derive(Debug, Serialize)]
pub(crate) struct WireEvent<'a> {
    stream: u32,
    dev_seqid: u64,
    timestamp: String,
    value: f64,
    extra_data: &'a DataMap,
    data: Option<&'a DataMap>,
}

/// Decoded event map. `stream` may be an integer or a variable slug.
#[derive(Debug, Deserialize)]
pub(crate) struct WireEventIn {
    stream: VariableIdentifier,
    #[serde(default)]
    dev_seqid: Option<u64>,
    timestamp: String,
    value: f64,
    #[serde(default)]
    extra_data: Option<DataMap>,
    #[serde(default)]
    data: Option<DataMap>,
}
