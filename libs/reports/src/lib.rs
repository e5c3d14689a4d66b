//! # archfx-reports
//!
//! Readings and the reports that carry them to ArchFX Cloud.
//!
//! A [`FlexibleDictionaryReport`] is a msgpack map:
//!
//! ```text
//! format             "v200"
//! device             device id as an integer
//! streamer_index     streamer that sent the report
//! streamer_selector  selector used to pick readings
//! seqid              report id
//! lowest_id          lowest valid reading id
//! highest_id         highest valid reading id
//! sent_timestamp     ISO 8601 time or nil
//! events             [{stream, dev_seqid, timestamp, value, extra_data, data}]
//! ```

mod datapoint;
mod error;
mod flexible_dictionary;
mod report;
mod timestamp;

pub use datapoint::{DataMap, DataPoint, INVALID_RAW_TIME, INVALID_READING_ID};
pub use error::ReportError;
pub use flexible_dictionary::{
    FlexibleDictionaryReport, ReportOptions, SentTimestamp, FORMAT_TAG, UPLOAD_FILENAME,
    UPLOAD_RESOURCE,
};
pub use report::Report;
pub use timestamp::{format_timestamp, parse_timestamp};
