use archfx_api::Api;
use archfx_reports::{
    DataPoint, FlexibleDictionaryReport, Report, ReportOptions, SentTimestamp, INVALID_READING_ID,
};
use archfx_slug::{DeviceIdentifier, VariableIdentifier};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn pack(value: &Value) -> Vec<u8> {
    rmp_serde::to_vec_named(value).unwrap()
}

fn midnight() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 20, 0, 0, 0).unwrap()
}

#[test]
fn decodes_encoded_report() {
    let raw = pack(&json!({
        "format": "v200",
        "device": 10,
        "streamer_index": 100,
        "streamer_selector": 65536,
        "sent_timestamp": 1,
        "seqid": 1,
        "lowest_id": 2,
        "highest_id": 3,
        "events": [
            {
                "stream": "5020",
                "timestamp": "2020-01-20T00:00:00.100000Z",
                "dev_seqid": 2,
                "value": 0,
                "extra_data": {
                    "axis": "z",
                    "peak": 45.41939932879673,
                    "duration": 15,
                    "delta_v_x": 0.0,
                    "delta_v_y": 0.0,
                    "delta_v_z": 0.0
                }
            },
            {
                "stream": "5020",
                "timestamp": "2020-01-20T01:12:00Z",
                "dev_seqid": 3,
                "value": 0,
                "extra_data": {
                    "axis": "z",
                    "peak": 58.13753330123034,
                    "duration": 15,
                    "delta_v_x": 0.0,
                    "delta_v_y": 0.0,
                    "delta_v_z": 0.0
                }
            }
        ]
    }));

    let report = FlexibleDictionaryReport::decode(raw).unwrap();
    assert_eq!(report.visible_data().len(), 2);
    assert_eq!(report.origin(), DeviceIdentifier::new(10));
    assert_eq!(report.report_id(), 1);
    assert_eq!(report.sent_timestamp(), Some(&SentTimestamp::Uptime(1)));
    assert_eq!(report.origin_streamer(), Some(100));
    assert_eq!(report.streamer_selector(), Some(65536));
    assert_eq!(report.lowest_id(), Some(2));
    assert_eq!(report.highest_id(), Some(3));

    let ev1 = &report.visible_data()[0];
    let ev2 = &report.visible_data()[1];
    assert_eq!(ev1.stream(), VariableIdentifier::new(0x5020));
    assert_eq!(ev1.reading_id(), 2);
    assert_eq!(
        ev1.timestamp(),
        Utc.with_ymd_and_hms(2020, 1, 20, 0, 0, 0).unwrap() + chrono::Duration::milliseconds(100)
    );
    assert_eq!(ev2.timestamp(), Utc.with_ymd_and_hms(2020, 1, 20, 1, 12, 0).unwrap());

    assert_eq!(
        Value::Object(ev1.summary_data().clone()),
        json!({
            "axis": "z",
            "peak": 45.41939932879673,
            "duration": 15,
            "delta_v_x": 0.0,
            "delta_v_y": 0.0,
            "delta_v_z": 0.0
        })
    );
    assert_eq!(ev2.summary_data()["peak"], 58.13753330123034);
}

#[test]
fn decodes_legacy_layout() {
    let raw = pack(&json!({
        "device": "d--0000-0000-0000-0abc",
        "device_sent_timestamp": "2021-01-20T00:00:00+00:00",
        "events": [
            { "stream": 0x5051, "timestamp": "2021-01-20T00:00:00", "value": 1.5, "data": { "raw": [1, 2] } }
        ]
    }));

    let report = FlexibleDictionaryReport::decode(raw).unwrap();
    assert_eq!(report.origin().value(), 0xabc);
    assert_eq!(
        report.sent_timestamp(),
        Some(&SentTimestamp::Iso("2021-01-20T00:00:00+00:00".into()))
    );
    assert_eq!(report.report_id(), INVALID_READING_ID);
    assert!(report.origin_streamer().is_none());

    let point = &report.visible_data()[0];
    assert_eq!(point.reading_id(), INVALID_READING_ID);
    assert_eq!(point.timestamp(), midnight());
    assert_eq!(point.raw_data().unwrap()["raw"], json!([1, 2]));
}

#[test]
fn decode_ignores_format_key() {
    let events = json!([{ "stream": 1, "timestamp": "2021-01-20T00:00:00Z", "value": 2.0 }]);
    let tagged = pack(&json!({ "format": "v100", "device": 7, "events": events.clone() }));
    let untagged = pack(&json!({ "device": 7, "events": events }));

    for raw in [tagged, untagged] {
        let report = FlexibleDictionaryReport::decode(raw).unwrap();
        assert_eq!(report.origin().value(), 7);
        assert_eq!(report.visible_data()[0].value(), 2.0);
    }
}

#[test]
fn decode_requires_device() {
    let raw = pack(&json!({ "format": "v200", "events": [] }));
    let err = FlexibleDictionaryReport::decode(raw).unwrap_err();
    assert!(err.is_data_error());
}

#[test]
fn decode_rejects_value_in_summary() {
    let raw = pack(&json!({
        "device": 1,
        "events": [
            { "stream": 1, "timestamp": "2021-01-20T00:00:00Z", "value": 1, "extra_data": { "value": 2 } }
        ]
    }));
    assert!(FlexibleDictionaryReport::decode(raw)
        .unwrap_err()
        .is_data_error());
}

#[test]
fn decode_rejects_garbage() {
    assert!(FlexibleDictionaryReport::decode(vec![0xc1, 0x00]).is_err());
}

#[test]
fn write_saves_raw_msgpack() {
    let report = FlexibleDictionaryReport::from_readings(
        DeviceIdentifier::new(0x1234),
        &[DataPoint::new(midnight(), VariableIdentifier::new(0x5051), 1.0).with_reading_id(9)],
        ReportOptions::default(),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("report.mp");
    report.write(&file).unwrap();

    let saved = std::fs::read(&file).unwrap();
    assert_eq!(saved, report.encode());

    let reread = FlexibleDictionaryReport::read(&file).unwrap();
    assert_eq!(reread.origin(), report.origin());
    assert_eq!(reread.visible_data(), report.visible_data());
}

#[tokio::test]
async fn upload_posts_report_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/streamer/report/"))
        .and(query_param("timestamp", "2021-01-20T00:00:00+00:00"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "count": 1 })))
        .mount(&server)
        .await;

    let point = DataPoint::new(midnight(), VariableIdentifier::parse("0001-5030").unwrap(), 2.0)
        .with_summary(
            json!({ "foo": 5, "bar": "foobar" })
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap()
        .with_reading_id(1000);

    let report = FlexibleDictionaryReport::from_readings(
        DeviceIdentifier::parse("d--1234").unwrap(),
        &[point],
        ReportOptions {
            report_id: 1003,
            streamer: 0xff,
            sent_timestamp: Some(midnight()),
            ..ReportOptions::default()
        },
    )
    .unwrap();

    let api = Api::with_domain(server.uri()).unwrap();
    assert_eq!(report.upload(&api).await.unwrap(), 1);

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    assert!(request.url.query().unwrap().contains("timestamp=2021-01-20T00%3A00%3A00%2B00%3A00"));

    let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("Content-Disposition: form-data; name=\"file\"; filename="));
    assert!(body.contains("filename=\"report.mp\""));
}

#[tokio::test]
async fn upload_without_count_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/streamer/report/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let report = FlexibleDictionaryReport::from_readings(
        DeviceIdentifier::new(1),
        &[],
        ReportOptions::default(),
    )
    .unwrap();

    let api = Api::with_domain(server.uri()).unwrap();
    assert!(report.upload(&api).await.unwrap_err().is_data_error());
}
