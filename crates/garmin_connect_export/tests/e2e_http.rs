use garmin_connect_client::http_client::ReqwestGarminClient;
use garmin_connect_client::{ActivitySource, Credentials};
use garmin_connect_export::ledger::LEDGER_FILE_NAME;
use garmin_connect_export::{ActivityCount, ExportConfig, ExportError, ExportFormat, ExportPipeline};
use secrecy::SecretString;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_entry(id: i64, begin: &str) -> serde_json::Value {
    serde_json::json!({
        "activity": {
            "activityId": id.to_string(),
            "activityName": "Lunch, run",
            "activityDescription": "",
            "activityType": {"parent": {"key": "running"}},
            "activitySummary": {
                "SumDistance": {"value": "6.2", "uom": "kilometer"},
                "SumDuration": {"value": "1800", "uom": "second"},
                "BeginTimestamp": {"value": begin, "display": "Mon, 2016 Mar 07 12:01"},
                "BeginLatitude": {"value": "52.0", "uom": "dd"},
                "BeginLongitude": {"value": "5.0", "uom": "dd"}
            }
        }
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/sso/signin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"response_url = "/modern/?ticket=ST-1";"#),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn exports_newest_activity_over_http() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/proxy/activity-search-service-1.2/json/activities"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": {
                "activities": [search_entry(101, "2016-03-07T11:01:00.000000Z")],
                "search": {"totalFound": "2"}
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy/activity-service-1.1/gpx/activity/101"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<gpx><trk><trkseg><trkpt lat=\"52\" lon=\"5\"/></trkseg></trk></gpx>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestGarminClient::new(&server.uri(), &format!("{}/sso", server.uri()));
    client
        .authenticate(&Credentials::new("me", SecretString::new("pw".into())))
        .await
        .expect("login");

    let dir = tempfile::tempdir().unwrap();
    let cfg = ExportConfig {
        count: ActivityCount::Recent(1),
        ..ExportConfig::new(dir.path(), ExportFormat::Gpx)
    };
    let summary = ExportPipeline::new(&client, &cfg).run().await.expect("run");

    assert_eq!(summary.processed, 1);
    assert!(dir.path().join("activity_101.gpx").exists());
    let ledger = std::fs::read_to_string(dir.path().join(LEDGER_FILE_NAME)).unwrap();
    let rows: Vec<&str> = ledger.lines().skip(1).collect();
    assert_eq!(
        rows,
        vec![
            "101,\"Lunch, run\",,2016-03-07 11:01:00,2016-03-07 11:31:00,running,6.2,1800,,,52,5"
        ]
    );
}

#[tokio::test]
async fn server_error_on_download_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/proxy/activity-search-service-1.2/json/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": {
                "activities": [search_entry(7, "2016-03-07T11:01:00.000000Z")],
                "search": {"totalFound": 1}
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy/activity-service-1.1/tcx/activity/7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ReqwestGarminClient::new(&server.uri(), &server.uri());
    let dir = tempfile::tempdir().unwrap();
    let cfg = ExportConfig {
        count: ActivityCount::All,
        ..ExportConfig::new(dir.path(), ExportFormat::Tcx)
    };
    let err = ExportPipeline::new(&client, &cfg).run().await.unwrap_err();

    match err {
        ExportError::Source(e) => assert!(e.is_network()),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join("activity_7.tcx").exists());
}
