use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::{Value, json};

use chembl_explorer::chembl::{ChemblClient, ChemblHttpClient, parse_page};
use chembl_explorer::config::ChemblSettings;
use chembl_explorer::domain::{StandardType, TargetChemblId};
use chembl_explorer::error::ExplorerError;
use chembl_explorer::records::{ActivityRecord, TargetRecord};

fn fixture(name: &str) -> Value {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Answers one request per canned response, then returns the request paths.
fn serve(responses: Vec<(u16, String)>) -> (String, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let mut paths = Vec::new();
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                let read = reader.read_line(&mut line).unwrap();
                if read == 0 || line == "\r\n" {
                    break;
                }
            }
            paths.push(
                request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or_default()
                    .to_string(),
            );
            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
        paths
    });
    (format!("http://{addr}/chembl/api/data"), handle)
}

fn settings(base_url: String) -> ChemblSettings {
    ChemblSettings {
        base_url,
        timeout: Duration::from_secs(5),
        page_size: 2,
        max_records: None,
    }
}

fn activity_page(ids: &[u64], next: Option<&str>) -> String {
    let activities: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "activity_id": id,
                "molecule_chembl_id": format!("CHEMBL{id}"),
                "standard_type": "IC50",
                "standard_value": "12.5",
                "standard_units": "nM",
            })
        })
        .collect();
    json!({
        "activities": activities,
        "page_meta": {"next": next, "total_count": 5},
    })
    .to_string()
}

#[test]
fn target_search_fixture_parses_into_records() {
    let page = parse_page(fixture("target_search_egfr.json"), "targets").unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.next, None);
    assert_eq!(page.total_count, Some(3));

    let targets: Vec<TargetRecord> = page
        .items
        .into_iter()
        .map(TargetRecord::from_value)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(targets[0].id().as_str(), "CHEMBL203");
    assert_eq!(targets[0].organism.as_deref(), Some("Homo sapiens"));
    assert_eq!(targets[2].target_type.as_deref(), Some("SINGLE PROTEIN"));
    let keys: Vec<&str> = targets[0].fields.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys.first(), Some(&"cross_references"));
    assert_eq!(keys.last(), Some(&"tax_id"));
}

#[test]
fn activity_fixture_keeps_measurements_verbatim() {
    let page = parse_page(fixture("activity_page.json"), "activities").unwrap();
    assert_eq!(
        page.next.as_deref(),
        Some(
            "/chembl/api/data/activity.json?limit=2&offset=2&standard_type=IC50&target_chembl_id=CHEMBL203"
        )
    );

    let activities: Vec<ActivityRecord> = page
        .items
        .into_iter()
        .map(ActivityRecord::from_value)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(activities[0].standard_value.as_deref(), Some("41.0"));
    assert_eq!(activities[0].pchembl_value.as_deref(), Some("7.39"));
    assert_eq!(activities[1].standard_value.as_deref(), Some("170"));
    assert_eq!(activities[1].pchembl_value, None);
    assert_eq!(activities[1].standard_relation.as_deref(), Some(">"));
}

#[test]
fn filter_activities_follows_next_pages() {
    let (base_url, server) = serve(vec![
        (
            200,
            activity_page(
                &[1, 2],
                Some("/chembl/api/data/activity.json?limit=2&offset=2"),
            ),
        ),
        (
            200,
            activity_page(
                &[3, 4],
                Some("/chembl/api/data/activity.json?limit=2&offset=4"),
            ),
        ),
        (200, activity_page(&[5], None)),
    ]);
    let client = ChemblHttpClient::new(settings(base_url)).unwrap();
    let target: TargetChemblId = "CHEMBL203".parse().unwrap();

    let activities = client
        .filter_activities(&target, StandardType::Ic50)
        .unwrap();
    let ids: Vec<u64> = activities.iter().filter_map(|a| a.activity_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let paths = server.join().unwrap();
    assert_eq!(
        paths[0],
        "/chembl/api/data/activity.json?target_chembl_id=CHEMBL203&standard_type=IC50&limit=2"
    );
    assert_eq!(paths[1], "/chembl/api/data/activity.json?limit=2&offset=2");
    assert_eq!(paths[2], "/chembl/api/data/activity.json?limit=2&offset=4");
}

#[test]
fn max_records_stops_paging_early() {
    let (base_url, server) = serve(vec![(
        200,
        activity_page(
            &[1, 2],
            Some("/chembl/api/data/activity.json?limit=2&offset=2"),
        ),
    )]);
    let mut settings = settings(base_url);
    settings.max_records = Some(1);
    let client = ChemblHttpClient::new(settings).unwrap();
    let target: TargetChemblId = "CHEMBL203".parse().unwrap();

    let activities = client
        .filter_activities(&target, StandardType::Ic50)
        .unwrap();
    assert_eq!(activities.len(), 1);
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn server_error_is_a_provider_failure() {
    let (base_url, server) = serve(vec![(503, "service unavailable".to_string())]);
    let client = ChemblHttpClient::new(settings(base_url)).unwrap();

    let err = client.search_targets("EGFR").unwrap_err();
    assert_matches!(err, ExplorerError::ChemblStatus { status: 503, .. });
    assert!(err.is_provider_failure());
    server.join().unwrap();
}

#[test]
fn malformed_body_is_not_a_provider_failure() {
    let (base_url, server) = serve(vec![(200, "<html>maintenance</html>".to_string())]);
    let client = ChemblHttpClient::new(settings(base_url)).unwrap();

    let err = client.search_targets("EGFR").unwrap_err();
    assert_matches!(err, ExplorerError::ChemblDecode(_));
    assert!(!err.is_provider_failure());
    server.join().unwrap();
}

#[test]
fn unreachable_host_is_a_provider_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client =
        ChemblHttpClient::new(settings(format!("http://{addr}/chembl/api/data"))).unwrap();

    let err = client.search_targets("EGFR").unwrap_err();
    assert_matches!(err, ExplorerError::ChemblHttp(_));
}

#[test]
#[ignore]
fn search_real_chembl_for_egfr() {
    let client = ChemblHttpClient::new(ChemblSettings {
        max_records: Some(20),
        ..ChemblSettings::default()
    })
    .unwrap();
    let targets = client.search_targets("EGFR").unwrap();
    assert!(
        targets
            .iter()
            .any(|target| target.id().as_str() == "CHEMBL203")
    );
}
