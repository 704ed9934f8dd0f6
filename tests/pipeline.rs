use std::io::Write;

use mockito::{Matcher, Server};
use serde_json::json;

use ecomed_client::dispatch::{Category, Highlight};
use ecomed_client::lifecycle::RequestState;
use ecomed_client::projection::SchemaMode;
use ecomed_client::upload::{FileHandle, PreviewStore};
use ecomed_client::{
    AnalysisClient, AnalysisError, AnalysisView, BomAnalysis, UploadController,
    WasteClassification,
};

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}.json", name)).unwrap()
}

fn bom() -> FileHandle {
    FileHandle::new("bom.csv", b"product_name,quantity\nNitrile gloves (box),10\n".to_vec())
}

fn image(name: &str) -> FileHandle {
    FileHandle::new(name, vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a])
}

fn controller<A: ecomed_client::controller::Analysis>(
    server: &Server,
) -> (UploadController<A>, PreviewStore) {
    let previews = PreviewStore::new();
    let ctl = UploadController::new(AnalysisClient::new(server.url()), previews.clone());
    (ctl, previews)
}

async fn json_mock(server: &mut Server, path: &str, field: &str, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("POST", path)
        .match_body(Matcher::Regex(format!(r#"name="{}""#, field)))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn fixed_schema_bom_is_projected() {
    let mut server = Server::new_async().await;
    let mock = json_mock(&mut server, "/supply/process", "bom_file", 200, &fixture("glove_fixed")).await;
    let (mut ctl, _) = controller::<BomAnalysis>(&server);

    ctl.submit(bom()).await.unwrap();
    mock.assert_async().await;

    let report = match ctl.view() {
        AnalysisView::Ready(r) => r,
        other => panic!("expected a report, got {:?}", other),
    };
    let envelope = ctl.state().payload().unwrap();
    assert_eq!(SchemaMode::detect(envelope.items()), SchemaMode::Fixed);

    assert_eq!(report.table.rows.len(), 1);
    let row = &report.table.rows[0];
    assert_eq!(row.id, 1);
    assert_eq!(row.fields["globalFootprintPerUnit"], json!(1.234));
    assert_eq!(row.fields["totalGlobalFootprint"], json!(12.345));
    assert_eq!(row.fields["totalPrice"], json!(5.001));
    assert_eq!(row.fields["product_name"], json!("Nitrile gloves (box)"));
    assert_eq!(report.summary["totalCarbonFootprint"], json!(12.345));
}

#[tokio::test]
async fn generic_bom_keeps_first_item_keys() {
    let mut server = Server::new_async().await;
    let _mock = json_mock(&mut server, "/supply/process", "bom_file", 200, &fixture("inventory_generic")).await;
    let (mut ctl, _) = controller::<BomAnalysis>(&server);

    ctl.submit(bom()).await.unwrap();
    let report = ctl.output().expect("report");

    let keys: Vec<&str> = report.table.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, ["product_name", "quantity", "supplier"]);
    let ids: Vec<usize> = report.table.rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert!(report.table.rows[1].fields["quantity"].is_null());
    assert!(report.summary.is_empty());
}

#[tokio::test]
async fn empty_items_is_not_an_error() {
    let mut server = Server::new_async().await;
    let _mock = json_mock(&mut server, "/supply/process", "bom_file", 200, r#"{"items":[]}"#).await;
    let (mut ctl, _) = controller::<BomAnalysis>(&server);

    ctl.submit(bom()).await.unwrap();
    match ctl.view() {
        AnalysisView::Ready(report) => {
            assert!(report.table.columns.is_empty());
            assert!(report.table.rows.is_empty());
        }
        other => panic!("expected an empty report, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_measure_fails_projection() {
    let mut server = Server::new_async().await;
    let _mock = json_mock(&mut server, "/supply/process", "bom_file", 200, &fixture("bom_mixed_invalid")).await;
    let (mut ctl, _) = controller::<BomAnalysis>(&server);

    ctl.submit(bom()).await.unwrap();
    assert_eq!(
        ctl.view(),
        AnalysisView::Failed("Row 2: field 'matchedItemCarbonFootprint' is missing")
    );
    assert!(ctl.output().is_none());
}

#[tokio::test]
async fn server_error_surfaces_status() {
    let mut server = Server::new_async().await;
    let _mock = json_mock(
        &mut server,
        "/supply/process",
        "bom_file",
        500,
        r#"{"detail":"Internal server error during processing."}"#,
    )
    .await;
    let (mut ctl, _) = controller::<BomAnalysis>(&server);

    ctl.submit(bom()).await.unwrap();
    match ctl.state() {
        RequestState::Error { message } => assert!(message.contains("500"), "{}", message),
        other => panic!("expected error state, got {}", other.name()),
    }
    assert!(ctl.output().is_none());
}

#[tokio::test]
async fn unreadable_body_is_parse_error() {
    let mut server = Server::new_async().await;
    let _mock = json_mock(&mut server, "/predict", "file", 200, "not json").await;
    let (mut ctl, _) = controller::<WasteClassification>(&server);

    ctl.submit(image("vial.png")).await.unwrap();
    match ctl.view() {
        AnalysisView::Failed(msg) => assert!(msg.starts_with("Unexpected response from server")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let previews = PreviewStore::new();
    let mut ctl: UploadController<BomAnalysis> =
        UploadController::new(AnalysisClient::new("http://127.0.0.1:1"), previews);

    ctl.submit(bom()).await.unwrap();
    match ctl.view() {
        AnalysisView::Failed(msg) => assert!(msg.starts_with("Error uploading file")),
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn white_prediction_uses_inherited_highlight() {
    let mut server = Server::new_async().await;
    let _mock = json_mock(
        &mut server,
        "/predict",
        "file",
        200,
        r#"{"prediction":"syringe","mapped_biomedical_category":"White"}"#,
    )
    .await;
    let (mut ctl, _) = controller::<WasteClassification>(&server);

    ctl.submit(image("syringe.png")).await.unwrap();
    let diagnosis = ctl.output().expect("diagnosis");
    assert_eq!(diagnosis.prediction.raw_label, "syringe");
    assert_eq!(diagnosis.prediction.category, Category::White);
    assert_eq!(diagnosis.prediction.category.highlight(), Highlight::Inherit);
    assert!(!diagnosis.guidance.is_placeholder());
    assert!(diagnosis.guidance.purpose.contains("needles"));
}

#[tokio::test]
async fn unknown_category_gets_placeholder() {
    let mut server = Server::new_async().await;
    let _mock = json_mock(
        &mut server,
        "/predict",
        "file",
        200,
        r#"{"prediction":"flower","mapped_biomedical_category":"Purple"}"#,
    )
    .await;
    let (mut ctl, _) = controller::<WasteClassification>(&server);

    ctl.submit(image("flower.png")).await.unwrap();
    let diagnosis = ctl.output().expect("diagnosis");
    assert_eq!(diagnosis.prediction.category, Category::Unknown);
    assert!(diagnosis.guidance.is_placeholder());
}

#[tokio::test]
async fn non_image_is_rejected_before_any_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/predict")
        .expect(0)
        .create_async()
        .await;
    let (mut ctl, previews) = controller::<WasteClassification>(&server);

    let err = ctl.submit(bom()).await.unwrap_err();
    assert_eq!(err, AnalysisError::Validation("Only image files are allowed".into()));
    assert_eq!(ctl.view(), AnalysisView::Empty);
    assert_eq!(previews.live(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn repeated_uploads_hold_one_preview() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/predict")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"prediction":"glove","mapped_biomedical_category":"Red"}"#)
        .expect(3)
        .create_async()
        .await;
    let (mut ctl, previews) = controller::<WasteClassification>(&server);

    for name in ["a.png", "b.jpg", "c.webp"] {
        ctl.submit(image(name)).await.unwrap();
        assert_eq!(previews.live(), 1);
    }
    let url = ctl.session().unwrap().preview_url().to_string();
    assert!(url.ends_with("c.webp"));
    assert!(previews.resolve(&url).is_some());

    drop(ctl);
    assert_eq!(previews.live(), 0);
}

#[tokio::test]
async fn file_read_from_disk_keeps_name_and_type() {
    let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    tmp.write_all(b"product_name,quantity\nMask,3\n").unwrap();

    let file = FileHandle::read(tmp.path()).await.unwrap();
    assert_eq!(file.media_type, "text/csv");
    assert!(file.name.ends_with(".csv"));
    assert_eq!(&file.bytes[..], b"product_name,quantity\nMask,3\n");
}
