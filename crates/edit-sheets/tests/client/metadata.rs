use edit_sheets::{create_with_transport, HttpResponse, Method, MetadataUpdate, SheetError};
use pretty_assertions::assert_eq;

use crate::common::*;

#[tokio::test]
async fn test_get_metadata() {
    let transport = MockTransport::new([login_ok(), worksheet_json(100, 26)]);
    let sheet = create_with_transport(options(), &transport).await.unwrap();

    let meta = sheet.metadata().await.unwrap();

    assert_eq!(meta.title, "Sheet1");
    assert_eq!((meta.row_count, meta.col_count), (100, 26));
    assert_eq!(
        meta.updated.map(|t| t.to_rfc3339()),
        Some("2014-01-02T03:04:05+00:00".to_string())
    );
    assert_eq!(
        transport.last_request().url,
        format!("{}?alt=json", WORKSHEET_URL)
    );
}

#[tokio::test]
async fn test_partial_update_reads_current_first() {
    let transport = MockTransport::new([
        login_ok(),
        worksheet_json(100, 26),
        worksheet_atom("Sheet1", 500, 26),
    ]);
    let sheet = create_with_transport(options(), &transport).await.unwrap();

    let meta = sheet
        .set_metadata(MetadataUpdate {
            row_count: Some(500),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!((meta.row_count, meta.col_count), (500, 26));
    assert!(meta.updated.is_some());

    let put = transport.last_request();
    assert_eq!(put.method, Method::Put);
    assert_eq!(put.header_value("Content-Type"), Some("application/atom+xml"));
    let body = put.body.unwrap();
    assert!(body.contains("<title type=\"text\">Sheet1</title>"));
    assert!(body.contains("<gs:rowCount>500</gs:rowCount>"));
    assert!(body.contains("<gs:colCount>26</gs:colCount>"));
}

#[tokio::test]
async fn test_complete_update_skips_read() {
    let transport = MockTransport::new([login_ok(), worksheet_atom("Totals", 10, 4)]);
    let sheet = create_with_transport(options(), &transport).await.unwrap();

    let meta = sheet
        .set_metadata(MetadataUpdate {
            title: Some("Totals".into()),
            ..MetadataUpdate::resize(10, 4)
        })
        .await
        .unwrap();

    assert_eq!(meta.title, "Totals");
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_metadata_error_status() {
    let transport = MockTransport::new([login_ok(), HttpResponse::new(403, "Forbidden")]);
    let sheet = create_with_transport(options(), transport).await.unwrap();

    let err = sheet.metadata().await.unwrap_err();
    assert!(matches!(err, SheetError::Status { status: 403, .. }));
}
