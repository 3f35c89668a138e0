use edit_sheets::{create_with_transport, CellValue, HttpResponse, Method, SheetError};
use pretty_assertions::assert_eq;

use crate::common::*;

const CELLS_FEED: &str = r#"{
  "version": "1.0",
  "feed": {
    "title": { "type": "text", "$t": "Sheet1" },
    "updated": { "$t": "2014-01-02T03:04:05.000Z" },
    "author": [{ "name": { "$t": "alice" }, "email": { "$t": "alice@example.com" } }],
    "entry": [
      { "gs$cell": { "row": "1", "col": "1", "inputValue": "price", "$t": "price" } },
      { "gs$cell": { "row": "1", "col": "2", "inputValue": "12.5", "numericValue": "12.5", "$t": "12.5" } },
      { "gs$cell": { "row": "2", "col": "2", "inputValue": "=R[-1]C*2", "numericValue": "25.0", "$t": "25" } },
      { "gs$cell": { "row": "4", "col": "28", "inputValue": "=SUM(R2C2:R[-3]C[-26])", "numericValue": "37.5", "$t": "37.5" } }
    ]
  }
}"#;

#[tokio::test]
async fn test_receive_rows_and_info() {
    let transport = MockTransport::new([login_ok(), HttpResponse::new(200, CELLS_FEED)]);
    let sheet = create_with_transport(options(), &transport).await.unwrap();

    let (rows, info) = sheet.receive().await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url, format!("{}?alt=json", BASE_URL));

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[&1][&1], CellValue::Text("price".into()));
    assert_eq!(rows[&1][&2], CellValue::Number(12.5));
    assert_eq!(rows[&2][&2], CellValue::Text("=B1*2".into()));
    assert_eq!(rows[&4][&28], CellValue::Text("=SUM(B2:B1)".into()));

    assert_eq!(info.spreadsheet_id, "KEY");
    assert_eq!(info.worksheet_id, "od6");
    assert_eq!(info.worksheet_title.as_deref(), Some("Sheet1"));
    assert!(info.worksheet_updated.is_some());
    assert_eq!(info.authors[0].email, "alice@example.com");
    assert_eq!(info.total_cells, 4);
    assert_eq!(info.total_rows, 3);
    assert_eq!(info.last_row, 4);
    assert_eq!(info.next_row, 5);
}

#[tokio::test]
async fn test_receive_empty_sheet() {
    let transport = MockTransport::new([
        login_ok(),
        HttpResponse::new(200, r#"{ "feed": { "title": { "$t": "Sheet1" } } }"#),
    ]);
    let sheet = create_with_transport(options(), transport).await.unwrap();

    let (rows, info) = sheet.receive().await.unwrap();

    assert!(rows.is_empty());
    assert_eq!(info.total_cells, 0);
    assert_eq!((info.last_row, info.next_row), (1, 1));
}

#[tokio::test]
async fn test_receive_error_status() {
    let transport = MockTransport::new([login_ok(), HttpResponse::new(404, "Not Found")]);
    let sheet = create_with_transport(options(), transport).await.unwrap();

    let err = sheet.receive().await.unwrap_err();
    match err {
        SheetError::Status { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Not Found");
        }
        other => panic!("expected Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_receive_without_feed() {
    let transport = MockTransport::new([login_ok(), HttpResponse::new(200, r#"{ "error": "x" }"#)]);
    let sheet = create_with_transport(options(), transport).await.unwrap();

    let err = sheet.receive().await.unwrap_err();
    assert!(matches!(err, SheetError::ReadFailed { .. }));
    assert_eq!(err.to_string(), "Error Reading Spreadsheet");
}

#[tokio::test]
async fn test_receive_invalid_json() {
    let transport = MockTransport::new([login_ok(), HttpResponse::new(200, "<html>")]);
    let sheet = create_with_transport(options(), transport).await.unwrap();

    let err = sheet.receive().await.unwrap_err();
    assert!(matches!(err, SheetError::Json(_)));
    assert!(err.to_string().starts_with("JSON Parse Error"));
}
