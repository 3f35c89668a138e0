use edit_sheets::{
    create_with_transport, HttpResponse, Method, OAuthCredentials, SheetError, SheetOptions,
    Spreadsheet,
};
use pretty_assertions::assert_eq;

use crate::common::*;

fn listing(entries: &[(&str, &str)]) -> HttpResponse {
    let entries = entries
        .iter()
        .map(|(id, title)| {
            format!(
                r#"{{ "id": {{ "$t": "{}" }}, "title": {{ "$t": "{}" }} }}"#,
                id, title
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    HttpResponse::new(200, format!(r#"{{ "feed": {{ "entry": [{}] }} }}"#, entries))
}

#[tokio::test]
async fn test_create_with_ids_logs_in_once() {
    let transport = MockTransport::new([login_ok()]);
    let sheet = create_with_transport(options(), transport).await.unwrap();

    assert!(sheet.is_authenticated());
    assert_eq!(sheet.spreadsheet_id(), Some("KEY"));
    assert_eq!(sheet.worksheet_id(), Some("od6"));
    assert_eq!(sheet.base_url().unwrap(), BASE_URL);
}

#[tokio::test]
async fn test_login_form_fields() {
    let transport = MockTransport::new([login_ok()]);
    let mut sheet = Spreadsheet::new(options(), &transport).unwrap();
    sheet.auth().await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url, edit_sheets::auth::CLIENT_LOGIN_URL);
    assert_eq!(
        request.header_value("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    let body = request.body.unwrap();
    assert!(body.contains("Email=alice%40example.com"));
    assert!(body.contains("Passwd=hunter2"));
    assert!(body.contains("service=wise"));
}

#[tokio::test]
async fn test_rejected_login() {
    let transport = MockTransport::new([HttpResponse::new(403, "Error=BadAuthentication\n")]);
    let err = create_with_transport(options(), transport).await.unwrap_err();
    match err {
        SheetError::AuthFailed { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("BadAuthentication"));
        }
        other => panic!("expected AuthFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_names_resolve_to_ids() {
    let transport = MockTransport::new([
        login_ok(),
        listing(&[
            ("https://spreadsheets.google.com/feeds/spreadsheets/private/full/OTHER", "Other"),
            ("https://spreadsheets.google.com/feeds/spreadsheets/private/full/KEY", "Budget"),
        ]),
        listing(&[(
            "https://spreadsheets.google.com/feeds/worksheets/KEY/private/full/od7",
            "Q1",
        )]),
    ]);
    let options = SheetOptions {
        spreadsheet_id: None,
        spreadsheet_name: Some("Budget".into()),
        worksheet_id: None,
        worksheet_name: Some("Q1".into()),
        ..options()
    };

    let sheet = create_with_transport(options, &transport).await.unwrap();
    assert_eq!(sheet.spreadsheet_id(), Some("KEY"));
    assert_eq!(sheet.worksheet_id(), Some("od7"));

    let urls: Vec<String> = transport.requests().into_iter().skip(1).map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![
            "https://spreadsheets.google.com/feeds/spreadsheets/private/full?alt=json",
            "https://spreadsheets.google.com/feeds/worksheets/KEY/private/full?alt=json",
        ]
    );
}

#[tokio::test]
async fn test_unknown_worksheet_name() {
    let transport = MockTransport::new([
        login_ok(),
        listing(&[(
            "https://spreadsheets.google.com/feeds/worksheets/KEY/private/full/od6",
            "Sheet1",
        )]),
    ]);
    let options = SheetOptions {
        worksheet_id: None,
        worksheet_name: Some("Missing".into()),
        ..options()
    };

    let err = create_with_transport(options, transport).await.unwrap_err();
    match err {
        SheetError::SheetNotFound { kind, name } => {
            assert_eq!(kind, "worksheet");
            assert_eq!(name, "Missing");
        }
        other => panic!("expected SheetNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_auth_sends_nothing() {
    let transport = MockTransport::new([]);
    let options = SheetOptions {
        password: None,
        ..options()
    };

    let err = create_with_transport(options, &transport).await.unwrap_err();
    assert!(matches!(err, SheetError::MissingAuth));
    assert_eq!(err.to_string(), "Missing authentication information");
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_access_token_needs_no_request() {
    let transport = MockTransport::new([]);
    let options = SheetOptions {
        username: None,
        password: None,
        oauth: Some(OAuthCredentials::AccessToken {
            access_token: "ya29.abc".into(),
        }),
        ..options()
    };

    let sheet = create_with_transport(options, &transport).await.unwrap();
    assert!(sheet.is_authenticated());
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_refresh_token_exchange() {
    let transport = MockTransport::new([HttpResponse::new(
        200,
        r#"{ "access_token": "ya29.fresh", "expires_in": 3600, "token_type": "Bearer" }"#,
    )]);
    let options = SheetOptions {
        oauth: Some(OAuthCredentials::Refresh {
            client_id: "cid".into(),
            client_secret: "secret".into(),
            refresh_token: "1/refresh".into(),
        }),
        ..options()
    };

    create_with_transport(options, &transport).await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.url, edit_sheets::auth::OAUTH_TOKEN_URL);
    let body = request.body.unwrap();
    assert!(body.contains("grant_type=refresh_token"));
    assert!(body.contains("refresh_token=1%2Frefresh"));
}

#[tokio::test]
async fn test_spreadsheet_create_flow() {
    let created = HttpResponse::new(
        201,
        concat!(
            "<?xml version='1.0' encoding='UTF-8'?>",
            "<entry xmlns=\"http://www.w3.org/2005/Atom\" xmlns:gd=\"http://schemas.google.com/g/2005\">",
            "<id>https://docs.google.com/feeds/id/spreadsheet%3ANEWKEY</id>",
            "<title>New Book</title>",
            "<gd:resourceId>spreadsheet:NEWKEY</gd:resourceId>",
            "</entry>"
        ),
    );
    let transport = MockTransport::new([login_ok(), created, login_ok()]);
    let options = SheetOptions {
        spreadsheet_id: None,
        spreadsheet_name: Some("New Book".into()),
        spreadsheet_create: true,
        ..options()
    };

    let sheet = create_with_transport(options, &transport).await.unwrap();
    assert_eq!(sheet.spreadsheet_id(), Some("NEWKEY"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].body.as_deref().unwrap().contains("service=writely"));
    assert_eq!(requests[1].url, edit_sheets::documents::DOCUMENTS_FEED_URL);
    assert!(requests[1].body.as_deref().unwrap().contains("<title>New Book</title>"));
    assert!(requests[2].body.as_deref().unwrap().contains("service=wise"));
}

#[tokio::test]
async fn test_spreadsheet_create_ignored_when_id_given() {
    let transport = MockTransport::new([login_ok()]);
    let options = SheetOptions {
        spreadsheet_name: Some("New Book".into()),
        spreadsheet_create: true,
        ..options()
    };

    let sheet = create_with_transport(options, &transport).await.unwrap();
    assert_eq!(sheet.spreadsheet_id(), Some("KEY"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, edit_sheets::auth::CLIENT_LOGIN_URL);
    assert!(requests[0].body.as_deref().unwrap().contains("service=wise"));
}

#[tokio::test]
async fn test_debug_output_hides_token() {
    let transport = MockTransport::new([login_ok()]);
    let sheet = create_with_transport(options(), transport).await.unwrap();

    let debug = format!("{:?}", sheet);
    assert!(debug.contains("\"KEY\""));
    assert!(debug.contains("authenticated: true"));
    assert!(!debug.contains("auth=tok"));
}
