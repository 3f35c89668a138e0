//! Scripted transport and fixtures shared by the client tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use edit_sheets::{HttpRequest, HttpResponse, HttpTransport, SheetError, SheetOptions};

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = HttpResponse>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> edit_sheets::Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SheetError::Http(format!("unexpected request to {}", request.url)))
    }
}

pub const BASE_URL: &str = "https://spreadsheets.google.com/feeds/cells/KEY/od6/private/full";
pub const WORKSHEET_URL: &str =
    "https://spreadsheets.google.com/feeds/worksheets/KEY/private/full/od6";

/// Password credentials and ids, so opening costs one ClientLogin request.
pub fn options() -> SheetOptions {
    SheetOptions {
        username: Some("alice@example.com".into()),
        password: Some("hunter2".into()),
        spreadsheet_id: Some("KEY".into()),
        worksheet_id: Some("od6".into()),
        ..Default::default()
    }
}

pub fn login_ok() -> HttpResponse {
    HttpResponse::new(200, "SID=s\nLSID=l\nAuth=tok\n")
}

pub fn worksheet_json(rows: u32, cols: u32) -> HttpResponse {
    HttpResponse::new(
        200,
        format!(
            r#"{{ "entry": {{
                "title": {{ "$t": "Sheet1" }},
                "updated": {{ "$t": "2014-01-02T03:04:05.000Z" }},
                "gs$rowCount": {{ "$t": "{}" }},
                "gs$colCount": {{ "$t": "{}" }}
            }} }}"#,
            rows, cols
        ),
    )
}

pub fn worksheet_atom(title: &str, rows: u32, cols: u32) -> HttpResponse {
    HttpResponse::new(
        200,
        format!(
            concat!(
                "<?xml version='1.0' encoding='UTF-8'?>",
                "<entry xmlns=\"http://www.w3.org/2005/Atom\" ",
                "xmlns:gs=\"http://schemas.google.com/spreadsheets/2006\">",
                "<id>{}</id><updated>2014-02-03T04:05:06.000Z</updated>",
                "<title type=\"text\">{}</title>",
                "<gs:rowCount>{}</gs:rowCount><gs:colCount>{}</gs:colCount>",
                "</entry>"
            ),
            WORKSHEET_URL, title, rows, cols
        ),
    )
}

pub fn batch_ok() -> HttpResponse {
    HttpResponse::new(
        200,
        "<feed><entry><batch:status code='200' reason='Success'/></entry></feed>",
    )
}
