//! Spreadsheet creation through the documents list feed.

use quick_xml::escape::escape;

use crate::auth::AuthToken;
use crate::error::{Result, SheetError};
use crate::feed::{self, AtomEntry};
use crate::transport::{HttpRequest, HttpTransport};

pub const DOCUMENTS_FEED_URL: &str = "https://docs.google.com/feeds/default/private/full";

const SPREADSHEET_KIND: &str = "http://schemas.google.com/docs/2007#spreadsheet";

/// Create an empty spreadsheet titled `title` and return its key.
///
/// `token` must have been issued for [`crate::auth::Service::Documents`].
pub async fn create_spreadsheet<T: HttpTransport>(
    transport: &T,
    token: &AuthToken,
    title: &str,
) -> Result<String> {
    let body = format!(
        concat!(
            "<?xml version='1.0' encoding='UTF-8'?>\n",
            "<entry xmlns=\"http://www.w3.org/2005/Atom\">\n",
            "  <category scheme=\"http://schemas.google.com/g/2005#kind\"\n",
            "    term=\"{}\"/>\n",
            "  <title>{}</title>\n",
            "</entry>\n"
        ),
        SPREADSHEET_KIND,
        escape(title)
    );

    tracing::info!(title, "creating spreadsheet");

    let request = HttpRequest::post(DOCUMENTS_FEED_URL, body).headers(token.headers());
    let response = transport.execute(request).await?;

    if !response.is_success() {
        return Err(SheetError::Status {
            status: response.status,
            body: response.body,
        });
    }

    let entry = feed::parse_atom_entry(&response.body)?;
    spreadsheet_key(&entry).ok_or_else(|| {
        SheetError::UnexpectedResponse("created document has no spreadsheet key".into())
    })
}

/// `gd:resourceId` is `spreadsheet:<key>`; the entry id ends in
/// `spreadsheet%3A<key>`.
fn spreadsheet_key(entry: &AtomEntry) -> Option<String> {
    if let Some(key) = entry
        .resource_id
        .as_deref()
        .and_then(|id| id.strip_prefix("spreadsheet:"))
    {
        return Some(key.to_string());
    }

    let id = entry.id.as_deref()?;
    let key = id
        .rsplit_once("spreadsheet%3A")
        .or_else(|| id.rsplit_once("spreadsheet:"))
        .map(|(_, key)| key)?;
    (!key.is_empty()).then(|| key.to_string())
}
