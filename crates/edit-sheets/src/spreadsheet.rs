//! The spreadsheet handle: authentication, cell accumulation and the
//! send/receive round trips against one worksheet.

use std::fmt;

use edit_sheets_core::{CellInput, EntryBook};
use serde_json::Value as JsonValue;

use crate::auth::{self, AuthToken, Service};
use crate::documents;
use crate::error::{Result, SheetError};
use crate::feed::{self, Rows, SheetInfo};
use crate::metadata::{Metadata, MetadataUpdate, WorksheetMetadata};
use crate::options::{SheetOptions, SheetRef};
use crate::templates::Templates;
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};

/// Marker the batch endpoint puts in the response for a rejected entry.
const BATCH_FAILURE_MARKER: &str = "success='0'";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Grow the worksheet first when the batch reaches past its current size.
    pub auto_size: bool,
}

/// What a successful [`Spreadsheet::send`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOutcome {
    pub cells_sent: usize,
    /// The new metadata when the worksheet was grown.
    pub resized: Option<Metadata>,
}

/// A connection to one worksheet.
///
/// Cells added with [`add`](Self::add) / [`add_value`](Self::add_value)
/// accumulate until [`send`](Self::send) flushes them in a single batch
/// request. Requests are issued one at a time.
pub struct Spreadsheet<T = ReqwestTransport> {
    transport: T,
    options: SheetOptions,
    spreadsheet_id: Option<String>,
    worksheet_id: Option<String>,
    token: Option<AuthToken>,
    headers: Vec<(String, String)>,
    templates: Templates,
    book: EntryBook,
}

// Credentials and the token are left out.
impl<T: fmt::Debug> fmt::Debug for Spreadsheet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spreadsheet")
            .field("transport", &self.transport)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("worksheet_id", &self.worksheet_id)
            .field("authenticated", &self.token.is_some())
            .field("queued", &self.book.len())
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> Spreadsheet<T> {
    /// Build an unauthenticated handle. Ids given in `options` are used as-is;
    /// names are resolved by [`init`](Self::init).
    pub fn new(options: SheetOptions, transport: T) -> Result<Self> {
        options.validate()?;
        let templates = Templates::from_options(options.templates.as_ref())?;

        let spreadsheet_id = match options.spreadsheet_ref()? {
            SheetRef::Id(id) => Some(id),
            SheetRef::Name(_) => None,
        };
        let worksheet_id = match options.worksheet_ref()? {
            SheetRef::Id(id) => Some(id),
            SheetRef::Name(_) => None,
        };

        Ok(Self {
            transport,
            options,
            spreadsheet_id,
            worksheet_id,
            token: None,
            headers: Vec::new(),
            templates,
            book: EntryBook::new(),
        })
    }

    /// Create the document if asked to, authenticate, and resolve ids.
    pub async fn open(&mut self) -> Result<()> {
        if self.options.spreadsheet_create {
            self.create_document().await?;
        }
        self.auth().await?;
        self.init().await
    }

    async fn create_document(&mut self) -> Result<()> {
        if self.spreadsheet_id.is_some() {
            tracing::warn!("spreadsheetCreate ignored: spreadsheetId was given");
            return Ok(());
        }
        let SheetRef::Name(title) = self.options.spreadsheet_ref()? else {
            return Ok(());
        };

        let credentials = self.options.credentials()?;
        let token = auth::authenticate(&self.transport, &credentials, Service::Documents).await?;
        let key = documents::create_spreadsheet(&self.transport, &token, &title).await?;

        tracing::info!(spreadsheet_id = %key, title = %title, "created spreadsheet");
        self.spreadsheet_id = Some(key);
        Ok(())
    }

    /// Obtain a token for the spreadsheets service.
    pub async fn auth(&mut self) -> Result<()> {
        let credentials = self.options.credentials()?;
        let token =
            auth::authenticate(&self.transport, &credentials, Service::Spreadsheets).await?;
        self.headers = token.headers();
        self.token = Some(token);
        Ok(())
    }

    /// Resolve spreadsheet and worksheet names to ids.
    pub async fn init(&mut self) -> Result<()> {
        self.require_token()?;

        if self.spreadsheet_id.is_none() {
            let name = self.options.spreadsheet_name.clone().unwrap_or_default();
            let url = format!("{}/spreadsheets/private/full?alt=json", self.options.feed_root());
            let id = self.lookup_id(url, "spreadsheet", &name).await?;
            tracing::debug!(spreadsheet_id = %id, name = %name, "resolved spreadsheet");
            self.spreadsheet_id = Some(id);
        }

        if self.worksheet_id.is_none() {
            let name = self.options.worksheet_name.clone().unwrap_or_default();
            let url = format!(
                "{}/worksheets/{}/private/full?alt=json",
                self.options.feed_root(),
                self.spreadsheet_id.as_deref().unwrap_or_default()
            );
            let id = self.lookup_id(url, "worksheet", &name).await?;
            tracing::debug!(worksheet_id = %id, name = %name, "resolved worksheet");
            self.worksheet_id = Some(id);
        }

        Ok(())
    }

    async fn lookup_id(&self, url: String, kind: &'static str, name: &str) -> Result<String> {
        let request = HttpRequest::get(url).headers(self.headers.iter().cloned());
        let response = self.transport.execute(request).await?;
        if response.status != 200 {
            return Err(SheetError::Status {
                status: response.status,
                body: response.body,
            });
        }

        feed::find_listing_id(&response.body, name)?.ok_or_else(|| SheetError::SheetNotFound {
            kind,
            name: name.to_string(),
        })
    }

    fn require_token(&self) -> Result<()> {
        match self.token {
            Some(_) => Ok(()),
            None => Err(SheetError::NoToken),
        }
    }

    fn ids(&self) -> Result<(&str, &str)> {
        match (&self.spreadsheet_id, &self.worksheet_id) {
            (Some(s), Some(w)) => Ok((s.as_str(), w.as_str())),
            _ => Err(SheetError::NotInitialized),
        }
    }

    pub fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id.as_deref()
    }

    pub fn worksheet_id(&self) -> Option<&str> {
        self.worksheet_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The worksheet's cells feed URL.
    pub fn base_url(&self) -> Result<String> {
        let (spreadsheet, worksheet) = self.ids()?;
        Ok(format!(
            "{}/cells/{}/{}/private/full",
            self.options.feed_root(),
            spreadsheet,
            worksheet
        ))
    }

    fn worksheet_url(&self) -> Result<String> {
        let (spreadsheet, worksheet) = self.ids()?;
        Ok(format!(
            "{}/worksheets/{}/private/full/{}",
            self.options.feed_root(),
            spreadsheet,
            worksheet
        ))
    }

    pub fn set_templates(&mut self, templates: Templates) {
        self.templates = templates;
    }

    /// Queue cells described as JSON; see [`EntryBook::add`].
    pub fn add(&mut self, cells: &JsonValue) -> Result<()> {
        Ok(self.book.add(cells)?)
    }

    /// Queue one cell (1-based row and column).
    pub fn add_value(&mut self, row: u32, col: u32, input: impl Into<CellInput>) -> Result<()> {
        Ok(self.book.add_value(row, col, input)?)
    }

    /// Cells queued for the next [`send`](Self::send).
    pub fn entries(&self) -> &EntryBook {
        &self.book
    }

    /// Drop queued cells and names.
    pub fn reset(&mut self) {
        self.book.clear();
    }

    /// Send all queued cells as one batch.
    ///
    /// On success the queue is cleared. On failure it is kept so the caller
    /// can inspect or resend it.
    pub async fn send(&mut self, options: SendOptions) -> Result<SendOutcome> {
        self.require_token()?;
        let base_url = self.base_url()?;
        let batch = self.book.compile()?;

        if batch.is_empty() {
            tracing::debug!("nothing to send");
            self.reset();
            return Ok(SendOutcome::default());
        }

        let mut outcome = SendOutcome {
            cells_sent: batch.entries.len(),
            resized: None,
        };

        if options.auto_size {
            let current = self.metadata().await?;
            if current.row_count < batch.max_row || current.col_count < batch.max_col {
                let update = MetadataUpdate {
                    title: Some(current.title.clone()),
                    row_count: Some(current.row_count.max(batch.max_row)),
                    col_count: Some(current.col_count.max(batch.max_col)),
                };
                outcome.resized = Some(self.set_metadata(update).await?);
            }
        }

        tracing::info!(cells = batch.entries.len(), "updating spreadsheet");
        let body = self.templates.render_body(&base_url, &batch);
        let request =
            HttpRequest::post(format!("{}/batch", base_url), body).headers(self.headers.iter().cloned());
        let response = self.transport.execute(request).await?;

        if response.body.contains(BATCH_FAILURE_MARKER) {
            tracing::error!(response = %response.body, "error updating spreadsheet");
            return Err(SheetError::BatchFailed {
                response: response.body,
            });
        }
        if !response.is_success() {
            return Err(SheetError::Status {
                status: response.status,
                body: response.body,
            });
        }

        tracing::info!("successfully updated spreadsheet");
        self.reset();
        Ok(outcome)
    }

    /// Read every cell of the worksheet.
    pub async fn receive(&self) -> Result<(Rows, SheetInfo)> {
        self.require_token()?;
        let (spreadsheet, worksheet) = self.ids()?;

        let request = HttpRequest::get(format!("{}?alt=json", self.base_url()?))
            .headers(self.headers.iter().cloned());
        let response = self.transport.execute(request).await?;

        if response.status != 200 {
            return Err(SheetError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let (rows, info) = feed::parse_cells_feed(&response.body, spreadsheet, worksheet)
            .map_err(|e| {
                if let SheetError::ReadFailed { response } = &e {
                    tracing::error!(%response, "error reading spreadsheet");
                }
                e
            })?;

        tracing::info!(
            cells = info.total_cells,
            rows = info.total_rows,
            "retrieved worksheet cells"
        );
        Ok((rows, info))
    }

    /// Current title, update time and dimensions of the worksheet.
    pub async fn metadata(&self) -> Result<Metadata> {
        self.require_token()?;
        WorksheetMetadata::new(&self.transport, self.worksheet_url()?, &self.headers)
            .get()
            .await
    }

    pub async fn set_metadata(&self, update: MetadataUpdate) -> Result<Metadata> {
        self.require_token()?;
        WorksheetMetadata::new(&self.transport, self.worksheet_url()?, &self.headers)
            .set(update)
            .await
    }
}
