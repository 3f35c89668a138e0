//! Batch request templates.
//!
//! A batch request is the body template with one rendered entry template per
//! cell in its `{{entries}}` slot. Slots:
//!
//! | slot           | template | replaced with                        |
//! |----------------|----------|--------------------------------------|
//! | `{{base_url}}` | both     | the worksheet's cells feed URL       |
//! | `{{entries}}`  | body     | rendered entries, newline separated  |
//! | `{{row}}`      | entry    | 1-based row                          |
//! | `{{col}}`      | entry    | 1-based column                       |
//! | `{{value}}`    | entry    | the XML-escaped input value          |

use edit_sheets_core::{CompiledBatch, CompiledEntry};
use quick_xml::escape::escape;

use crate::error::{Result, SheetError};
use crate::options::TemplateOptions;

pub const DEFAULT_BODY_TEMPLATE: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"
  xmlns:batch="http://schemas.google.com/gdata/batch"
  xmlns:gs="http://schemas.google.com/spreadsheets/2006">
<id>{{base_url}}</id>
{{entries}}
</feed>
"#;

pub const DEFAULT_ENTRY_TEMPLATE: &str = r#"<entry>
  <batch:id>UpdateR{{row}}C{{col}}</batch:id>
  <batch:operation type="update"/>
  <id>{{base_url}}/R{{row}}C{{col}}</id>
  <link rel="edit" type="application/atom+xml"
    href="{{base_url}}/R{{row}}C{{col}}"/>
  <gs:cell row="{{row}}" col="{{col}}" inputValue="{{value}}"/>
</entry>"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    body: String,
    entry: String,
}

impl Default for Templates {
    fn default() -> Self {
        Self {
            body: DEFAULT_BODY_TEMPLATE.to_string(),
            entry: DEFAULT_ENTRY_TEMPLATE.to_string(),
        }
    }
}

impl Templates {
    pub fn new(body: impl Into<String>, entry: impl Into<String>) -> Result<Self> {
        let body = body.into();
        let entry = entry.into();
        if !body.contains("{{entries}}") {
            return Err(SheetError::Config(
                "body template has no {{entries}} slot".into(),
            ));
        }
        if !entry.contains("{{value}}") {
            return Err(SheetError::Config("entry template has no {{value}} slot".into()));
        }
        Ok(Self { body, entry })
    }

    /// Defaults, with whichever templates the options override.
    pub fn from_options(options: Option<&TemplateOptions>) -> Result<Self> {
        let defaults = Self::default();
        match options {
            None => Ok(defaults),
            Some(opts) => Self::new(
                opts.body.clone().unwrap_or(defaults.body),
                opts.entry.clone().unwrap_or(defaults.entry),
            ),
        }
    }

    pub fn render_entry(&self, base_url: &str, entry: &CompiledEntry) -> String {
        self.entry
            .replace("{{base_url}}", base_url)
            .replace("{{row}}", &entry.address.row.to_string())
            .replace("{{col}}", &entry.address.col.to_string())
            .replace("{{value}}", &escape(entry.input.as_str()))
    }

    pub fn render_body(&self, base_url: &str, batch: &CompiledBatch) -> String {
        let entries = batch
            .entries
            .iter()
            .map(|entry| self.render_entry(base_url, entry))
            .collect::<Vec<_>>()
            .join("\n");

        self.body
            .replace("{{base_url}}", base_url)
            .replace("{{entries}}", &entries)
    }
}
