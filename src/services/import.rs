//! CSV bulk import for discovery items.
//!
//! DESIGN
//! ======
//! Parsing is naive: lines split on `\n`, fields split on `,`,
//! and one surrounding pair of quotes stripped. Quoted commas are not
//! supported. Tags inside a field are `|`-separated for that reason.
//!
//! ERROR HANDLING
//! ==============
//! Two failure tiers. A structural problem (empty file, bad header, an
//! unparseable date) aborts the whole batch before anything is inserted.
//! Once parsing succeeds, rows are inserted one at a time; a row that fails
//! is recorded as `Row N: message` (N counts the header as line 1) and the
//! next row is still attempted. There is no transaction: rows inserted
//! before a failure stay inserted.

use std::collections::HashSet;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::discovery::{self, DiscoveryError, DiscoveryItem, DiscoveryItemType, NewDiscoveryItem};

pub const TEMPLATE_FILENAME: &str = "discovery_items_template.csv";
pub const EXPORT_FILENAME: &str = "discovery_items.csv";

pub const TEMPLATE_HEADERS: [&str; 10] = [
    "name",
    "description",
    "type",
    "address",
    "event_date",
    "event_time",
    "image_url",
    "logo_url",
    "tags",
    "is_featured",
];

const TEMPLATE_SAMPLE_ROWS: [&str; 2] = [
    "Sample Event,A great community event,event,123 Main St,2024-12-31,18:00,https://example.com/image.jpg,https://example.com/logo.jpg,music|community,true",
    "Local Business,Amazing local business,business,456 Oak Ave,,,https://example.com/business.jpg,https://example.com/logo.jpg,shopping|local,false",
];

/// Display row numbers count the header as row 1 and start data at row 2.
const FIRST_DATA_ROW: usize = 2;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsvError {
    #[error("CSV file is empty")]
    Empty,
    #[error("header column {0} has no name")]
    BlankColumn(usize),
    #[error("duplicate header column: {0}")]
    DuplicateColumn(String),
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid event_date {value:?}")]
    InvalidDate { row: usize, value: String },
}

impl ErrorCode for CsvError {
    fn error_code(&self) -> &'static str {
        "E_CSV_INVALID"
    }

    fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Description,
    Type,
    Address,
    EventDate,
    EventTime,
    ImageUrl,
    LogoUrl,
    Tags,
    IsFeatured,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        match header {
            "name" => Some(Self::Name),
            "description" => Some(Self::Description),
            "type" => Some(Self::Type),
            "address" => Some(Self::Address),
            "event_date" => Some(Self::EventDate),
            "event_time" => Some(Self::EventTime),
            "image_url" => Some(Self::ImageUrl),
            "logo_url" => Some(Self::LogoUrl),
            "tags" => Some(Self::Tags),
            "is_featured" => Some(Self::IsFeatured),
            _ => None,
        }
    }
}

/// One data line after column mapping and coercion. Nothing here has been
/// validated against the table yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvRow {
    pub name: Option<String>,
    pub description: Option<String>,
    pub item_type: Option<String>,
    pub address: Option<String>,
    pub event_date: Option<OffsetDateTime>,
    pub event_time: Option<String>,
    pub image_url: Option<String>,
    pub logo_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_featured: bool,
}

impl CsvRow {
    /// Turn the row into an insert payload.
    ///
    /// # Errors
    ///
    /// Returns a message when `name` is missing or `type` is not a known item type.
    pub fn into_new_item(self) -> Result<NewDiscoveryItem, String> {
        let name = self.name.ok_or_else(|| "name is required".to_owned())?;
        let raw_type = self.item_type.ok_or_else(|| "type is required".to_owned())?;
        let item_type =
            DiscoveryItemType::from_str(&raw_type).ok_or_else(|| format!("invalid discovery item type: {raw_type}"))?;

        Ok(NewDiscoveryItem {
            name,
            description: self.description,
            item_type,
            category_id: None,
            address: self.address,
            event_date: self.event_date,
            event_time: self.event_time,
            image_url: self.image_url,
            logo_url: self.logo_url,
            tags: self.tags,
            contact_info: None,
            is_featured: self.is_featured,
        })
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub success: usize,
    pub errors: Vec<String>,
}

impl ImportReport {
    /// Human summary in the admin panel's wording.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.success == 0 {
            return "No items were uploaded successfully".to_owned();
        }
        if self.errors.is_empty() {
            format!("{} items uploaded successfully", self.success)
        } else {
            format!("{} items uploaded successfully with {} errors", self.success, self.errors.len())
        }
    }
}

// =============================================================================
// INSERT SEAM
// =============================================================================

/// Destination for imported rows. `PgPool` writes to `discovery_items`.
#[async_trait]
pub trait ItemInserter: Send + Sync {
    async fn insert_item(&self, item: &NewDiscoveryItem, created_by: Uuid) -> Result<Uuid, DiscoveryError>;
}

#[async_trait]
impl ItemInserter for PgPool {
    async fn insert_item(&self, item: &NewDiscoveryItem, created_by: Uuid) -> Result<Uuid, DiscoveryError> {
        discovery::insert_item(self, item, created_by).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn unquote(raw: &str) -> &str {
    let value = raw.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_owned()) }
}

fn split_pipe_tags(value: &str) -> Option<Vec<String>> {
    if value.is_empty() {
        return None;
    }
    Some(value.split('|').map(|t| t.trim().to_owned()).collect())
}

fn parse_header(line: &str) -> Result<Vec<Option<Column>>, CsvError> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for (index, raw) in line.split(',').enumerate() {
        let header = raw.trim();
        if header.is_empty() {
            return Err(CsvError::BlankColumn(index + 1));
        }
        if !seen.insert(header) {
            return Err(CsvError::DuplicateColumn(header.to_owned()));
        }
        columns.push(Column::from_header(header));
    }

    for (required, label) in [(Column::Name, "name"), (Column::Type, "type")] {
        if !columns.contains(&Some(required)) {
            return Err(CsvError::MissingColumn(label));
        }
    }
    Ok(columns)
}

/// Parse CSV text into rows.
///
/// # Errors
///
/// Any [`CsvError`] aborts the whole file; no partial result is returned.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>, CsvError> {
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or(CsvError::Empty)?;
    let columns = parse_header(header)?;

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let values: Vec<&str> = line.split(',').map(unquote).collect();
        let mut row = CsvRow::default();

        for (position, column) in columns.iter().enumerate() {
            let Some(column) = column else { continue };
            let value = values.get(position).copied().unwrap_or("");
            match column {
                Column::Name => row.name = non_empty(value),
                Column::Description => row.description = non_empty(value),
                Column::Type => row.item_type = non_empty(value),
                Column::Address => row.address = non_empty(value),
                Column::EventDate => {
                    row.event_date = if value.is_empty() {
                        None
                    } else {
                        Some(discovery::parse_event_date(value).map_err(|_| CsvError::InvalidDate {
                            row: index + FIRST_DATA_ROW,
                            value: value.to_owned(),
                        })?)
                    };
                }
                Column::EventTime => row.event_time = non_empty(value),
                Column::ImageUrl => row.image_url = non_empty(value),
                Column::LogoUrl => row.logo_url = non_empty(value),
                Column::Tags => row.tags = split_pipe_tags(value),
                Column::IsFeatured => row.is_featured = value.eq_ignore_ascii_case("true"),
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

// =============================================================================
// IMPORT
// =============================================================================

/// Insert parsed rows one by one, collecting per-row failures.
pub async fn run_import(inserter: &dyn ItemInserter, rows: Vec<CsvRow>, created_by: Uuid) -> ImportReport {
    let mut report = ImportReport::default();

    for (index, row) in rows.into_iter().enumerate() {
        let display_row = index + FIRST_DATA_ROW;
        let outcome = match row.into_new_item() {
            Ok(item) => inserter
                .insert_item(&item, created_by)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
            Err(message) => Err(message),
        };

        match outcome {
            Ok(()) => report.success += 1,
            Err(message) => {
                tracing::warn!(row = display_row, error = %message, "csv import row failed");
                report.errors.push(format!("Row {display_row}: {message}"));
            }
        }
    }

    tracing::info!(
        %created_by,
        success = report.success,
        failed = report.errors.len(),
        "csv import finished"
    );
    report
}

/// Parse then import. Parsing failures abort before any insert.
///
/// # Errors
///
/// Returns the [`CsvError`] that aborted parsing.
pub async fn import_csv(inserter: &dyn ItemInserter, text: &str, created_by: Uuid) -> Result<ImportReport, CsvError> {
    let rows = parse_csv(text)?;
    Ok(run_import(inserter, rows, created_by).await)
}

// =============================================================================
// TEMPLATE / EXPORT
// =============================================================================

/// Downloadable template: header plus two sample rows.
#[must_use]
pub fn template_csv() -> String {
    let mut lines = vec![TEMPLATE_HEADERS.join(",")];
    lines.extend(TEMPLATE_SAMPLE_ROWS.iter().map(|row| (*row).to_owned()));
    lines.join("\n")
}

/// Export failed while serializing rows.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
}

impl ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        "E_EXPORT_FAILED"
    }

    fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Fields of one item in template column order.
fn export_record(item: &DiscoveryItem) -> [String; 10] {
    let event_date = item
        .event_date
        .and_then(|d| d.format(&Rfc3339).ok())
        .unwrap_or_default();
    let text = |v: Option<&str>| v.unwrap_or_default().to_owned();

    [
        item.name.clone(),
        text(item.description.as_deref()),
        item.item_type.as_str().to_owned(),
        text(item.address.as_deref()),
        event_date,
        text(item.event_time.as_deref()),
        text(item.image_url.as_deref()),
        text(item.logo_url.as_deref()),
        item.tags.as_ref().map(|t| t.join("|")).unwrap_or_default(),
        item.is_featured.unwrap_or(false).to_string(),
    ]
}

/// Whether the exported line reads back through [`parse_csv`] unchanged.
/// The importer does not honour quoting, so a field holding a comma, a
/// quote or a line break shifts the columns on re-import.
#[must_use]
pub fn reimports_cleanly(item: &DiscoveryItem) -> bool {
    export_record(item)
        .iter()
        .all(|field| !field.contains([',', '"', '\n', '\r']))
}

/// Write all items as CSV, header first.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if the writer fails.
pub fn export_csv(items: &[DiscoveryItem]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(TEMPLATE_HEADERS)?;
    for item in items {
        wtr.write_record(export_record(item))?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    wtr.into_inner().map_err(|err| ExportError::Csv(err.into_error().into()))
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
