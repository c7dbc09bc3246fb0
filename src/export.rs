use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::error::ExplorerError;
use crate::table::RecordTable;

pub const EXPORT_FILE_NAME: &str = "bioactivitydata.csv";
pub const EXPORT_LINK_TEXT: &str = "Download csv file";

/// A same-page download link carrying the whole CSV document inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadLink {
    pub file_name: String,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub csv_bytes: usize,
    pub href: String,
    pub html: String,
}

impl DownloadLink {
    /// The base64 payload embedded in `href`.
    pub fn payload(&self) -> &str {
        self.href
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .unwrap_or_default()
    }

    /// Decodes the embedded payload back into CSV text.
    pub fn decode_csv(&self) -> Result<String, ExplorerError> {
        let bytes = STANDARD
            .decode(self.payload())
            .map_err(|err| ExplorerError::Csv(format!("invalid base64 payload: {err}")))?;
        String::from_utf8(bytes).map_err(|err| ExplorerError::Csv(err.to_string()))
    }
}

pub fn download_link(table: &RecordTable) -> Result<DownloadLink, ExplorerError> {
    let csv = table.to_csv()?;
    let encoded = STANDARD.encode(csv.as_bytes());
    let href = format!("data:file/csv;base64,{encoded}");
    let html = format!(r#"<a href="{href}" download="{EXPORT_FILE_NAME}">{EXPORT_LINK_TEXT}</a>"#);

    tracing::debug!(
        rows = table.len(),
        columns = table.columns().len(),
        csv_bytes = csv.len(),
        "built export link"
    );

    Ok(DownloadLink {
        file_name: EXPORT_FILE_NAME.to_string(),
        columns: table.columns().to_vec(),
        row_count: table.len(),
        csv_bytes: csv.len(),
        href,
        html,
    })
}
