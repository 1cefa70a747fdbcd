use std::io::Read;

use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use reqwest::Client;
use url::Url;

use crate::auth::{AccessTokenProvider, ServiceAccountAuth, ServiceAccountKey};
use crate::error::{Error, Result};

/// Header of the column holding the dreams (exact, case-sensitive)
pub const DREAM_COLUMN: &str = "dream";

pub const DRIVE_API: &str = "https://www.googleapis.com";

/// Reads dreams out of the first worksheet of a shared spreadsheet.
pub struct DreamSource {
    http: Client,
    api_base: String,
    auth: Box<dyn AccessTokenProvider>,
}

impl DreamSource {
    /// Authenticate as the given service account against Google's APIs.
    pub fn new(http: Client, key: ServiceAccountKey) -> Self {
        let auth = ServiceAccountAuth::new(http.clone(), key);
        Self::with_base_url(http, auth, DRIVE_API)
    }

    pub fn with_base_url(
        http: Client,
        auth: impl AccessTokenProvider + 'static,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            auth: Box::new(auth),
        }
    }

    /// Fetch the non-empty `dream` cells of the first worksheet, in row order.
    ///
    /// A worksheet without a `dream` column yields an empty list rather than an error.
    pub async fn fetch_dreams(&self, sheet_url: &str) -> Result<Vec<String>> {
        let id = sheet_id(sheet_url)?;
        let token = self.auth.access_token().await?;

        // Exporting a spreadsheet as CSV yields its first worksheet only
        info!("Opening spreadsheet {id}");
        let response = self
            .http
            .get(format!("{}/drive/v3/files/{id}/export", self.api_base))
            .query(&[("mimeType", "text/csv")])
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| Error::Access(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Access(format!("{status}: {body}")));
        }

        let worksheet = response
            .bytes()
            .await
            .map_err(|e| Error::Access(e.to_string()))?;
        let dreams = dreams_from_csv(worksheet.as_ref())?;
        debug!("Found {} dreams in spreadsheet {id}", dreams.len());

        Ok(dreams)
    }
}

/// Extract the spreadsheet id from a shared link.
///
/// Both `/spreadsheets/d/<id>/...` links and legacy `?key=<id>` links are accepted.
pub fn sheet_id(sheet_url: &str) -> Result<String> {
    let invalid = || Error::InvalidSheetUrl(sheet_url.to_string());
    let url = Url::parse(sheet_url.trim()).map_err(|_| invalid())?;

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();
    let from_path = segments
        .windows(3)
        .find(|window| window[0] == "spreadsheets" && window[1] == "d")
        .map(|window| window[2].to_string());

    let id = from_path.or_else(|| {
        url.query_pairs()
            .find(|(name, _)| name == "key")
            .map(|(_, value)| value.into_owned())
    });

    id.filter(|id| is_sheet_id(id)).ok_or_else(invalid)
}

fn is_sheet_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Pull the `dream` column out of a CSV worksheet with a header row.
///
/// Header names are trimmed, dream cells are kept exactly as entered. Empty cells and rows
/// too short to reach the column are skipped.
pub fn dreams_from_csv<R: Read>(worksheet: R) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .has_headers(true)
        .flexible(true)
        .from_reader(worksheet);

    let column = match reader.headers()?.iter().position(|h| h == DREAM_COLUMN) {
        Some(column) => column,
        None => {
            debug!("Worksheet has no `{DREAM_COLUMN}` column");
            return Ok(Vec::new());
        }
    };

    let mut dreams = Vec::new();
    for record in reader.records() {
        let record = record?;
        match record.get(column) {
            Some(dream) if !dream.is_empty() => dreams.push(dream.to_string()),
            _ => {}
        }
    }

    Ok(dreams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_non_empty_dreams_in_row_order() {
        let csv = "name,dream\nana,I flew over mountains\nbo,\ncy,I lost my keys\ndee,\n";
        assert_eq!(
            dreams_from_csv(csv.as_bytes()).unwrap(),
            vec!["I flew over mountains", "I lost my keys"]
        );
    }

    #[test]
    fn cells_are_kept_as_entered() {
        let csv = "dream\n  padded dream  \n\"\"\n   \n0\n";
        assert_eq!(
            dreams_from_csv(csv.as_bytes()).unwrap(),
            vec!["  padded dream  ", "   ", "0"]
        );
    }

    #[test]
    fn header_whitespace_is_ignored() {
        let csv = "name , dream \nana,flying\n";
        assert_eq!(dreams_from_csv(csv.as_bytes()).unwrap(), vec!["flying"]);
    }

    #[test]
    fn short_rows_are_skipped() {
        let csv = "when,dream\nmonday\ntuesday,swimming with whales\n";
        assert_eq!(
            dreams_from_csv(csv.as_bytes()).unwrap(),
            vec!["swimming with whales"]
        );
    }

    #[test]
    fn column_name_is_case_sensitive() {
        let csv = "Dream\nflying\n";
        assert!(dreams_from_csv(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn missing_column_yields_no_dreams() {
        let csv = "name,wish\nana,a pony\n";
        assert!(dreams_from_csv(csv.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn empty_worksheet_yields_no_dreams() {
        assert!(dreams_from_csv("".as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn quoted_cells_keep_commas_and_newlines() {
        let csv = "dream\n\"a house, by the sea\"\n\"two\nlines\"\n";
        assert_eq!(
            dreams_from_csv(csv.as_bytes()).unwrap(),
            vec!["a house, by the sea", "two\nlines"]
        );
    }

    #[test]
    fn sheet_id_from_edit_link() {
        let id = sheet_id(
            "https://docs.google.com/spreadsheets/d/1AbC-d_EfG123/edit#gid=0",
        )
        .unwrap();
        assert_eq!(id, "1AbC-d_EfG123");
    }

    #[test]
    fn sheet_id_from_legacy_key_link() {
        let id = sheet_id("https://spreadsheets.google.com/ccc?key=0Ak1x2y3&hl=en").unwrap();
        assert_eq!(id, "0Ak1x2y3");
    }

    #[test]
    fn sheet_id_ignores_surrounding_whitespace() {
        let id = sheet_id("  https://docs.google.com/spreadsheets/d/abc123/  \n").unwrap();
        assert_eq!(id, "abc123");
    }

    #[test]
    fn non_sheet_links_are_rejected() {
        for url in [
            "not a url",
            "https://example.com/some/page",
            "https://docs.google.com/document/d/abc123/edit",
            "https://docs.google.com/spreadsheets/d/",
        ] {
            assert!(
                matches!(sheet_id(url), Err(Error::InvalidSheetUrl(_))),
                "{url} should be rejected"
            );
        }
    }
}
