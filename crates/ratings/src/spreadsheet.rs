//! Rating agencies that publish their full rating list as a spreadsheet.
//!
//! The spreadsheet is kept on disk and downloaded again once per calendar
//! day. Lookups match the taxpayer id column exactly and read the rating
//! column of the first matching row.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{DateTime, Local, NaiveDate};
use log::{debug, info};
use tokio::sync::OnceCell;

use crate::errors::{RatingError, Result};
use crate::fetch::{HttpFetch, BROWSER_USER_AGENT};
use crate::source::{Rating, RatingSource};

pub const NRA_URL: &str =
    "https://www.ra-national.ru/wp-load.php?security_key=100c906f36a0b90e&export_id=20&action=get_data";
pub const NRA_FILE_NAME: &str = "NRA_ratings.xlsx";

pub const NKR_URL: &str = "https://ratings.ru/issuers.php";
pub const NKR_FILE_NAME: &str = "NKR_ratings.xlsx";

// ============================================================================
// Daily file cache
// ============================================================================

/// A local copy of a remote file, refreshed when it was not written today.
#[derive(Clone, Debug)]
pub struct DailyFile {
    path: PathBuf,
    url: String,
    send_user_agent: bool,
}

impl DailyFile {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            send_user_agent: false,
        }
    }

    pub fn with_browser_user_agent(mut self) -> Self {
        self.send_user_agent = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the file exists and was last modified on `today`.
    pub async fn is_fresh(&self, today: NaiveDate) -> Result<bool> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let modified: DateTime<Local> = metadata.modified()?.into();
        Ok(modified.date_naive() == today)
    }

    /// Downloads the file unless it is fresh. Returns whether a download happened.
    pub async fn ensure_fresh(&self, fetcher: &dyn HttpFetch, today: NaiveDate) -> Result<bool> {
        if self.is_fresh(today).await? {
            debug!("{} is up to date", self.path.display());
            return Ok(false);
        }

        let headers: &[(&str, &str)] = if self.send_user_agent {
            &[("User-Agent", BROWSER_USER_AGENT)]
        } else {
            &[]
        };
        let response = fetcher.get(&self.url, headers).await?.require_ok(&self.url)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, &response.body).await?;
        info!(
            "Downloaded {} ({} bytes) from {}",
            self.path.display(),
            response.body.len(),
            self.url
        );
        Ok(true)
    }
}

// ============================================================================
// Rating table
// ============================================================================

/// Id → rating pairs read from the first worksheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RatingTable {
    entries: Vec<(String, String)>,
}

impl RatingTable {
    /// Builds the table from rows whose first row is the header.
    ///
    /// A header without either column yields an empty table, so every
    /// lookup comes back not rated.
    pub fn from_rows<I, R>(rows: I, id_column: &str, rating_column: &str) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        let mut rows = rows.into_iter();
        let Some(header) = rows.next() else {
            return Self::default();
        };
        let header = header.as_ref();
        let position = |name: &str| header.iter().position(|h| h.trim() == name);
        let (Some(id_idx), Some(rating_idx)) = (position(id_column), position(rating_column))
        else {
            return Self::default();
        };

        let entries = rows
            .filter_map(|row| {
                let row = row.as_ref();
                let id = row.get(id_idx)?;
                let rating = row.get(rating_idx).cloned().unwrap_or_default();
                Some((id.trim().to_string(), rating))
            })
            .collect();

        Self { entries }
    }

    /// Reads the first worksheet of an xlsx/xls/ods payload.
    pub fn from_workbook(bytes: Vec<u8>, id_column: &str, rating_column: &str) -> Result<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => return Ok(Self::default()),
        };
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
        Ok(Self::from_rows(rows, id_column, rating_column))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rating of the first row whose id equals `id`.
    pub fn lookup(&self, id: &str) -> Rating {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, rating)| Rating::from_text(rating.trim()))
            .unwrap_or(Rating::NotRated)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Source
// ============================================================================

pub struct SpreadsheetSource {
    id: &'static str,
    file: DailyFile,
    id_column: &'static str,
    rating_column: &'static str,
    fetcher: Arc<dyn HttpFetch>,
    today: NaiveDate,
    table: OnceCell<RatingTable>,
}

impl SpreadsheetSource {
    pub fn new(
        id: &'static str,
        file: DailyFile,
        id_column: &'static str,
        rating_column: &'static str,
        fetcher: Arc<dyn HttpFetch>,
        today: NaiveDate,
    ) -> Self {
        Self {
            id,
            file,
            id_column,
            rating_column,
            fetcher,
            today,
            table: OnceCell::new(),
        }
    }

    /// National Rating Agency list, keyed by "ИНН".
    pub fn nra(fetcher: Arc<dyn HttpFetch>, dir: &Path, today: NaiveDate) -> Self {
        let file = DailyFile::new(dir.join(NRA_FILE_NAME), NRA_URL).with_browser_user_agent();
        Self::new("NRA", file, "ИНН", "Рейтинг", fetcher, today)
    }

    /// NKR list, keyed by "TIN".
    pub fn nkr(fetcher: Arc<dyn HttpFetch>, dir: &Path, today: NaiveDate) -> Self {
        let file = DailyFile::new(dir.join(NKR_FILE_NAME), NKR_URL);
        Self::new("NKR", file, "TIN", "Rating", fetcher, today)
    }

    async fn load(&self) -> Result<RatingTable> {
        self.file
            .ensure_fresh(self.fetcher.as_ref(), self.today)
            .await?;
        let bytes = tokio::fs::read(self.file.path()).await?;
        let table = RatingTable::from_workbook(bytes, self.id_column, self.rating_column)?;
        info!("{} table loaded with {} rows", self.id, table.len());
        Ok(table)
    }
}

#[async_trait]
impl RatingSource for SpreadsheetSource {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn lookup(&self, tax_id: &str) -> Result<Rating> {
        let table = self.table.get_or_try_init(|| self.load()).await?;
        Ok(table.lookup(tax_id))
    }
}

impl std::fmt::Debug for SpreadsheetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpreadsheetSource")
            .field("id", &self.id)
            .field("file", &self.file)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StubFetcher;
    use crate::fetch::FetchResponse;
    use chrono::Duration;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(header: [&str; 3], rows: &[(f64, &str, &str)]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, title) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        for (i, (tax_id, name, rating)) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, *tax_id).unwrap();
            sheet.write_string(row, 1, *name).unwrap();
            sheet.write_string(row, 2, *rating).unwrap();
        }
        workbook.save_to_buffer().unwrap()
    }

    fn nra_rows() -> Vec<u8> {
        workbook_bytes(
            ["ИНН", "Эмитент", "Рейтинг"],
            &[
                (7707083893.0, "Сбербанк", "AAA|ru|"),
                (7736050003.0, "Газпром", "AA+|ru|"),
                (7707083893.0, "Сбербанк (дубль)", "BBB|ru|"),
            ],
        )
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_table_first_match_wins() {
        let table = RatingTable::from_rows(
            rows(&[&["TIN", "Rating"], &["1", "A.ru"], &["1", "B.ru"], &["2", ""]]),
            "TIN",
            "Rating",
        );
        assert_eq!(table.lookup("1"), Rating::Grade("A.ru".to_string()));
        assert_eq!(table.lookup("2"), Rating::NotRated);
        assert_eq!(table.lookup("3"), Rating::NotRated);
    }

    #[test]
    fn test_table_missing_column_is_empty() {
        let table = RatingTable::from_rows(rows(&[&["TIN", "Grade"], &["1", "A.ru"]]), "TIN", "Rating");
        assert!(table.is_empty());
        assert_eq!(table.lookup("1"), Rating::NotRated);
    }

    #[test]
    fn test_table_from_workbook_reads_numeric_ids() {
        let table = RatingTable::from_workbook(nra_rows(), "ИНН", "Рейтинг").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("7736050003"), Rating::Grade("AA+|ru|".to_string()));
        assert_eq!(table.lookup("7707083893"), Rating::Grade("AAA|ru|".to_string()));
    }

    #[tokio::test]
    async fn test_fresh_file_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(NRA_FILE_NAME), nra_rows()).unwrap();
        let fetcher = Arc::new(StubFetcher::new());

        let source = SpreadsheetSource::nra(fetcher.clone(), dir.path(), today());
        let rating = source.lookup("7736050003").await.unwrap();

        assert_eq!(rating, Rating::Grade("AA+|ru|".to_string()));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_file_is_downloaded_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(NKR_FILE_NAME), b"stale").unwrap();
        let payload = workbook_bytes(["TIN", "Name", "Rating"], &[(7702070139.0, "ВТБ", "AA(RU)")]);
        let fetcher = Arc::new(StubFetcher::new().with(NKR_URL, FetchResponse::ok(payload)));

        let tomorrow = today() + Duration::days(1);
        let source = SpreadsheetSource::nkr(fetcher.clone(), dir.path(), tomorrow);

        assert_eq!(
            source.lookup("7702070139").await.unwrap(),
            Rating::Grade("AA(RU)".to_string())
        );
        assert_eq!(source.lookup("0000000000").await.unwrap(), Rating::NotRated);
        assert_eq!(fetcher.calls(), vec![NKR_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_is_downloaded_with_user_agent() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(StubFetcher::new().with(NRA_URL, FetchResponse::ok(nra_rows())));

        let source = SpreadsheetSource::nra(fetcher.clone(), dir.path(), today());
        source.lookup("7707083893").await.unwrap();

        assert!(dir.path().join(NRA_FILE_NAME).exists());
        assert_eq!(fetcher.call_count(), 1);
        assert!(fetcher.headers()[0].iter().any(|(k, _)| k == "User-Agent"));
    }

    #[tokio::test]
    async fn test_failed_download_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(StubFetcher::new().with(
            NKR_URL,
            FetchResponse::with_status(500, Vec::new()),
        ));
        let source = SpreadsheetSource::nkr(fetcher, dir.path(), today());
        let err = source.lookup("1").await.unwrap_err();
        assert!(matches!(err, RatingError::Status { status: 500, .. }));
    }
}
