//! Tabular data loading
//!
//! Sources are fetched through the [`Fetch`] trait and parsed with a
//! header-based, type-inferring CSV reader. Rows that are empty or carry no
//! non-blank value are dropped; malformed rows are logged and skipped.

use crate::error::{Error, Result};
use crate::record::{Record, Value};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// Raw response from a fetch
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Retrieves the text behind a source URL
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch a source. Transport failures are errors; HTTP statuses are
    /// reported in the response and judged by the caller.
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// Where a source actually lives once resolved
#[derive(Debug, Clone, PartialEq)]
enum Location {
    Remote(Url),
    Local(PathBuf),
}

/// Fetcher for `http(s)://` URLs, `file://` URLs and filesystem paths
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Option<Url>,
}

impl HttpFetcher {
    /// Create a new fetcher
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/csv, text/plain, */*"));
        headers.insert(USER_AGENT, HeaderValue::from_static("csv-charts"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base: None })
    }

    /// Resolve relative sources against `base`
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    /// Resolve relative sources against a local directory
    pub fn with_base_dir(self, dir: &Path) -> Result<Self> {
        let dir = std::fs::canonicalize(dir).map_err(|e| Error::FileReadError {
            path: dir.display().to_string(),
            source: e,
        })?;
        let base = Url::from_directory_path(&dir).map_err(|_| {
            Error::InvalidConfig(format!("Cannot use {} as a base directory", dir.display()))
        })?;
        Ok(self.with_base(base))
    }

    /// Parse a base given as either a URL or a directory path
    pub fn with_base_str(self, base: &str) -> Result<Self> {
        match Url::parse(base) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" || url.scheme() == "file" => {
                Ok(self.with_base(url))
            }
            _ => self.with_base_dir(Path::new(base)),
        }
    }

    fn resolve(&self, source: &str) -> Result<Location> {
        match Url::parse(source) {
            Ok(url) => location_of(url, source),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base {
                Some(base) => location_of(base.join(source)?, source),
                None => Ok(Location::Local(PathBuf::from(source))),
            },
            Err(e) => Err(e.into()),
        }
    }
}

fn location_of(url: Url, source: &str) -> Result<Location> {
    match url.scheme() {
        "http" | "https" => Ok(Location::Remote(url)),
        "file" => url
            .to_file_path()
            .map(Location::Local)
            .map_err(|_| Error::source_unavailable(source, None, "invalid file URL")),
        // Windows drive letters parse as a one-letter scheme
        scheme if scheme.len() == 1 => Ok(Location::Local(PathBuf::from(source))),
        scheme => Err(Error::source_unavailable(
            source,
            None,
            format!("unsupported scheme '{}'", scheme),
        )),
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        match self.resolve(url)? {
            Location::Remote(remote) => {
                debug!("Fetching {}", remote);
                let response = self
                    .client
                    .get(remote)
                    .send()
                    .await
                    .map_err(|e| Error::source_unavailable(url, None, e.to_string()))?;
                let status = response.status().as_u16();
                let body = response
                    .text()
                    .await
                    .map_err(|e| Error::source_unavailable(url, Some(status), e.to_string()))?;
                Ok(FetchResponse { status, body })
            }
            Location::Local(path) => {
                debug!("Reading {}", path.display());
                match tokio::fs::read_to_string(&path).await {
                    Ok(body) => Ok(FetchResponse::ok(body)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse {
                        status: 404,
                        body: String::new(),
                    }),
                    Err(e) => Err(Error::source_unavailable(url, None, e.to_string())),
                }
            }
        }
    }
}

/// Loads and parses tabular sources
pub struct SourceLoader<F> {
    fetcher: F,
}

impl<F: Fetch> SourceLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch `url` and parse it into records
    pub async fn load(&self, url: &str) -> Result<Vec<Record>> {
        if url.trim().is_empty() {
            return Err(Error::source_unavailable(url, None, "no source URL configured"));
        }

        let response = self.fetcher.fetch(url).await?;
        if !response.is_success() {
            return Err(Error::source_unavailable(
                url,
                Some(response.status),
                "fetch did not succeed",
            ));
        }

        let records = parse_records(&response.body)?;
        debug!("Loaded {} records from {}", records.len(), url);
        Ok(records)
    }
}

/// Parse delimited text with a header row into records.
///
/// Numeric-looking cells become numbers. Short rows get `Absent` for the
/// missing columns, extra fields are ignored. Only an unreadable header is an
/// error; row-level problems are logged as warnings.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping malformed row {}: {}", index + 1, e);
                continue;
            }
        };

        if row.len() != headers.len() {
            warn!(
                "Row {} has {} fields, expected {}",
                index + 1,
                row.len(),
                headers.len()
            );
        }

        let mut record = Record::new();
        for (i, column) in headers.iter().enumerate() {
            let value = row.get(i).map(Value::infer).unwrap_or(Value::Absent);
            record.insert(column.clone(), value);
        }

        if record.is_blank() {
            continue;
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct StaticFetcher {
        responses: HashMap<String, FetchResponse>,
    }

    #[async_trait]
    impl Fetch for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchResponse> {
            Ok(self.responses.get(url).cloned().unwrap_or(FetchResponse {
                status: 404,
                body: String::new(),
            }))
        }
    }

    fn loader(entries: &[(&str, FetchResponse)]) -> SourceLoader<StaticFetcher> {
        SourceLoader::new(StaticFetcher {
            responses: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        })
    }

    #[test]
    fn test_parse_records_infers_types() {
        let records = parse_records("TEAM,W,SEASON\nSixers,9,1972-73\nBulls,72,1995-96\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("TEAM"), &Value::Text("Sixers".to_string()));
        assert_eq!(records[0].get("W"), &Value::Number(9.0));
        assert_eq!(records[1].get("SEASON"), &Value::Text("1995-96".to_string()));
    }

    #[test]
    fn test_parse_records_drops_blank_rows() {
        let records = parse_records("A,B\n1,2\n\n,\n  ,  \n3,4\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("A"), &Value::Number(3.0));
    }

    #[test]
    fn test_parse_records_short_rows_get_absent() {
        let records = parse_records("A,B,C\n1,2\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("C"), &Value::Absent);
        assert_eq!(records[0].get("B"), &Value::Number(2.0));
    }

    #[test]
    fn test_parse_records_keeps_empty_text() {
        let records = parse_records("A,B\nx,\n").unwrap();
        assert_eq!(records[0].get("B"), &Value::Text(String::new()));
    }

    #[test]
    fn test_parse_records_strips_bom_and_trims_headers() {
        let records = parse_records("\u{feff} A , B \n1,2\n").unwrap();
        assert_eq!(records[0].columns().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn test_parse_records_empty_input() {
        assert!(parse_records("").unwrap().is_empty());
        assert!(parse_records("A,B\n").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_success() {
        let loader = loader(&[("data.csv", FetchResponse::ok("A\n1\n2\n"))]);
        let records = loader.load("data.csv").await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_load_blank_url_is_unavailable() {
        let loader = loader(&[]);
        let err = loader.load("  ").await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { status: None, .. }));
    }

    #[tokio::test]
    async fn test_load_non_success_status_carries_url_and_status() {
        let loader = loader(&[(
            "https://example.com/missing.csv",
            FetchResponse {
                status: 503,
                body: "unavailable".to_string(),
            },
        )]);

        match loader.load("https://example.com/missing.csv").await {
            Err(Error::SourceUnavailable { url, status, .. }) => {
                assert_eq!(url, "https://example.com/missing.csv");
                assert_eq!(status, Some(503));
            }
            other => panic!("expected SourceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_http_fetcher_reads_relative_file_against_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("teams.csv"), "TEAM,W\nSixers,9\n").unwrap();

        let fetcher = HttpFetcher::new().unwrap().with_base_dir(dir.path()).unwrap();
        let loader = SourceLoader::new(fetcher);
        let records = loader.load("teams.csv").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("W"), &Value::Number(9.0));
    }

    #[tokio::test]
    async fn test_http_fetcher_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new().unwrap().with_base_dir(dir.path()).unwrap();
        let err = SourceLoader::new(fetcher).load("nope.csv").await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { status: Some(404), .. }));
    }

    #[test]
    fn test_resolve_against_remote_base() {
        let fetcher = HttpFetcher::new()
            .unwrap()
            .with_base(Url::parse("https://example.com/data/").unwrap());
        assert_eq!(
            fetcher.resolve("teams.csv").unwrap(),
            Location::Remote(Url::parse("https://example.com/data/teams.csv").unwrap())
        );
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let fetcher = HttpFetcher::new().unwrap();
        assert!(matches!(
            fetcher.resolve("ftp://example.com/a.csv"),
            Err(Error::SourceUnavailable { .. })
        ));
    }
}
