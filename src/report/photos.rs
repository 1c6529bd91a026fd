//! Bulk download of the pictures of a photo column into a zip archive.
//!
//! Each picture is fetched once, one after the other. A picture that cannot be
//! fetched is left out of the archive: the archive is still produced, even if
//! it ends up empty.

use std::io::{Cursor, Write};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::report::*;

pub const ZIP_MIME: &str = "application/zip";

const MAX_SLUG_LEN: usize = 40;

/// The outcome of one download.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum FetchOutcome {
    Fetched(Vec<u8>),
    Failed(String),
}

/// Something that can retrieve the content behind a URL.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Fetches over HTTP, with a fixed timeout per request.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> ReportResult<HttpFetcher> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context(HttpClientSnafu {})?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send() {
            Ok(r) => r,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };
        if !response.status().is_success() {
            return FetchOutcome::Failed(format!("status {}", response.status()));
        }
        match response.bytes() {
            Ok(b) => FetchOutcome::Fetched(b.to_vec()),
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhotoArchive {
    /// `{slug}_photos.zip`
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub stored: usize,
    /// The rows that were not archived, with the reason.
    pub skipped: Vec<(usize, String)>,
}

/// A file name friendly version of a column name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug: String = slug
        .trim_matches('_')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect();
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        "photos".to_string()
    } else {
        slug.to_string()
    }
}

/// The file extension of the last segment of the URL path, if it looks like one.
pub fn url_extension(url: &str) -> Result<String, String> {
    let parsed = Url::parse(url).map_err(|e| format!("malformed URL: {}", e))?;
    let last = parsed
        .path_segments()
        .and_then(|mut s| s.next_back())
        .unwrap_or("");
    match last.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            Ok(ext.to_ascii_lowercase())
        }
        _ => Err(format!("no file extension in {:?}", last)),
    }
}

/// Downloads the pictures of a column and packs them into a zip archive.
///
/// The entries are named `{slug}/{row}.{ext}`, where `row` is the index of the
/// respondent in the survey.
pub fn build_photo_archive(
    column: &str,
    values: &[Option<String>],
    fetcher: &dyn Fetcher,
) -> ReportResult<PhotoArchive> {
    let slug = slugify(column);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut stored: usize = 0;
    let mut skipped: Vec<(usize, String)> = Vec::new();

    for (row, v) in values.iter().enumerate() {
        let url = match v {
            Some(u) => u.trim(),
            None => continue,
        };
        let ext = match url_extension(url) {
            Ok(ext) => ext,
            Err(reason) => {
                skipped.push((row, reason));
                continue;
            }
        };
        debug!("build_photo_archive: row {} fetching {:?}", row, url);
        match fetcher.fetch(url) {
            FetchOutcome::Fetched(bytes) => {
                zip.start_file(format!("{}/{}.{}", slug, row, ext), options)
                    .context(WritingZipSnafu {})?;
                zip.write_all(&bytes).context(WritingFileSnafu {
                    path: format!("{}_photos.zip", slug),
                })?;
                stored += 1;
            }
            FetchOutcome::Failed(reason) => skipped.push((row, reason)),
        }
    }

    let bytes = zip.finish().context(WritingZipSnafu {})?.into_inner();
    Ok(PhotoArchive {
        file_name: format!("{}_photos.zip", slug),
        bytes,
        stored,
        skipped,
    })
}
