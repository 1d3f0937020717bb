//! crates/rural_ed_core/src/catalog.rs
//!
//! Loading, filtering and sampling of the resource catalog.
//!
//! The input is a CSV table with the columns `title`, `size_kb`, `language`,
//! `url` and `tags`, plus an optional `id`. Bad rows are skipped and reported;
//! only file-level problems are fatal.

use csv::{ReaderBuilder, StringRecord, Trim};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::{Language, Resource};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("Catalog is missing the required column '{0}'")]
    MissingColumn(String),
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// The accepted resources plus every row that was skipped.
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub resources: Vec<Resource>,
    pub skipped: Vec<CatalogError>,
}

struct Columns {
    id: Option<usize>,
    title: usize,
    size_kb: usize,
    language: Option<usize>,
    url: Option<usize>,
    tags: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, CatalogError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required =
            |name: &str| find(name).ok_or_else(|| CatalogError::MissingColumn(name.to_string()));

        Ok(Self {
            id: find("id"),
            title: required("title")?,
            size_kb: required("size_kb")?,
            language: find("language"),
            url: find("url"),
            tags: find("tags"),
        })
    }
}

/// Loads the catalog from a CSV file. A missing or unreadable file is fatal.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<CatalogLoad, CatalogError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    load(file)
}

/// Loads the catalog from any CSV source.
pub fn load<R: Read>(source: R) -> Result<CatalogLoad, CatalogError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut load = CatalogLoad::default();
    for (index, record) in reader.records().enumerate() {
        // Header is line 1.
        let fallback_line = index as u64 + 2;
        let parsed = record
            .map_err(|e| CatalogError::MalformedRow {
                line: e.position().map(|p| p.line()).unwrap_or(fallback_line),
                reason: e.to_string(),
            })
            .and_then(|record| {
                let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);
                parse_row(&record, &columns, line)
            });

        match parsed {
            Ok(resource) => load.resources.push(resource),
            Err(e) => {
                warn!("Skipping catalog row: {}", e);
                load.skipped.push(e);
            }
        }
    }

    info!(
        "Loaded {} resources ({} rows skipped)",
        load.resources.len(),
        load.skipped.len()
    );
    Ok(load)
}

fn parse_row(record: &StringRecord, columns: &Columns, line: u64) -> Result<Resource, CatalogError> {
    let cell = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or("").trim();
    let malformed = |reason: String| CatalogError::MalformedRow { line, reason };

    let title = cell(Some(columns.title));
    if title.is_empty() {
        return Err(malformed("missing title".to_string()));
    }

    let raw_size = cell(Some(columns.size_kb));
    if raw_size.is_empty() {
        return Err(malformed("missing size_kb".to_string()));
    }
    let size_kb = parse_size_kb(raw_size)
        .ok_or_else(|| malformed(format!("non-numeric size_kb '{}'", raw_size)))?;

    let id = match cell(columns.id) {
        "" => format!("r{}", line),
        id => id.to_string(),
    };

    let language = match cell(columns.language) {
        "" => Language::detect(title),
        code => Language::from(code),
    };

    Ok(Resource {
        id,
        title: title.to_string(),
        size_kb,
        language,
        tags: parse_tags(cell(columns.tags)),
        url: cell(columns.url).to_string(),
        summary: None,
    })
}

/// Accepts integer or fractional sizes; fractions round up to the next KB.
fn parse_size_kb(raw: &str) -> Option<u64> {
    if let Ok(size) = raw.parse::<u64>() {
        return Some(size);
    }
    let size = raw.parse::<f64>().ok()?;
    if size.is_finite() && size >= 0.0 {
        Some(size.ceil() as u64)
    } else {
        None
    }
}

pub fn parse_tags(raw: &str) -> BTreeSet<String> {
    raw.split(|c| c == ';' || c == '|' || c == ',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Keeps resources within the size limit, in the requested language (`None` = any)
/// and sharing at least one requested topic (an empty topic set disables that check).
pub fn filter(
    resources: &[Resource],
    max_size_kb: u64,
    language: Option<&Language>,
    topics: &BTreeSet<String>,
) -> Vec<Resource> {
    resources
        .iter()
        .filter(|r| r.size_kb <= max_size_kb)
        .filter(|r| language.map_or(true, |lang| &r.language == lang))
        .filter(|r| topics.is_empty() || r.has_any_topic(topics))
        .cloned()
        .collect()
}

/// A reproducible pseudo-random subset of `min(n, len)` resources.
pub fn sample(resources: &[Resource], n: usize, seed: u64) -> Vec<Resource> {
    let mut rng = StdRng::seed_from_u64(seed);
    resources
        .choose_multiple(&mut rng, n.min(resources.len()))
        .cloned()
        .collect()
}
