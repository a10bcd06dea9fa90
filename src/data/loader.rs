use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Dataset, Institution};
use super::schema::{columns, LoadError, MissingColumn};

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Header indices after canonical-name probing. Built once per load; row
/// parsing only ever goes through these, never through raw header strings.
#[derive(Debug)]
struct ResolvedColumns {
    name: usize,
    level: usize,
    founder_type: usize,
    region: usize,
    subregion: usize,
    student_count: usize,
    class_count: usize,
    status: Option<usize>,
    year: Option<usize>,
}

fn probe(headers: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|cand| headers.iter().position(|h| h == cand))
}

fn resolve_columns(headers: &[String]) -> Result<ResolvedColumns, LoadError> {
    let mut missing: Vec<MissingColumn> = Vec::new();
    let mut require = |field: &'static str, candidates: &'static [&'static str]| {
        let idx = probe(headers, candidates);
        if idx.is_none() {
            missing.push(MissingColumn { field, candidates });
        }
        idx.unwrap_or(0)
    };

    let resolved = ResolvedColumns {
        name: require("name", columns::NAME),
        level: require("level", columns::LEVEL),
        founder_type: require("founder_type", columns::FOUNDER_TYPE),
        region: require("region", columns::REGION),
        subregion: require("subregion", columns::SUBREGION),
        student_count: require("student_count", columns::STUDENT_COUNT),
        class_count: require("class_count", columns::CLASS_COUNT),
        status: probe(headers, columns::STATUS),
        year: probe(headers, columns::YEAR),
    };

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

fn non_empty(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Lenient count coercion: trims, drops thousands separators, accepts
/// integer-valued floats ("120.0"). Anything else becomes `None`, never an
/// error.
fn parse_count(cell: &str) -> Option<u32> {
    let cleaned: String = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(n) = cleaned.parse::<u32>() {
        return Some(n);
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Some(f as u32),
        _ => None,
    }
}

fn parse_year(cell: &str) -> Option<i32> {
    cell.trim().parse::<i32>().ok()
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Load an institution dataset from a CSV file.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let dataset = load_csv_reader(file)
        .with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "loaded {} institutions from {} (status column: {}, year column: {})",
        dataset.len(),
        path.display(),
        dataset.has_status,
        dataset.has_year,
    );
    Ok(dataset)
}

/// Load from any reader. Header row is probed against the candidate
/// spellings in [`columns`]; every missing required column is reported in
/// one [`LoadError::MissingColumns`].
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let cols = resolve_columns(&headers)?;

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        rows.push(Institution {
            name: non_empty(cell(cols.name)),
            level: non_empty(cell(cols.level)),
            founder_type: non_empty(cell(cols.founder_type)),
            region: non_empty(cell(cols.region)),
            subregion: non_empty(cell(cols.subregion)),
            student_count: parse_count(cell(cols.student_count)),
            class_count: parse_count(cell(cols.class_count)),
            status: cols.status.and_then(|i| non_empty(cell(i))),
            year: cols.year.and_then(|i| parse_year(cell(i))),
        });
    }

    Ok(Dataset {
        rows,
        has_status: cols.status.is_some(),
        has_year: cols.year.is_some(),
    })
}
