use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::extract::convert::Value;
use crate::schema::Position;

pub const SCRAPED_DIR: &str = "scraped_data";
pub const PREPROCESSED_DIR: &str = "preprocessed_data";
pub const DICTS_DIR: &str = "preprocessed_data/dicts";

const LINKS_HEADER: &str = "saved_links";

/// All raw records for one position, rows × schema columns. Materialized
/// only after the full extraction loop completes.
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

fn io_err(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn csv_err(path: &Path, source: csv::Error) -> PipelineError {
    PipelineError::Csv {
        path: path.display().to_string(),
        source,
    }
}

fn ensure_dir(dir: &str) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| io_err(Path::new(dir), e))
}

// ── Link list ──

pub fn link_list_path(position: Position) -> PathBuf {
    PathBuf::from(SCRAPED_DIR).join(format!("{}.csv", position.slug()))
}

/// Persist the discovered link list, overwriting any prior file for the
/// position. Single column, header `saved_links`.
pub fn save_links(position: Position, links: &[String]) -> Result<()> {
    ensure_dir(SCRAPED_DIR)?;
    let path = link_list_path(position);
    let mut writer = csv::Writer::from_path(&path).map_err(|e| csv_err(&path, e))?;
    writer
        .write_record([LINKS_HEADER])
        .map_err(|e| csv_err(&path, e))?;
    for link in links {
        writer.write_record([link]).map_err(|e| csv_err(&path, e))?;
    }
    writer.flush().map_err(|e| io_err(&path, e))?;
    info!("saved {} links to {}", links.len(), path.display());
    Ok(())
}

/// Load a previously saved link list.
pub fn load_links(position: Position) -> Result<Vec<String>> {
    let path = link_list_path(position);
    let mut reader = csv::Reader::from_path(&path).map_err(|e| csv_err(&path, e))?;
    let mut links = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_err(&path, e))?;
        if let Some(link) = record.get(0) {
            links.push(link.to_string());
        }
    }
    Ok(links)
}

// ── Raw stats table ──

pub fn raw_stats_path(position: Position) -> PathBuf {
    let date = Local::now().format("%d-%m-%Y");
    PathBuf::from(SCRAPED_DIR).join(format!("nfl_stats-{}-{}.csv", position.slug(), date))
}

/// Write the assembled raw table as a dated CSV. Missing cells serialize
/// as empty strings.
pub fn save_raw_table(position: Position, table: &RawTable) -> Result<PathBuf> {
    ensure_dir(SCRAPED_DIR)?;
    let path = raw_stats_path(position);
    let mut writer = csv::Writer::from_path(&path).map_err(|e| csv_err(&path, e))?;
    writer
        .write_record(&table.columns)
        .map_err(|e| csv_err(&path, e))?;
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writer.write_record(&cells).map_err(|e| csv_err(&path, e))?;
    }
    writer.flush().map_err(|e| io_err(&path, e))?;
    info!(
        "saved {} rows x {} columns to {}",
        table.rows.len(),
        table.columns.len(),
        path.display()
    );
    Ok(path)
}

/// Find the latest dated raw-stats file for a position (last by filename
/// sort, matching how the scrape stage names them).
pub fn latest_raw_stats(position: Position) -> Result<PathBuf> {
    let dir = Path::new(SCRAPED_DIR);
    let prefix = format!("nfl_stats-{}-", position.slug());
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".csv"))
        })
        .collect();
    matches.sort();
    matches.pop().ok_or_else(|| {
        io_err(
            dir,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no raw stats file for {}", position.slug()),
            ),
        )
    })
}

/// Load a raw-stats CSV as header + string cells. Cell typing happens in
/// the preprocessing stage, keyed by the schema's column kinds.
pub fn load_raw_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_err(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| csv_err(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_err(path, e))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok((headers, rows))
}

// ── Preprocessed outputs ──

pub fn preprocessed_path(position: Position) -> PathBuf {
    PathBuf::from(PREPROCESSED_DIR).join(format!("preprocessed_{}.csv", position.slug()))
}

pub fn dict_path(position: Position, column: &str) -> PathBuf {
    PathBuf::from(DICTS_DIR).join(format!("{}-{}.txt", position.slug(), column))
}

/// Write the cleaned table.
pub fn save_preprocessed(
    position: Position,
    columns: &[String],
    rows: &[Vec<String>],
) -> Result<PathBuf> {
    ensure_dir(PREPROCESSED_DIR)?;
    let path = preprocessed_path(position);
    let mut writer = csv::Writer::from_path(&path).map_err(|e| csv_err(&path, e))?;
    writer.write_record(columns).map_err(|e| csv_err(&path, e))?;
    for row in rows {
        writer.write_record(row).map_err(|e| csv_err(&path, e))?;
    }
    writer.flush().map_err(|e| io_err(&path, e))?;
    info!("saved preprocessed table to {}", path.display());
    Ok(path)
}

/// Persist one categorical column's code table as a JSON object mapping
/// integer code (string key) → original category value.
pub fn save_code_table(position: Position, column: &str, codes: &[String]) -> Result<PathBuf> {
    ensure_dir(DICTS_DIR)?;
    let path = dict_path(position, column);
    let map: serde_json::Map<String, serde_json::Value> = codes
        .iter()
        .enumerate()
        .map(|(code, value)| (code.to_string(), serde_json::Value::String(value.clone())))
        .collect();
    let json = serde_json::to_string_pretty(&serde_json::Value::Object(map))
        .expect("string map serializes");
    fs::write(&path, json).map_err(|e| io_err(&path, e))?;
    info!("saved code table for {} to {}", column, path.display());
    Ok(path)
}

// ── Tests ──
