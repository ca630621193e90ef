use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::schema::{schema_for, ColumnKind, Position, TOTAL_COLUMNS};
use crate::store;

static NON_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9]").unwrap());

/// First-seen-order categorical encoder. Codes are contiguous from 0 and
/// regenerated each run; row order determines the assignment.
pub struct Factorizer {
    values: Vec<String>,
}

impl Factorizer {
    pub fn new() -> Factorizer {
        Factorizer { values: Vec::new() }
    }

    pub fn encode(&mut self, value: &str) -> usize {
        match self.values.iter().position(|v| v == value) {
            Some(code) => code,
            None => {
                self.values.push(value.to_string());
                self.values.len() - 1
            }
        }
    }

    /// Values indexed by code, for the persisted lookup table.
    pub fn into_values(self) -> Vec<String> {
        self.values
    }
}

impl Default for Factorizer {
    fn default() -> Self {
        Factorizer::new()
    }
}

/// A normalized table plus the code tables produced while factorizing.
#[derive(Debug)]
pub struct Cleaned {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// (column name, values-by-code) for each factorized column.
    pub code_tables: Vec<(String, Vec<String>)>,
}

/// Normalize a raw scraped table into model-ready columns.
///
/// The input must carry exactly the expected column count; anything else
/// means it came from an incompatible schema version. Literal `-` cells
/// become missing before any column rule runs, then each column is coerced
/// by its schema kind: position → integer rank, draft → round.pick float,
/// categoricals → "0"-filled (and factorized when enabled), text → "None",
/// numerics → float with -1 for missing.
pub fn normalize(
    position: Position,
    headers: &[String],
    rows: &[Vec<String>],
    factorize: bool,
) -> Result<Cleaned> {
    if headers.len() != TOTAL_COLUMNS {
        return Err(PipelineError::SchemaMismatch {
            context: "preprocess input table".to_string(),
            expected: TOTAL_COLUMNS,
            got: headers.len(),
        });
    }

    let schema = schema_for(position);
    let columns = schema.columns();
    let mut out_rows: Vec<Vec<String>> = vec![Vec::with_capacity(TOTAL_COLUMNS); rows.len()];
    let mut code_tables = Vec::new();

    for (col_idx, column) in columns.iter().enumerate() {
        // The site uses "-" for not-applicable; treat it as missing
        // everywhere before any column-specific rule.
        let cells: Vec<Option<&str>> = rows
            .iter()
            .map(|row| {
                let cell = row[col_idx].trim();
                if cell.is_empty() || cell == "-" {
                    None
                } else {
                    Some(cell)
                }
            })
            .collect();

        let converted: Vec<String> = match (column.name, column.kind) {
            ("position", _) => cells.iter().map(|c| positional_rank(*c).to_string()).collect(),
            ("draft", _) => cells.iter().map(|c| normalize_draft(*c).to_string()).collect(),
            (_, ColumnKind::Category) => {
                let filled: Vec<&str> = cells.iter().map(|c| c.unwrap_or("0")).collect();
                if factorize {
                    let mut factorizer = Factorizer::new();
                    let coded = filled
                        .iter()
                        .map(|v| factorizer.encode(v).to_string())
                        .collect();
                    code_tables.push((column.name.to_string(), factorizer.into_values()));
                    coded
                } else {
                    filled.iter().map(|v| v.to_string()).collect()
                }
            }
            (_, ColumnKind::Text) => cells
                .iter()
                .map(|c| c.unwrap_or("None").to_string())
                .collect(),
            (_, ColumnKind::Integer) | (_, ColumnKind::Float) => cells
                .iter()
                .map(|c| {
                    c.and_then(|v| v.parse::<f64>().ok())
                        .unwrap_or(-1.0)
                        .to_string()
                })
                .collect(),
        };

        for (row_idx, cell) in converted.into_iter().enumerate() {
            out_rows[row_idx].push(cell);
        }
    }

    Ok(Cleaned {
        columns: headers.to_vec(),
        rows: out_rows,
        code_tables,
    })
}

/// Positional rank: the source stores position as a compound string like
/// "RB12"; only the numeric rank is kept. Missing → 0.
fn positional_rank(cell: Option<&str>) -> i64 {
    let Some(raw) = cell else { return 0 };
    let digits = NON_DIGIT_RE.replace_all(raw, "");
    digits.parse().unwrap_or(0)
}

/// Draft normalization: "undrafted" and missing become 0; a value that
/// parses as a whole number is ambiguous (a bare draft year rather than a
/// round.pick encoding) and is zeroed; a round.pick value like 1.02 is
/// kept. Unparseable leftovers also resolve to 0.
fn normalize_draft(cell: Option<&str>) -> f64 {
    let Some(raw) = cell else { return 0.0 };
    let lowered = raw.to_lowercase();
    if lowered == "undrafted" {
        return 0.0;
    }
    match lowered.parse::<f64>() {
        Ok(x) if x.fract() == 0.0 => 0.0,
        Ok(x) => x,
        Err(_) => 0.0,
    }
}

/// Load the latest raw table for a position, normalize it, and persist the
/// cleaned CSV plus any code tables.
pub fn run(position: Position, factorize: bool) -> Result<()> {
    let raw_path = store::latest_raw_stats(position)?;
    info!("preprocessing {}", raw_path.display());
    let (headers, rows) = store::load_raw_csv(&raw_path)?;

    let cleaned = normalize(position, &headers, &rows, factorize)?;
    store::save_preprocessed(position, &cleaned.columns, &cleaned.rows)?;
    for (column, values) in &cleaned.code_tables {
        store::save_code_table(position, column, values)?;
    }
    info!(
        "preprocessed {} rows for {} ({} code tables)",
        cleaned.rows.len(),
        position,
        cleaned.code_tables.len()
    );
    Ok(())
}

// ── Tests ──
