pub mod cards;
pub mod convert;

use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::fetch::PageFetcher;
use crate::schema::AttributeSchema;
use crate::store::RawTable;
use convert::Value;

/// One player's scraped values, pre-seeded with Missing for every schema
/// column and filled card by card. Built fresh per player; never shared.
pub struct RawRecord {
    schema: AttributeSchema,
    values: Vec<Value>,
}

impl RawRecord {
    pub fn new(schema: AttributeSchema) -> RawRecord {
        RawRecord {
            schema,
            values: vec![Value::Missing; schema.column_count()],
        }
    }

    /// Write one card's extracted values into the record. The value count
    /// must exactly match the group's column count; a mismatch means the
    /// page layout changed under the static schema and aborts the run.
    pub fn write_group(&mut self, group_idx: usize, values: Vec<Value>) -> Result<()> {
        let group = &self.schema.groups[group_idx];
        if values.len() != group.columns.len() {
            return Err(PipelineError::SchemaMismatch {
                context: format!("{:?} card", group.card),
                expected: group.columns.len(),
                got: values.len(),
            });
        }
        let offset: usize = self.schema.groups[..group_idx]
            .iter()
            .map(|g| g.columns.len())
            .sum();
        for (i, value) in values.into_iter().enumerate() {
            self.values[offset + i] = value;
        }
        Ok(())
    }

    pub fn into_row(self) -> Vec<Value> {
        self.values
    }
}

/// Parse one profile page into a table row.
pub fn extract_profile(schema: AttributeSchema, html: &str) -> Result<Vec<Value>> {
    let doc = Html::parse_document(html);
    let mut record = RawRecord::new(schema);
    for (group_idx, values) in cards::extract_cards(&doc).into_iter().enumerate() {
        record.write_group(group_idx, values)?;
    }
    Ok(record.into_row())
}

/// Scrape every profile link sequentially into a RawTable.
///
/// A failed fetch logs a warning and skips that player so one bad page
/// cannot lose the batch; a schema mismatch propagates and aborts.
pub async fn scrape_profiles(
    fetcher: &PageFetcher,
    schema: AttributeSchema,
    links: &[String],
) -> Result<RawTable> {
    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
            .expect("valid template")
            .progress_chars("=> "),
    );

    let mut rows = Vec::with_capacity(links.len());
    let mut skipped = 0usize;

    for link in links {
        match fetcher.fetch_html(link).await {
            Ok(html) => rows.push(extract_profile(schema, &html)?),
            Err(e) => {
                warn!("skipping {}: {}", link, e);
                skipped += 1;
            }
        }
        pb.inc(1);
        fetcher.pace().await;
    }

    pb.finish_and_clear();
    info!(
        "extracted {} players for {} ({} skipped)",
        rows.len(),
        schema.position,
        skipped
    );

    Ok(RawTable {
        columns: schema.column_names().iter().map(|c| c.to_string()).collect(),
        rows,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{schema_for, Position, TOTAL_COLUMNS};

    #[test]
    fn record_starts_fully_missing() {
        let record = RawRecord::new(schema_for(Position::RunningBack));
        let row = record.into_row();
        assert_eq!(row.len(), TOTAL_COLUMNS);
        assert!(row.iter().all(|v| v.is_missing()));
    }

    #[test]
    fn write_group_places_values_at_group_offset() {
        let schema = schema_for(Position::RunningBack);
        let mut record = RawRecord::new(schema);
        record
            .write_group(1, vec![
                Value::Float(182.9),
                Value::Int(233),
                Value::text("1.02"),
                Value::text("Penn State"),
                Value::Int(27),
            ])
            .unwrap();
        let row = record.into_row();
        // Identity group (3 columns) untouched, biometrics filled.
        assert!(row[..3].iter().all(|v| v.is_missing()));
        assert_eq!(row[3], Value::Float(182.9));
        assert_eq!(row[7], Value::Int(27));
        assert!(row[8].is_missing());
    }

    #[test]
    fn short_group_is_schema_mismatch() {
        let schema = schema_for(Position::Quarterback);
        let mut record = RawRecord::new(schema);
        let err = record
            .write_group(0, vec![Value::text("a"), Value::text("b")])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SchemaMismatch { expected: 3, got: 2, .. }
        ));
    }

    #[test]
    fn full_profile_extracts_25_cells() {
        let html = std::fs::read_to_string("tests/fixtures/profile.html").unwrap();
        let row = extract_profile(schema_for(Position::RunningBack), &html).unwrap();
        assert_eq!(row.len(), TOTAL_COLUMNS);
        assert_eq!(row[0], Value::text("Saquon Barkley"));
        assert_eq!(row[1], Value::text("RB1"));
        // Season stats land in the last eight cells.
        assert_eq!(row[17], Value::Int(16));
        assert_eq!(row[24], Value::Float(22.2));
    }

    #[test]
    fn empty_page_extracts_all_missing() {
        let row = extract_profile(schema_for(Position::TightEnd), "<html></html>").unwrap();
        assert_eq!(row.len(), TOTAL_COLUMNS);
        assert!(row.iter().all(|v| v.is_missing()));
    }
}
