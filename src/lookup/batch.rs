//! CSV batch resolution.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use geo::Coord;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use gridfinder::models::checked_position;
use gridfinder::{AssignmentResolver, AssignmentResult, LayerSet};

/// One input row: `lon,lat[,label]`
#[derive(Debug, Clone)]
pub struct QueryRow {
    pub line: usize,
    pub label: Option<String>,
    pub point: Coord<f64>,
}

#[derive(Serialize)]
pub struct ResolvedRow<'a> {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'a str>,
    pub lon: f64,
    pub lat: f64,
    pub assignment: AssignmentResult,
}

/// Read query rows. A first row that does not parse as coordinates is
/// taken as a header; later bad rows are skipped with a warning.
pub fn read_rows(path: &Path) -> Result<Vec<QueryRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 1;

        let parsed = match (record.get(0), record.get(1)) {
            (Some(lon), Some(lat)) => lon
                .parse::<f64>()
                .ok()
                .zip(lat.parse::<f64>().ok())
                .map(|(lon, lat)| checked_position(lon, lat)),
            _ => None,
        };

        match parsed {
            Some(Ok(point)) => rows.push(QueryRow {
                line,
                label: record.get(2).filter(|l| !l.is_empty()).map(str::to_string),
                point,
            }),
            Some(Err(e)) => warn!("Skipping line {}: {}", line, e),
            None if line == 1 => info!("Treating first line as header"),
            None => warn!("Skipping line {}: expected lon,lat[,label]", line),
        }
    }
    Ok(rows)
}

/// Resolve every row in parallel and write JSON lines in input order
pub fn run<W: Write>(
    rows: &[QueryRow],
    resolver: &AssignmentResolver,
    layers: &LayerSet,
    out: &mut W,
) -> Result<()> {
    info!("Resolving {} points", rows.len());

    let pb = ProgressBar::new(rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let resolved: Vec<ResolvedRow<'_>> = rows
        .par_iter()
        .map(|row| {
            let assignment = resolver.resolve(row.point, layers);
            pb.inc(1);
            ResolvedRow {
                line: row.line,
                label: row.label.as_deref(),
                lon: row.point.x,
                lat: row.point.y,
                assignment,
            }
        })
        .collect();
    pb.finish_and_clear();

    for row in &resolved {
        serde_json::to_writer(&mut *out, row)?;
        writeln!(out)?;
    }

    let oot = resolved
        .iter()
        .filter(|r| r.assignment.out_of_territory)
        .count();
    info!("Resolved {} points ({} out of territory)", resolved.len(), oot);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_rows_with_header_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.csv");
        fs::write(
            &path,
            "lon,lat,label\n-94.2,36.0,home\n-94.1, 36.1\nnot,a-point\n-200,36.0,bad\n",
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label.as_deref(), Some("home"));
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].label, None);
        assert_eq!(rows[1].point, Coord { x: -94.1, y: 36.1 });
    }

    #[test]
    fn test_run_writes_one_line_per_row() {
        let rows = vec![
            QueryRow {
                line: 1,
                label: Some("a".into()),
                point: Coord { x: -94.2, y: 36.0 },
            },
            QueryRow {
                line: 2,
                label: None,
                point: Coord { x: -94.1, y: 36.1 },
            },
        ];
        let mut out = Vec::new();
        run(&rows, &AssignmentResolver::default(), &LayerSet::default(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["label"], "a");
        assert_eq!(first["assignment"]["grid"]["code"], "OOT");
    }
}
