//! The single-pass pipeline: fetch → normalize → merge → statistic → render.

use std::io::Write;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::fetch::{CsvSource, HttpClient, download_or_reuse, fetch_json};
use crate::merge::{MergedRow, integrity_by_code, merge_indexes, obesity_by_code};
use crate::output::{CorrelationReport, print_json, write_merged_csv, write_report};
use crate::parser::{IntegrityRow, ObesityRow, load_obesity_csv, parse_integrity_json};
use crate::render::{MapSink, composite_map, integrity_map, obesity_map};
use crate::stats::{Correlation, correlate_merged};

/// Both source tables after normalization.
#[derive(Debug)]
pub struct Sources {
    pub obesity: Vec<ObesityRow>,
    pub integrity: Vec<IntegrityRow>,
    pub csv_source: CsvSource,
}

/// What a run produced.
#[derive(Debug)]
pub struct Outcome {
    pub merged: Vec<MergedRow>,
    /// `None` when the merge was empty and the statistic was skipped.
    pub correlation: Option<Correlation>,
    pub maps_rendered: usize,
}

/// Downloads the CSV (falling back to a saved copy) and the JSON, then normalizes both.
#[tracing::instrument(skip_all)]
pub async fn load_sources<C: HttpClient>(client: &C, config: &PipelineConfig) -> Result<Sources> {
    let csv_source = download_or_reuse(client, &config.obesity_url, &config.csv_path).await?;
    let obesity = load_obesity_csv(&config.csv_path)?;
    info!(rows = obesity.len(), source = ?csv_source, "Obesity data loaded");

    let doc = fetch_json(client, &config.integrity_url).await?;
    let integrity = parse_integrity_json(&doc)?;
    info!(rows = integrity.len(), "Integrity data loaded");

    Ok(Sources {
        obesity,
        integrity,
        csv_source,
    })
}

/// Merges, reports the correlation to `out` and renders the maps into `sink`.
///
/// An empty merge prints a diagnostic, skips the statistic and the composite
/// map, and still renders both raw maps. A degenerate sample is an error.
#[tracing::instrument(skip_all)]
pub fn analyze<S: MapSink, W: Write>(
    obesity: &[ObesityRow],
    integrity: &[IntegrityRow],
    config: &PipelineConfig,
    sink: &mut S,
    out: &mut W,
) -> Result<Outcome> {
    let obesity = obesity_by_code(obesity);
    let integrity = integrity_by_code(integrity);
    let merged = merge_indexes(&obesity, &integrity);
    info!(states = merged.len(), "Merged dataset ready");

    if let Some(path) = &config.merged_output {
        write_merged_csv(path, &merged)?;
    }

    let correlation = if merged.is_empty() {
        let e = PipelineError::EmptyMerge;
        warn!(error = %e, "Skipping correlation");
        writeln!(out, "No overlapping states between the two datasets; skipping correlation.")?;
        None
    } else {
        let correlation = correlate_merged(&merged)?;
        info!(%correlation, "Correlation computed");
        write_report(out, &correlation, config.significance_level)?;
        print_json(&CorrelationReport::new(&correlation, config.significance_level))?;
        Some(correlation)
    };

    let mut maps = vec![obesity_map(&obesity), integrity_map(&integrity)];
    if !merged.is_empty() {
        maps.push(composite_map(&merged));
    }
    for map in &maps {
        sink.render(map)?;
    }

    Ok(Outcome {
        merged,
        correlation,
        maps_rendered: maps.len(),
    })
}

/// Full run against live sources.
pub async fn run<C: HttpClient, S: MapSink, W: Write>(
    client: &C,
    config: &PipelineConfig,
    sink: &mut S,
    out: &mut W,
) -> Result<Outcome> {
    let sources = load_sources(client, config).await?;
    analyze(&sources.obesity, &sources.integrity, config, sink, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{dead_url, local_client, serve_once};
    use crate::render::ChoroplethMap;
    use std::env;
    use std::fs;

    #[derive(Default)]
    struct RecordingSink {
        files: Vec<String>,
        maps: Vec<ChoroplethMap>,
    }

    impl MapSink for RecordingSink {
        fn render(&mut self, map: &ChoroplethMap) -> Result<()> {
            self.files.push(map.file_name.clone());
            self.maps.push(map.clone());
            Ok(())
        }
    }

    const SAVED_CSV: &str = "State,Prevalence\n\
                             Alabama,39.2\n\
                             California,27.7\n\
                             Ohio,38.1\n\
                             Vermont,28.0\n";

    const INTEGRITY_JSON: &str = r#"{"states": [
        {"name": "Alabama", "score": 59},
        {"name": "California", "score": 75},
        {"name": "Ohio", "score": 62},
        {"name": "Vermont", "score": 70}
    ]}"#;

    fn config_for(obesity_url: String, integrity_url: String, csv_name: &str) -> PipelineConfig {
        PipelineConfig {
            obesity_url,
            integrity_url,
            csv_path: env::temp_dir().join(csv_name),
            ..PipelineConfig::default()
        }
    }

    fn ob(code: &'static str, rate: f64) -> ObesityRow {
        ObesityRow {
            state_name: code.to_string(),
            state_code: Some(code),
            obesity_rate: Some(rate),
        }
    }

    fn ig(code: &'static str, score: f64) -> IntegrityRow {
        IntegrityRow {
            state_code: code,
            integrity_score: Some(score),
        }
    }

    #[test]
    fn test_analyze_reports_and_renders_three_maps() {
        let obesity = vec![ob("AL", 39.2), ob("CA", 27.7), ob("OH", 38.1), ob("VT", 28.0)];
        let integrity = vec![ig("AL", 59.0), ig("CA", 75.0), ig("OH", 62.0), ig("VT", 70.0)];
        let mut sink = RecordingSink::default();
        let mut out = Vec::new();

        let outcome =
            analyze(&obesity, &integrity, &PipelineConfig::default(), &mut sink, &mut out).unwrap();

        assert_eq!(outcome.merged.len(), 4);
        assert!(outcome.correlation.unwrap().coefficient < 0.0);
        assert_eq!(outcome.maps_rendered, 3);
        assert_eq!(
            sink.files,
            vec![
                "obesity_prevalence_map_2023.png",
                "state_integrity_map.png",
                "normalized_composite_metric_map.png",
            ]
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Correlation between obesity rate and integrity score: "));
    }

    #[test]
    fn test_analyze_empty_merge_skips_statistic() {
        let obesity = vec![ob("AL", 39.2)];
        let integrity = vec![ig("CA", 75.0)];
        let mut sink = RecordingSink::default();
        let mut out = Vec::new();

        let outcome =
            analyze(&obesity, &integrity, &PipelineConfig::default(), &mut sink, &mut out).unwrap();

        assert!(outcome.merged.is_empty());
        assert!(outcome.correlation.is_none());
        assert_eq!(sink.files.len(), 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("skipping correlation"));
    }

    #[test]
    fn test_analyze_two_states_is_degenerate() {
        let obesity = vec![ob("AL", 35.6), ob("CA", 26.2)];
        let integrity = vec![ig("AL", 50.0), ig("CA", 75.0)];
        let mut sink = RecordingSink::default();
        let mut out = Vec::new();

        let result = analyze(&obesity, &integrity, &PipelineConfig::default(), &mut sink, &mut out);

        assert!(matches!(result, Err(PipelineError::DegenerateSample { n: 2, .. })));
        assert!(sink.files.is_empty());
    }

    #[test]
    fn test_duplicate_codes_resolve_the_same_in_maps_and_merge() {
        let obesity = vec![ob("AL", 39.2), ob("AL", 10.0), ob("CA", 27.7), ob("OH", 38.1)];
        let integrity = vec![ig("AL", 59.0), ig("CA", 75.0), ig("OH", 62.0), ig("OH", 1.0)];
        let mut sink = RecordingSink::default();
        let mut out = Vec::new();

        let outcome =
            analyze(&obesity, &integrity, &PipelineConfig::default(), &mut sink, &mut out).unwrap();

        assert_eq!(outcome.merged[0].obesity_rate, 39.2);
        assert_eq!(sink.maps[0].values.get("AL"), Some(&39.2));
        assert_eq!(sink.maps[1].values.get("OH"), Some(&62.0));
    }

    #[tokio::test]
    async fn test_run_reuses_saved_csv_when_download_fails() {
        let config = config_for(
            dead_url().await,
            serve_once("200 OK", INTEGRITY_JSON).await,
            "obesity_integrity_test_pipeline_stale.csv",
        );
        fs::write(&config.csv_path, SAVED_CSV).unwrap();

        let client = local_client();
        let sources = load_sources(&client, &config).await.unwrap();
        assert_eq!(sources.csv_source, CsvSource::Stale);
        assert_eq!(sources.obesity.len(), 4);
        assert_eq!(sources.integrity.len(), 4);

        let config = PipelineConfig {
            integrity_url: serve_once("200 OK", INTEGRITY_JSON).await,
            ..config
        };
        let mut sink = RecordingSink::default();
        let mut out = Vec::new();
        let outcome = run(&client, &config, &mut sink, &mut out).await.unwrap();
        assert_eq!(outcome.merged.len(), 4);
        assert!(outcome.correlation.is_some());
        assert_eq!(outcome.maps_rendered, 3);

        fs::remove_file(&config.csv_path).unwrap();
    }

    #[tokio::test]
    async fn test_run_fails_when_integrity_fetch_fails() {
        let config = config_for(
            serve_once("200 OK", SAVED_CSV).await,
            dead_url().await,
            "obesity_integrity_test_pipeline_json.csv",
        );
        let _ = fs::remove_file(&config.csv_path);

        let client = local_client();
        let mut sink = RecordingSink::default();
        let mut out = Vec::new();
        let result = run(&client, &config, &mut sink, &mut out).await;

        assert!(matches!(result, Err(PipelineError::Network { .. })), "{result:?}");
        assert!(sink.files.is_empty());
        assert!(out.is_empty());
        assert_eq!(fs::read_to_string(&config.csv_path).unwrap(), SAVED_CSV);

        fs::remove_file(&config.csv_path).unwrap();
    }
}
