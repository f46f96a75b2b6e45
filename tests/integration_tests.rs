use obesity_integrity::config::PipelineConfig;
use obesity_integrity::parser::{parse_integrity_json, parse_obesity_csv};
use obesity_integrity::pipeline::analyze;
use obesity_integrity::render::TerminalSink;

#[test]
fn test_full_pipeline() {
    let obesity = parse_obesity_csv(&include_bytes!("fixtures/obesity_sample.csv")[..])
        .expect("Failed to parse obesity CSV");
    let doc: serde_json::Value =
        serde_json::from_slice(include_bytes!("fixtures/integrity_sample.json"))
            .expect("Failed to decode integrity JSON");
    let integrity = parse_integrity_json(&doc).expect("Failed to parse integrity JSON");

    let mut sink = TerminalSink::new(Vec::new());
    let mut report = Vec::new();
    let outcome = analyze(
        &obesity,
        &integrity,
        &PipelineConfig::default(),
        &mut sink,
        &mut report,
    )
    .expect("Pipeline failed");

    // NJ has no prevalence, VT has no score, DC and Guam have no code
    let codes: Vec<_> = outcome.merged.iter().map(|r| r.state_code).collect();
    assert_eq!(codes, vec!["AK", "AL", "CA", "CO", "MI", "OH", "WV"]);
    assert!(
        outcome
            .merged
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.combined_metric))
    );

    let correlation = outcome.correlation.expect("correlation should be computed");
    assert_eq!(correlation.sample_size, 7);
    assert!(correlation.coefficient < 0.0);
    assert!((0.0..=1.0).contains(&correlation.p_value));
    assert_eq!(outcome.maps_rendered, 3);

    let report = String::from_utf8(report).unwrap();
    let lines: Vec<_> = report.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Correlation between obesity rate and integrity score: -0."));
    assert!(lines[1].starts_with("P-value of the correlation: 0."));
    assert!(lines[2].ends_with("at the 95% confidence level."));

    let maps = String::from_utf8(sink.into_inner()).unwrap();
    assert!(maps.contains("Adult Obesity Prevalence by State (2023)"));
    assert!(maps.contains("State Integrity Scores by State"));
    assert!(maps.contains("Normalized Composite Metric"));
}
