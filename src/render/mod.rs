//! Choropleth rendering of per-state values.
//!
//! A [`ChoroplethMap`] holds the values, colour scale and labels for one map.
//! A [`MapSink`] turns it into output: [`PngSink`] writes a raster image,
//! [`TerminalSink`] draws it with ANSI colours.

pub mod font;
pub mod png;
pub mod scale;
pub mod terminal;
pub mod tilemap;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::merge::{MergedRow, StateIndex};

pub use png::PngSink;
pub use scale::{ColorScale, Rgb, ValueRange};
pub use terminal::TerminalSink;

pub const OBESITY_MAP_FILE: &str = "obesity_prevalence_map_2023.png";
pub const INTEGRITY_MAP_FILE: &str = "state_integrity_map.png";
pub const COMPOSITE_MAP_FILE: &str = "normalized_composite_metric_map.png";

/// One map: values by state code plus everything needed to colour and label it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethMap {
    pub title: String,
    pub metric: String,
    pub file_name: String,
    pub values: BTreeMap<&'static str, f64>,
    pub scale: ColorScale,
    pub range: ValueRange,
}

impl ChoroplethMap {
    /// Map over `values` whose colour range spans the data.
    pub fn new(
        title: &str,
        metric: &str,
        file_name: &str,
        values: BTreeMap<&'static str, f64>,
        scale: ColorScale,
    ) -> Self {
        let range = ValueRange::from_values(values.values().copied())
            .unwrap_or(ValueRange::fixed(0.0, 1.0));
        Self {
            title: title.to_string(),
            metric: metric.to_string(),
            file_name: file_name.to_string(),
            values,
            scale,
            range,
        }
    }

    /// Pins the colour range instead of deriving it from the data.
    pub fn with_range(mut self, range: ValueRange) -> Self {
        self.range = range;
        self
    }

    /// Fill colour for a state, `None` when it has no value.
    pub fn color_of(&self, code: &str) -> Option<Rgb> {
        self.values
            .get(code)
            .map(|v| self.scale.sample(self.range.normalize(*v)))
    }
}

fn present(index: &StateIndex) -> BTreeMap<&'static str, f64> {
    index
        .iter()
        .filter_map(|(&code, v)| v.map(|v| (code, v)))
        .collect()
}

/// Raw obesity prevalence, blue (low) through red (high).
pub fn obesity_map(obesity: &StateIndex) -> ChoroplethMap {
    ChoroplethMap::new(
        "Adult Obesity Prevalence by State (2023) - Source CDC.org",
        "obesity_rate",
        OBESITY_MAP_FILE,
        present(obesity),
        ColorScale::heat(),
    )
}

/// Raw integrity score on reversed Blues, so darker means lower integrity.
pub fn integrity_map(integrity: &StateIndex) -> ChoroplethMap {
    ChoroplethMap::new(
        "State Integrity Scores by State (Darker = Lower Integrity) - Source publicintegrity.org",
        "integrity_score",
        INTEGRITY_MAP_FILE,
        present(integrity),
        ColorScale::blues().reversed(),
    )
}

/// Composite metric on Purples over the fixed range [0, 1].
pub fn composite_map(rows: &[MergedRow]) -> ChoroplethMap {
    let values = rows
        .iter()
        .map(|r| (r.state_code, r.combined_metric))
        .collect();
    ChoroplethMap::new(
        "Normalized Composite Metric of Obesity Rate and Integrity Score (0 to 1 Scale)",
        "combined_metric",
        COMPOSITE_MAP_FILE,
        values,
        ColorScale::purples(),
    )
    .with_range(ValueRange::fixed(0.0, 1.0))
}

/// Destination for rendered maps.
pub trait MapSink {
    fn render(&mut self, map: &ChoroplethMap) -> Result<()>;
}

/// Formats a legend value compactly: two decimals below 10, one above.
pub fn legend_value(v: f64) -> String {
    if v.abs() < 10.0 {
        format!("{v:.2}")
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{integrity_by_code, obesity_by_code};
    use crate::parser::{IntegrityRow, ObesityRow};

    fn ob(code: Option<&'static str>, rate: Option<f64>) -> ObesityRow {
        ObesityRow {
            state_name: String::new(),
            state_code: code,
            obesity_rate: rate,
        }
    }

    #[test]
    fn test_obesity_map_skips_missing_and_spans_data() {
        let rows = vec![
            ob(Some("AL"), Some(39.2)),
            ob(Some("CO"), Some(25.0)),
            ob(Some("NJ"), None),
            ob(None, Some(60.0)),
        ];
        let map = obesity_map(&obesity_by_code(&rows));

        assert_eq!(map.values.len(), 2);
        assert_eq!(map.range, ValueRange::fixed(25.0, 39.2));
        assert_eq!(map.color_of("AL"), Some([255, 0, 0]));
        assert_eq!(map.color_of("CO"), Some([0, 0, 255]));
        assert_eq!(map.color_of("NJ"), None);
        assert_eq!(map.file_name, OBESITY_MAP_FILE);
    }

    #[test]
    fn test_integrity_map_low_scores_are_dark() {
        let rows = vec![
            IntegrityRow { state_code: "MI", integrity_score: Some(51.0) },
            IntegrityRow { state_code: "AK", integrity_score: Some(76.0) },
        ];
        let map = integrity_map(&integrity_by_code(&rows));
        assert!(scale::is_dark(map.color_of("MI").unwrap()));
        assert!(!scale::is_dark(map.color_of("AK").unwrap()));
    }

    #[test]
    fn test_composite_map_uses_fixed_range() {
        let rows = vec![MergedRow {
            state_code: "AL",
            obesity_rate: 35.6,
            integrity_score: 50.0,
            combined_metric: 0.428,
        }];
        let map = composite_map(&rows);
        assert_eq!(map.range, ValueRange::fixed(0.0, 1.0));
        assert_eq!(map.values.get("AL"), Some(&0.428));
    }

    #[test]
    fn test_legend_value() {
        assert_eq!(legend_value(0.4281), "0.43");
        assert_eq!(legend_value(39.24), "39.2");
    }
}
