//! Pearson correlation with a two-tailed significance test.

pub mod beta;
pub mod utility;

use std::fmt;

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::merge::MergedRow;
use beta::student_t_two_tailed;
use utility::{mean, sum_cross_dev, sum_sq_dev};

/// Conventional threshold for the 95% confidence level.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Verdict of the significance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Significant,
    NotSignificant,
}

impl Significance {
    /// `Significant` iff `p_value < alpha`; a p-value equal to `alpha` is not significant.
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }

    pub fn is_significant(self) -> bool {
        self == Significance::Significant
    }
}

/// Result of a Pearson correlation test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
    pub sample_size: usize,
}

impl Correlation {
    pub fn significance(&self, alpha: f64) -> Significance {
        Significance::from_p_value(self.p_value, alpha)
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r = {:.2}, p = {:.4}, n = {}",
            self.coefficient, self.p_value, self.sample_size
        )
    }
}

/// Computes Pearson's r between `xs` and `ys` and its two-tailed p-value
/// from Student's t with `n - 2` degrees of freedom.
///
/// # Errors
///
/// [`PipelineError::DegenerateSample`] when the slices differ in length,
/// when there are fewer than three points (two points always give |r| = 1
/// with no degrees of freedom left), or when either series has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<Correlation> {
    let n = xs.len();
    if ys.len() != n {
        return Err(PipelineError::DegenerateSample {
            n,
            reason: format!("series lengths differ ({} vs {})", n, ys.len()),
        });
    }
    if n < 3 {
        return Err(PipelineError::DegenerateSample {
            n,
            reason: "at least 3 points are needed for a significance test".to_string(),
        });
    }

    // a constant series can leave rounding residue in the squared deviations
    if is_constant(xs) || is_constant(ys) {
        return Err(PipelineError::DegenerateSample {
            n,
            reason: "zero variance in one of the series".to_string(),
        });
    }

    let x_mean = mean(xs);
    let y_mean = mean(ys);
    let sxx = sum_sq_dev(xs, x_mean);
    let syy = sum_sq_dev(ys, y_mean);

    let sxy = sum_cross_dev(xs, x_mean, ys, y_mean);
    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);

    let df = (n - 2) as f64;
    let p_value = if r.abs() >= 1.0 {
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        student_t_two_tailed(t, df)
    };

    Ok(Correlation {
        coefficient: r,
        p_value: p_value.clamp(0.0, 1.0),
        sample_size: n,
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Correlates obesity rate against integrity score over the merged rows.
pub fn correlate_merged(rows: &[MergedRow]) -> Result<Correlation> {
    let obesity: Vec<f64> = rows.iter().map(|r| r.obesity_rate).collect();
    let integrity: Vec<f64> = rows.iter().map(|r| r.integrity_score).collect();
    pearson(&obesity, &integrity)
}
