//! Continuous colour scales and value ranges.

/// An sRGB colour.
pub type Rgb = [u8; 3];

/// Fill for states that have no value.
pub const NO_DATA: Rgb = [220, 220, 220];

/// Piecewise-linear colour scale over [0, 1] defined by evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<Rgb>,
}

impl ColorScale {
    /// Builds a scale from stops spaced evenly from 0 to 1; `None` without stops.
    pub fn new(stops: Vec<Rgb>) -> Option<Self> {
        if stops.is_empty() {
            return None;
        }
        Some(Self { stops })
    }

    /// blue → lightblue → yellow → orange → red
    pub fn heat() -> Self {
        Self {
            stops: vec![
                [0, 0, 255],
                [173, 216, 230],
                [255, 255, 0],
                [255, 165, 0],
                [255, 0, 0],
            ],
        }
    }

    /// Sequential Blues, light to dark.
    pub fn blues() -> Self {
        Self {
            stops: vec![
                [247, 251, 255],
                [222, 235, 247],
                [198, 219, 239],
                [158, 202, 225],
                [107, 174, 214],
                [66, 146, 198],
                [33, 113, 181],
                [8, 81, 156],
                [8, 48, 107],
            ],
        }
    }

    /// Sequential Purples, light to dark.
    pub fn purples() -> Self {
        Self {
            stops: vec![
                [252, 251, 253],
                [239, 237, 245],
                [218, 218, 235],
                [188, 189, 220],
                [158, 154, 200],
                [128, 125, 186],
                [106, 81, 163],
                [84, 39, 143],
                [63, 0, 125],
            ],
        }
    }

    /// Same stops in the opposite direction.
    pub fn reversed(mut self) -> Self {
        self.stops.reverse();
        self
    }

    /// Colour at position `t`, clamped to [0, 1].
    pub fn sample(&self, t: f64) -> Rgb {
        let last = self.stops.len() - 1;
        if last == 0 {
            return self.stops[0];
        }
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let pos = t * last as f64;
        let i = (pos.floor() as usize).min(last - 1);
        let frac = pos - i as f64;

        let (a, b) = (self.stops[i], self.stops[i + 1]);
        let mut out = [0u8; 3];
        for c in 0..3 {
            let v = a[c] as f64 + (b[c] as f64 - a[c] as f64) * frac;
            out[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

/// Inclusive value range mapped onto a colour scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn fixed(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Smallest range covering `values`; `None` when there are no values.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(r) => Some(Self {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    /// Position of `v` within the range, clamped to [0, 1]. A zero-width
    /// range puts every value in the middle.
    pub fn normalize(&self, v: f64) -> f64 {
        let width = self.max - self.min;
        if width <= 0.0 {
            return 0.5;
        }
        ((v - self.min) / width).clamp(0.0, 1.0)
    }
}

/// Relative luminance test used to pick a readable label colour.
pub fn is_dark(c: Rgb) -> bool {
    let l = 0.2126 * c[0] as f64 + 0.7152 * c[1] as f64 + 0.0722 * c[2] as f64;
    l < 128.0
}
