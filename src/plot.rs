//! Scatter-plot geometry: data bounds and the mapping from
//! (longitude, latitude) to canvas pixels. Drawing itself lives in the
//! binary.

use crate::accidents::FilteredAccident;

/// Smallest axis span, in degrees, a plot is allowed to have.
pub const MIN_SPAN: f64 = 0.01;

/// Fraction of the data span added on each side of the plot.
pub const PADDING: f64 = 0.05;

/// One marker: x is longitude, y is latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl From<&FilteredAccident> for PlotPoint {
    fn from(accident: &FilteredAccident) -> Self {
        PlotPoint {
            x: accident.longitude,
            y: accident.latitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Smallest box holding every finite point, `None` if there are none.
    pub fn of(points: &[PlotPoint]) -> Option<Self> {
        points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .fold(None, |acc: Option<Bounds>, p| {
                Some(match acc {
                    None => Bounds {
                        min_x: p.x,
                        max_x: p.x,
                        min_y: p.y,
                        max_y: p.y,
                    },
                    Some(b) => Bounds {
                        min_x: b.min_x.min(p.x),
                        max_x: b.max_x.max(p.x),
                        min_y: b.min_y.min(p.y),
                        max_y: b.max_y.max(p.y),
                    },
                })
            })
    }

    /// Grows each axis by `fraction` of its span on both sides. An axis
    /// narrower than [`MIN_SPAN`] is widened to it around its centre.
    pub fn padded(self, fraction: f64) -> Self {
        let (min_x, max_x) = pad_axis(self.min_x, self.max_x, fraction);
        let (min_y, max_y) = pad_axis(self.min_y, self.max_y, fraction);
        Bounds {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

fn pad_axis(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    let span = max - min;
    if span < MIN_SPAN {
        let centre = (min + max) / 2.0;
        (centre - MIN_SPAN / 2.0, centre + MIN_SPAN / 2.0)
    } else {
        let pad = span * fraction;
        (min - pad, max + pad)
    }
}

/// Maps data coordinates into a `width` x `height` canvas with a fixed
/// pixel margin. Larger y values are drawn higher up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub bounds: Bounds,
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Projection {
    pub fn new(bounds: Bounds, width: f32, height: f32, margin: f32) -> Self {
        Self {
            bounds,
            width,
            height,
            margin,
        }
    }

    /// Pixel position of `point`.
    pub fn project(&self, point: PlotPoint) -> (f32, f32) {
        let plot_width = (self.width - 2.0 * self.margin).max(1.0);
        let plot_height = (self.height - 2.0 * self.margin).max(1.0);

        let fx = ((point.x - self.bounds.min_x) / self.bounds.width()) as f32;
        let fy = ((point.y - self.bounds.min_y) / self.bounds.height()) as f32;

        (
            self.margin + fx * plot_width,
            self.margin + (1.0 - fy) * plot_height,
        )
    }
}

/// Radius in pixels of a marker whose area is `size` square pixels.
/// Never below half a pixel.
pub fn marker_radius(size: f64) -> f32 {
    ((size / std::f64::consts::PI).sqrt() as f32).max(0.5)
}
