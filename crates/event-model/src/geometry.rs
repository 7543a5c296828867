//! World-space geometry: points and the fixed map rectangle.
//!
//! World coordinates are whatever units the source map uses. The map
//! rectangle may be given "upside down" (`xmin > xmax` or `ymin > ymax`)
//! to flip the rendered image along that axis.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A position in world space.
///
/// Source records carry positions as `"x,y,z"` strings, optionally followed
/// by pitch and yaw. Only `x` and `y` are meaningful for a top-down map;
/// anything after them is discarded on parse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    pub fn distance_sq(&self, other: &WorldPoint) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

/// Failure to read a world position from its textual form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PointParseError {
    #[error("position {input:?} has {found} component(s), need at least x and y")]
    TooFewComponents { input: String, found: usize },

    #[error("position component {component:?} is not a number")]
    InvalidComponent { component: String },

    #[error("position component {component:?} is not finite")]
    NonFinite { component: String },
}

impl FromStr for WorldPoint {
    type Err = PointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() < 2 || parts[1].is_empty() {
            return Err(PointParseError::TooFewComponents {
                input: s.to_string(),
                found: parts.iter().filter(|p| !p.is_empty()).count(),
            });
        }

        let component = |raw: &str| -> Result<f64, PointParseError> {
            let value: f64 = raw.parse().map_err(|_| PointParseError::InvalidComponent {
                component: raw.to_string(),
            })?;
            if !value.is_finite() {
                return Err(PointParseError::NonFinite {
                    component: raw.to_string(),
                });
            }
            Ok(value)
        };

        // z, pitch and yaw are ignored.
        Ok(Self {
            x: component(parts[0])?,
            y: component(parts[1])?,
        })
    }
}

impl fmt::Display for WorldPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Wire form of a position: either `"x,y,z,..."` or `[x, y, ...]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Text(String),
    Components(Vec<f64>),
}

impl TryFrom<RawPoint> for WorldPoint {
    type Error = PointParseError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        match raw {
            RawPoint::Text(text) => text.parse(),
            RawPoint::Components(values) => {
                if values.len() < 2 {
                    return Err(PointParseError::TooFewComponents {
                        input: format!("{values:?}"),
                        found: values.len(),
                    });
                }
                for value in &values[..2] {
                    if !value.is_finite() {
                        return Err(PointParseError::NonFinite {
                            component: value.to_string(),
                        });
                    }
                }
                Ok(Self::new(values[0], values[1]))
            }
        }
    }
}

impl From<WorldPoint> for RawPoint {
    fn from(point: WorldPoint) -> Self {
        RawPoint::Components(vec![point.x, point.y])
    }
}

/// The world rectangle mapped onto the raster.
///
/// `(xmin, ymin)` lands on raster pixel `(0, 0)` (top-left) and
/// `(xmax, ymax)` on the far corner. Swapping a min/max pair inverts
/// that axis, which makes `width()` or `height()` negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl WorldRect {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Signed extent along x (`xmax - xmin`).
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Signed extent along y (`ymax - ymin`).
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Absolute area covered by the rectangle.
    pub fn area(&self) -> f64 {
        (self.width() * self.height()).abs()
    }

    /// True when either extent is zero or any corner is not finite.
    pub fn is_degenerate(&self) -> bool {
        let corners = [self.xmin, self.ymin, self.xmax, self.ymax];
        corners.iter().any(|c| !c.is_finite()) || self.width() == 0.0 || self.height() == 0.0
    }

    /// Whether the x axis runs right-to-left in the image.
    pub fn is_x_inverted(&self) -> bool {
        self.width() < 0.0
    }

    /// Whether the y axis runs bottom-to-top in the image.
    pub fn is_y_inverted(&self) -> bool {
        self.height() < 0.0
    }
}

impl Default for WorldRect {
    /// The map the reference data was captured on; y is inverted.
    fn default() -> Self {
        Self::new(-2400.0, 3150.0, 1950.0, -1200.0)
    }
}
