//! Line segments and the exact intersection test used by every
//! collision query.
//!
//! Coordinate ranges are half-open (`min <= v < max`) so that a ray
//! passing exactly through a shared polygon vertex is counted once.

use crate::common::{Bounds2D, Point2D};

/// Vertical distance below which a point counts as lying on a sloped segment
pub const ON_LINE_TOLERANCE: f64 = 0.001;

/// Half-open interval of coordinate values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn spanning(a: f64, b: f64) -> Self {
        Range { min: a.min(b), max: a.max(b) }
    }

    /// `min <= value < max`
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value < self.max
    }
}

/// Slope/intercept form of a non-vertical line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub slope: f64,
    pub intercept: f64,
}

impl Line {
    fn y_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    fn x_at(&self, y: f64) -> f64 {
        (y - self.intercept) / self.slope
    }
}

/// Orientation class; a zero-length segment is classed as horizontal
#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Horizontal,
    Vertical,
    Sloped(Line),
}

/// Straight segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2D,
    pub end: Point2D,
    pub x_range: Range,
    pub y_range: Range,
    orientation: Orientation,
}

impl Segment {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        let orientation = if start.y == end.y {
            Orientation::Horizontal
        } else if start.x == end.x {
            Orientation::Vertical
        } else {
            let slope = (end.y - start.y) / (end.x - start.x);
            Orientation::Sloped(Line {
                slope,
                intercept: end.y - slope * end.x,
            })
        };

        Segment {
            start,
            end,
            x_range: Range::spanning(start.x, end.x),
            y_range: Range::spanning(start.y, end.y),
            orientation,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// Slope and intercept, `None` for vertical segments
    pub fn line(&self) -> Option<Line> {
        match self.orientation {
            Orientation::Sloped(line) => Some(line),
            Orientation::Horizontal if !self.is_vertical() => Some(Line {
                slope: 0.0,
                intercept: self.end.y,
            }),
            _ => None,
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn bounds(&self) -> Bounds2D {
        Bounds2D::new(self.x_range.min, self.x_range.max, self.y_range.min, self.y_range.max)
    }

    /// Exact intersection test.
    ///
    /// Parallel segments never intersect, so collinear overlaps are
    /// reported as disjoint.
    pub fn intersects(&self, other: &Segment) -> bool {
        use Orientation::*;

        match (self.orientation, other.orientation) {
            (Horizontal, Horizontal) | (Vertical, Vertical) => false,
            (Horizontal, Vertical) => crosses_axis_aligned(self, other),
            (Vertical, Horizontal) => crosses_axis_aligned(other, self),
            (Horizontal, Sloped(line)) => crosses_horizontal(self, other, &line),
            (Sloped(line), Horizontal) => crosses_horizontal(other, self, &line),
            (Vertical, Sloped(line)) => crosses_vertical(self, other, &line),
            (Sloped(line), Vertical) => crosses_vertical(other, self, &line),
            (Sloped(a), Sloped(b)) => {
                if a.slope == b.slope {
                    return false;
                }
                let xp = (b.intercept - a.intercept) / (a.slope - b.slope);
                // Evaluate on the flatter line so the result is operand-order independent
                let yp = if (a.slope.abs(), a.slope) <= (b.slope.abs(), b.slope) {
                    a.y_at(xp)
                } else {
                    b.y_at(xp)
                };

                self.x_range.contains(xp)
                    && other.x_range.contains(xp)
                    && self.y_range.contains(yp)
                    && other.y_range.contains(yp)
            }
        }
    }

    /// Whether `point` lies on this segment
    pub fn contains_point(&self, point: &Point2D) -> bool {
        match self.orientation {
            Orientation::Horizontal => point.y == self.end.y && self.x_range.contains(point.x),
            Orientation::Vertical => point.x == self.end.x && self.y_range.contains(point.y),
            Orientation::Sloped(line) => {
                (point.y - line.y_at(point.x)).abs() < ON_LINE_TOLERANCE
                    && self.x_range.min <= point.x
                    && point.x <= self.x_range.max
            }
        }
    }
}

fn crosses_axis_aligned(horizontal: &Segment, vertical: &Segment) -> bool {
    vertical.y_range.contains(horizontal.end.y) && horizontal.x_range.contains(vertical.end.x)
}

fn crosses_horizontal(horizontal: &Segment, sloped: &Segment, line: &Line) -> bool {
    let xp = line.x_at(horizontal.end.y);
    horizontal.x_range.contains(xp) && sloped.x_range.contains(xp) && sloped.y_range.contains(horizontal.end.y)
}

fn crosses_vertical(vertical: &Segment, sloped: &Segment, line: &Line) -> bool {
    let yp = line.y_at(vertical.end.x);
    vertical.y_range.contains(yp) && sloped.y_range.contains(yp) && sloped.x_range.contains(vertical.end.x)
}
