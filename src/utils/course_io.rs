//! Text formats for obstacle courses and start/goal records
//!
//! Obstacle course:
//!
//! ```text
//! 2          <- number of obstacles
//! 3          <- vertices of the first obstacle
//! 0 0
//! 10 0
//! 5 8
//! 4          <- vertices of the second obstacle
//! ...
//! ```
//!
//! Start/goal: two records, `x y` or `x y heading` with the heading in
//! degrees. Blank lines are ignored in both formats.

use std::f64::consts::TAU;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::collision::ObstacleField;
use crate::common::{Point2D, Pose2D, RrtError, RrtResult};

/// Upper bound on pre-allocation from counts read out of a file
const MAX_PREALLOCATION: usize = 1024;

/// One start or goal record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    /// Heading in degrees, when the record carries one
    pub heading_deg: Option<f64>,
}

impl Waypoint {
    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Pose using the record's heading, or `default_deg` when it has none.
    ///
    /// The heading is wrapped into `[0, 2pi)`.
    pub fn pose(&self, default_deg: f64) -> Pose2D {
        let heading = self.heading_deg.unwrap_or(default_deg);
        Pose2D::new(self.x, self.y, heading.to_radians().rem_euclid(TAU))
    }
}

/// Non-blank lines with their 1-based line numbers
struct Records<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    last_line: usize,
}

impl<'a> Records<'a> {
    fn new(text: &'a str) -> Self {
        Records {
            lines: text.lines().enumerate(),
            last_line: 0,
        }
    }

    fn next_record(&mut self, expected: &str) -> RrtResult<(usize, Vec<&'a str>)> {
        for (index, line) in self.lines.by_ref() {
            self.last_line = index + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if !fields.is_empty() {
                return Ok((index + 1, fields));
            }
        }
        Err(RrtError::Parse {
            line: self.last_line + 1,
            message: format!("unexpected end of input, expected {}", expected),
        })
    }

    fn expect_end(&mut self) -> RrtResult<()> {
        for (index, line) in self.lines.by_ref() {
            if !line.trim().is_empty() {
                return Err(RrtError::Parse {
                    line: index + 1,
                    message: "unexpected trailing data".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_field<T: FromStr>(line: usize, field: &str, what: &str) -> RrtResult<T> {
    field.parse().map_err(|_| RrtError::Parse {
        line,
        message: format!("invalid {} '{}'", what, field),
    })
}

fn parse_count(records: &mut Records, what: &str) -> RrtResult<usize> {
    let (line, fields) = records.next_record(what)?;
    match fields.as_slice() {
        [count] => parse_field(line, count, what),
        _ => Err(RrtError::Parse {
            line,
            message: format!("expected a single {}, found {} values", what, fields.len()),
        }),
    }
}

fn parse_coordinates(line: usize, fields: &[&str]) -> RrtResult<Vec<f64>> {
    let values = fields
        .iter()
        .map(|f| parse_field::<f64>(line, f, "coordinate"))
        .collect::<RrtResult<Vec<_>>>()?;
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(RrtError::Parse {
            line,
            message: format!("coordinate {} is not finite", v),
        });
    }
    Ok(values)
}

/// Parse an obstacle course into one vertex ring per obstacle
pub fn parse_obstacle_course(text: &str) -> RrtResult<Vec<Vec<Point2D>>> {
    let mut records = Records::new(text);
    let obstacle_count = parse_count(&mut records, "obstacle count")?;

    let mut rings = Vec::with_capacity(obstacle_count.min(MAX_PREALLOCATION));
    for _ in 0..obstacle_count {
        let vertex_count = parse_count(&mut records, "vertex count")?;
        let mut ring = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATION));
        for _ in 0..vertex_count {
            let (line, fields) = records.next_record("vertex")?;
            match parse_coordinates(line, &fields)?.as_slice() {
                [x, y] => ring.push(Point2D::new(*x, *y)),
                values => {
                    return Err(RrtError::Parse {
                        line,
                        message: format!("vertex needs 2 coordinates, found {}", values.len()),
                    })
                }
            }
        }
        rings.push(ring);
    }

    records.expect_end()?;
    Ok(rings)
}

/// Parse the start and goal records
pub fn parse_start_goal(text: &str) -> RrtResult<(Waypoint, Waypoint)> {
    let mut records = Records::new(text);
    let mut waypoint = |what: &str| -> RrtResult<Waypoint> {
        let (line, fields) = records.next_record(what)?;
        match parse_coordinates(line, &fields)?.as_slice() {
            [x, y] => Ok(Waypoint { x: *x, y: *y, heading_deg: None }),
            [x, y, heading] => Ok(Waypoint { x: *x, y: *y, heading_deg: Some(*heading) }),
            values => Err(RrtError::Parse {
                line,
                message: format!("{} needs 2 or 3 values, found {}", what, values.len()),
            }),
        }
    };

    let start = waypoint("start")?;
    let goal = waypoint("goal")?;
    records.expect_end()?;
    Ok((start, goal))
}

/// Read and build the obstacle field stored at `path`
pub fn load_obstacle_course<P: AsRef<Path>>(path: P) -> RrtResult<ObstacleField> {
    let text = fs::read_to_string(path)?;
    ObstacleField::from_rings(parse_obstacle_course(&text)?)
}

/// Read the start and goal records stored at `path`
pub fn load_start_goal<P: AsRef<Path>>(path: P) -> RrtResult<(Waypoint, Waypoint)> {
    let text = fs::read_to_string(path)?;
    parse_start_goal(&text)
}
