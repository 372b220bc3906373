//! Visualization utilities for polygon_rrt
//!
//! Provides a unified interface for plotting using gnuplot, plus a
//! [`PlanObserver`] that records what a planner draws and replays it onto
//! a [`Visualizer`].

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PlotOption, PointSize, PointSymbol};

use crate::collision::ObstacleField;
use crate::common::{DrawRole, Path2D, PlanObserver, Point2D, Pose2D, RrtError, RrtResult};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const YELLOW: &str = "#FFFF00";
    pub const ORANGE: &str = "#FFA500";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const OBSTACLE: &str = BLACK;
    pub const START: &str = GREEN;
    pub const GOAL: &str = RED;
    pub const PATH: &str = YELLOW;
    pub const START_TREE: &str = BLACK;
    pub const GOAL_TREE: &str = BLUE;
    pub const SAMPLE: &str = ORANGE;
    pub const FOOTPRINT: &str = GRAY;
    pub const SOLUTION_NODE: &str = "#15B01A";
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    /// Legend entry, empty for none
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: colors::PATH.to_string(),
            line_width: 2.0,
            caption: "Path".to_string(),
        }
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    /// Legend entry, empty for none
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

/// One plot call, replayed onto a single set of axes when rendering
#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

/// Coordinates of disjoint segments, separated by NaN so gnuplot breaks
/// the line between them
fn segments_xy<I>(segments: I) -> (Vec<f64>, Vec<f64>)
where
    I: IntoIterator<Item = (Point2D, Point2D)>,
{
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (a, b) in segments {
        if !x.is_empty() {
            x.push(f64::NAN);
            y.push(f64::NAN);
        }
        x.extend_from_slice(&[a.x, b.x]);
        y.extend_from_slice(&[a.y, b.y]);
    }
    (x, y)
}

/// Closed ring coordinates, first vertex repeated at the end
fn ring_xy(vertices: &[Point2D]) -> (Vec<f64>, Vec<f64>) {
    vertices.iter().chain(vertices.first()).map(|p| (p.x, p.y)).unzip()
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    layers: Vec<Layer>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            layers: Vec::new(),
            title: String::new(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Set X axis label
    pub fn set_x_label(&mut self, label: &str) -> &mut Self {
        self.x_label = label.to_string();
        self
    }

    /// Set Y axis label
    pub fn set_y_label(&mut self, label: &str) -> &mut Self {
        self.y_label = label.to_string();
        self
    }

    /// Set X axis range
    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    /// Set Y axis range
    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Number of queued plot calls
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Plot a path
    pub fn plot_path(&mut self, path: &Path2D, style: &PathStyle) -> &mut Self {
        self.plot_path_xy(&path.x_coords(), &path.y_coords(), style)
    }

    /// Plot a path from x,y vectors
    pub fn plot_path_xy(&mut self, x: &[f64], y: &[f64], style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: x.to_vec(),
            y: y.to_vec(),
            style: style.clone(),
        });
        self
    }

    /// Plot disjoint segments as one layer
    pub fn plot_segments<I>(&mut self, segments: I, style: &PathStyle) -> &mut Self
    where
        I: IntoIterator<Item = (Point2D, Point2D)>,
    {
        let (x, y) = segments_xy(segments);
        if !x.is_empty() {
            self.plot_path_xy(&x, &y, style);
        }
        self
    }

    /// Plot a closed polygon outline
    pub fn plot_polygon(&mut self, vertices: &[Point2D], style: &PathStyle) -> &mut Self {
        let (x, y) = ring_xy(vertices);
        self.plot_path_xy(&x, &y, style)
    }

    /// Plot every obstacle outline of the field
    pub fn plot_obstacle_field(&mut self, field: &ObstacleField) -> &mut Self {
        for (i, obstacle) in field.obstacles().iter().enumerate() {
            let caption = if i == 0 { "Obstacles" } else { "" };
            self.plot_polygon(obstacle.vertices(), &PathStyle::new(colors::OBSTACLE, caption));
        }
        self
    }

    /// Plot a single point (start, goal, etc.)
    pub fn plot_point(&mut self, point: Point2D, style: &PointStyle) -> &mut Self {
        self.plot_points(&[point], style)
    }

    /// Plot multiple points
    pub fn plot_points(&mut self, points: &[Point2D], style: &PointStyle) -> &mut Self {
        let (x, y) = points.iter().map(|p| (p.x, p.y)).unzip();
        self.layers.push(Layer::Points {
            x,
            y,
            style: style.clone(),
        });
        self
    }

    /// Plot a pose as a point with a heading indicator
    pub fn plot_pose(&mut self, pose: &Pose2D, length: f64, style: &PointStyle) -> &mut Self {
        let tip = Point2D::new(pose.x + length * pose.yaw.cos(), pose.y + length * pose.yaw.sin());
        self.plot_point(Point2D::new(pose.x, pose.y), style);
        self.plot_segments(
            std::iter::once((Point2D::new(pose.x, pose.y), tip)),
            &PathStyle::new(&style.color, ""),
        )
    }

    /// Plot start position
    pub fn plot_start(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    /// Plot goal position
    pub fn plot_goal(&mut self, point: Point2D) -> &mut Self {
        self.plot_point(point, &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    /// Finalize and show the plot
    pub fn show(&mut self) -> RrtResult<()> {
        self.render();
        self.figure
            .show()
            .map(|_| ())
            .map_err(|e| RrtError::Visualization(e.to_string()))
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> RrtResult<()> {
        self.render();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| RrtError::Visualization(e.to_string()))
    }

    /// Save plot to SVG file
    pub fn save_svg(&mut self, path: &str) -> RrtResult<()> {
        self.render();
        self.figure
            .save_to_svg(path, 800, 800)
            .map_err(|e| RrtError::Visualization(e.to_string()))
    }

    fn render(&mut self) {
        self.figure.clear_axes();
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, style } => {
                    let mut options: Vec<PlotOption<&str>> =
                        vec![Color(style.color.as_str()), LineWidth(style.line_width)];
                    if !style.caption.is_empty() {
                        options.push(Caption(style.caption.as_str()));
                    }
                    axes.lines(x, y, &options);
                }
                Layer::Points { x, y, style } => {
                    let mut options: Vec<PlotOption<&str>> = vec![
                        Color(style.color.as_str()),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ];
                    if !style.caption.is_empty() {
                        options.push(Caption(style.caption.as_str()));
                    }
                    axes.points(x, y, &options);
                }
            }
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer that keeps every drawing call of a planner run
#[derive(Debug, Clone, Default)]
pub struct TreeRecorder {
    record_samples: bool,
    samples: Vec<Point2D>,
    edges: [Vec<(Point2D, Point2D)>; 2],
    nodes: Vec<Point2D>,
    footprints: Vec<Vec<Point2D>>,
    solution: Path2D,
    solution_nodes: Vec<Point2D>,
}

impl TreeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also keep the random samples, which are skipped by default
    pub fn with_samples(mut self) -> Self {
        self.record_samples = true;
        self
    }

    /// Recorded tree edges of tree `0` (start side) or `1` (goal side)
    pub fn edges(&self, tree: usize) -> &[(Point2D, Point2D)] {
        self.edges.get(tree).map_or(&[][..], Vec::as_slice)
    }

    pub fn nodes(&self) -> &[Point2D] {
        &self.nodes
    }

    pub fn samples(&self) -> &[Point2D] {
        &self.samples
    }

    pub fn footprints(&self) -> &[Vec<Point2D>] {
        &self.footprints
    }

    /// Final path, chained from the consecutive solution edges
    pub fn solution(&self) -> &Path2D {
        &self.solution
    }

    /// Replay the recording onto `vis`, solution on top
    pub fn render(&self, vis: &mut Visualizer) {
        if self.record_samples && !self.samples.is_empty() {
            vis.plot_points(&self.samples, &PointStyle::new(colors::SAMPLE, "Samples").with_size(0.3));
        }
        for (i, footprint) in self.footprints.iter().enumerate() {
            let caption = if i == 0 { "Footprint" } else { "" };
            vis.plot_polygon(footprint, &PathStyle::new(colors::FOOTPRINT, caption).with_line_width(0.5));
        }

        let tree_styles = [
            PathStyle::new(colors::START_TREE, "Start tree").with_line_width(1.0),
            PathStyle::new(colors::GOAL_TREE, "Goal tree").with_line_width(1.0),
        ];
        for (edges, style) in self.edges.iter().zip(tree_styles.iter()) {
            vis.plot_segments(edges.iter().copied(), style);
        }
        if !self.nodes.is_empty() {
            vis.plot_points(&self.nodes, &PointStyle::new(colors::BLACK, "").with_size(0.4));
        }

        if !self.solution.is_empty() {
            vis.plot_path(&self.solution, &PathStyle::default().with_line_width(3.0));
        }
        if !self.solution_nodes.is_empty() {
            vis.plot_points(&self.solution_nodes, &PointStyle::new(colors::SOLUTION_NODE, "").with_size(0.8));
        }
    }
}

impl PlanObserver for TreeRecorder {
    fn draw_line(&mut self, from: Point2D, to: Point2D, role: DrawRole) {
        match role {
            DrawRole::TreeEdge(tree) => {
                if let Some(edges) = self.edges.get_mut(tree) {
                    edges.push((from, to));
                }
            }
            DrawRole::Solution => {
                if self.solution.points.last() != Some(&from) {
                    self.solution.push(from);
                }
                self.solution.push(to);
            }
            _ => {}
        }
    }

    fn draw_circle(&mut self, center: Point2D, _radius: f64, role: DrawRole) {
        match role {
            DrawRole::Sample if self.record_samples => self.samples.push(center),
            DrawRole::Node => self.nodes.push(center),
            DrawRole::Solution => self.solution_nodes.push(center),
            _ => {}
        }
    }

    fn draw_polygon(&mut self, vertices: &[Point2D], role: DrawRole) {
        if role == DrawRole::Footprint {
            self.footprints.push(vertices.to_vec());
        }
    }
}
