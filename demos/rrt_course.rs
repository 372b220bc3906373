//! RRT Obstacle Course Example
//!
//! Runs the single-tree and bidirectional RRT planners on the same
//! polygonal course, compares their node counts, and renders the
//! bidirectional search. A kinodynamic run with a 20 x 50 rectangular
//! body follows on the same course.

use std::f64::consts::FRAC_PI_2;

use rand::rngs::StdRng;
use rand::SeedableRng;

use polygon_rrt::common::{Point2D, Pose2D, SamplingPlanner};
use polygon_rrt::path_planning::{BidirectionalRrtPlanner, KinodynamicRrtPlanner, RrtConfig, RrtPlanner};
use polygon_rrt::utils::{colors, parse_obstacle_course, PointStyle, TreeRecorder, Visualizer};
use polygon_rrt::ObstacleField;

const COURSE: &str = "\
4
4
150 0
200 0
200 400
150 400
4
350 200
400 200
400 600
350 600
5
450 50
550 50
600 150
520 250
450 150
3
0 500
100 450
80 600
";

fn main() {
    println!("RRT obstacle course start!!");

    let rings = match parse_obstacle_course(COURSE) {
        Ok(rings) => rings,
        Err(e) => {
            println!("Course parsing failed: {}", e);
            return;
        }
    };
    let field = match ObstacleField::from_rings(rings) {
        Ok(field) => field,
        Err(e) => {
            println!("Invalid course: {}", e);
            return;
        }
    };
    println!("Loaded {} obstacles", field.len());

    let start = Point2D::new(75.0, 50.0);
    let goal = Point2D::new(482.0, 577.0);
    let config = RrtConfig {
        step_size: 25.0,
        seed: Some(7),
        ..Default::default()
    };

    let (single, bidirectional) = match (
        RrtPlanner::new(field.clone(), config.clone()),
        BidirectionalRrtPlanner::new(field.clone(), config.clone()),
    ) {
        (Ok(single), Ok(bidirectional)) => (single, bidirectional),
        (Err(e), _) | (_, Err(e)) => {
            println!("Invalid configuration: {}", e);
            return;
        }
    };

    match single.plan(start, goal) {
        Ok(outcome) => println!(
            "RRT: found = {}, nodes = {}, length = {:.2}",
            outcome.is_found(),
            outcome.nodes(),
            outcome.path_length().unwrap_or(f64::NAN)
        ),
        Err(e) => println!("RRT planning failed: {}", e),
    }

    let mut recorder = TreeRecorder::new();
    let mut rng = StdRng::seed_from_u64(7);
    let outcome = match bidirectional.plan_with_rng(start, goal, &mut rng, &mut recorder) {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("Bidirectional RRT planning failed: {}", e);
            return;
        }
    };
    println!(
        "Bidirectional RRT: found = {}, nodes = {}, length = {:.2}",
        outcome.is_found(),
        outcome.nodes(),
        outcome.path_length().unwrap_or(f64::NAN)
    );

    let mut vis = Visualizer::new();
    vis.set_title("Bidirectional RRT");
    vis.plot_obstacle_field(&field);
    recorder.render(&mut vis);
    vis.plot_start(start).plot_goal(goal);
    let _ = vis.save_png("img/path_planning/rrt_course.png", 800, 800);
    println!("\nPlot saved to: img/path_planning/rrt_course.png");

    // Kinodynamic run with headings
    let kinodynamic = match KinodynamicRrtPlanner::new(field.clone(), RrtConfig { seed: Some(7), ..Default::default() }) {
        Ok(planner) => planner,
        Err(e) => {
            println!("Invalid configuration: {}", e);
            return;
        }
    };
    let mut recorder = TreeRecorder::new();
    let mut rng = StdRng::seed_from_u64(7);
    match kinodynamic.plan_with_rng(
        Pose2D::new(start.x, start.y, 0.0),
        Pose2D::new(goal.x, goal.y, FRAC_PI_2),
        &mut rng,
        &mut recorder,
    ) {
        Ok(outcome) => {
            println!("Kinodynamic RRT: found = {}, nodes = {}", outcome.is_found(), outcome.nodes());

            let mut vis = Visualizer::new();
            vis.set_title("Kinodynamic RRT");
            vis.plot_obstacle_field(&field);
            recorder.render(&mut vis);
            if let Some(path) = outcome.path() {
                for pose in path {
                    vis.plot_pose(pose, 30.0, &PointStyle::new(colors::RED, ""));
                }
            }
            let _ = vis.save_png("img/path_planning/rrt_kinodynamic.png", 800, 800);
            println!("Plot saved to: img/path_planning/rrt_kinodynamic.png");
        }
        Err(e) => println!("Kinodynamic RRT planning failed: {}", e),
    }

    println!("\nRRT obstacle course finish!!");
}
