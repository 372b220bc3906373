//! RRT planner over a polygonal obstacle course
//!
//! Reads an obstacle course and a start/goal file, runs the selected RRT
//! variant, prints the resulting path and optionally renders the search
//! tree to a PNG or SVG file.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info, warn};

use polygon_rrt::collision::ObstacleField;
use polygon_rrt::common::{Configuration, RrtResult, SamplingPlanner};
use polygon_rrt::path_planning::{
    BidirectionalRrtPlanner, KinodynamicRrtPlanner, PlanOutcome, RrtConfig, RrtPlanner,
};
use polygon_rrt::utils::{load_obstacle_course, load_start_goal, TreeRecorder, Visualizer, Waypoint};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Single goal-biased tree
    Unidirectional,
    /// Trees from start and goal growing towards each other
    Bidirectional,
    /// Rectangular body with headings
    Kinodynamic,
}

#[derive(Parser, Debug)]
#[command(name = "rrt_planner")]
#[command(about = "RRT path planner for polygonal obstacle courses", long_about = None)]
struct Args {
    /// RRT variant
    #[arg(short, long, value_enum, default_value_t = Mode::Unidirectional)]
    mode: Mode,

    /// Maximum distance between a node and its parent
    #[arg(long, default_value_t = 50.0)]
    step_size: f64,

    /// Maximum number of nodes to expand
    #[arg(long, default_value_t = 2000)]
    max_search: usize,

    /// Obstacle course file
    #[arg(long, default_value = "world_obstacles.txt")]
    obstacle_path: PathBuf,

    /// Start/goal file
    #[arg(long, default_value = "start_goal.txt")]
    goal_path: PathBuf,

    /// Random seed, entropy when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Start heading in degrees when the start record has none
    #[arg(long, default_value_t = 0.0)]
    start_heading: f64,

    /// Goal heading in degrees when the goal record has none
    #[arg(long, default_value_t = 90.0)]
    goal_heading: f64,

    /// Render the search tree and path to this file (SVG for `.svg`, PNG otherwise)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn report<C: Configuration>(outcome: &PlanOutcome<C>) {
    match outcome {
        PlanOutcome::Found { path, nodes } => {
            info!(
                "path found: {} waypoints, length {:.2}, n = {}",
                path.len(),
                outcome.path_length().unwrap_or_default(),
                nodes
            );
            for config in path {
                println!("{:?}", config);
            }
        }
        PlanOutcome::Exhausted { nodes } => {
            warn!("no path found within the node budget, n = {}", nodes);
        }
    }
}

fn render(args: &Args, field: &ObstacleField, recorder: &TreeRecorder, start: &Waypoint, goal: &Waypoint) -> RrtResult<()> {
    let output = match &args.output {
        Some(output) => output,
        None => return Ok(()),
    };

    let mut vis = Visualizer::new();
    vis.set_title(&format!("RRT ({:?})", args.mode));
    vis.plot_obstacle_field(field);
    recorder.render(&mut vis);
    vis.plot_start(start.position()).plot_goal(goal.position());
    let is_svg = output.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg {
        vis.save_svg(&output.to_string_lossy())?;
    } else {
        vis.save_png(&output.to_string_lossy(), 800, 800)?;
    }
    info!("plot saved to {}", output.display());
    Ok(())
}

fn run(args: &Args) -> RrtResult<()> {
    let field = load_obstacle_course(&args.obstacle_path)?;
    let (start, goal) = load_start_goal(&args.goal_path)?;
    info!(
        "{} obstacles, start ({}, {}), goal ({}, {})",
        field.len(),
        start.x,
        start.y,
        goal.x,
        goal.y
    );

    let config = RrtConfig {
        step_size: args.step_size,
        max_nodes: args.max_search,
        seed: args.seed,
        ..Default::default()
    };
    let mut recorder = TreeRecorder::new();

    match args.mode {
        Mode::Unidirectional => {
            let planner = RrtPlanner::new(field.clone(), config)?;
            let outcome = planner.plan_observed(start.position(), goal.position(), &mut recorder)?;
            report(&outcome);
        }
        Mode::Bidirectional => {
            let planner = BidirectionalRrtPlanner::new(field.clone(), config)?;
            let outcome = planner.plan_observed(start.position(), goal.position(), &mut recorder)?;
            report(&outcome);
        }
        Mode::Kinodynamic => {
            let planner = KinodynamicRrtPlanner::new(field.clone(), config)?;
            let outcome = planner.plan_observed(
                start.pose(args.start_heading),
                goal.pose(args.goal_heading),
                &mut recorder,
            )?;
            report(&outcome);
        }
    }

    render(args, &field, &recorder, &start, &goal)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "polygon_rrt=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
