//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use glam::DVec2;

use crate::domain::{ParamOverrides, TraversalOrder};

/// Parametric fractal trees: build, inspect and traverse branch geometry
#[derive(Parser, Debug)]
#[command(name = "fractree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, env = "FRACTREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree and print its shape summary
    Build {
        #[command(flatten)]
        tree: TreeArgs,
        /// Build sibling subtrees in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Print the tree as an indented outline
    Tree {
        #[command(flatten)]
        tree: TreeArgs,
    },

    /// Print one line per branch segment in traversal order
    Segments {
        #[command(flatten)]
        tree: TreeArgs,
        /// Traversal order (default: from config)
        #[arg(short, long, value_enum)]
        order: Option<OrderArg>,
    },

    /// Print the child angles of a single branch
    Spectrum {
        /// Parent angle in degrees
        #[arg(long, allow_negative_numbers = true)]
        angle: f64,
        /// Angle between siblings in degrees
        #[arg(long, allow_negative_numbers = true)]
        delta: f64,
        /// Number of children
        #[arg(long, allow_negative_numbers = true)]
        children: i32,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,
}

/// Tree parameter overrides, angles in degrees.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct TreeArgs {
    /// Root x coordinate
    #[arg(long, allow_negative_numbers = true)]
    pub x: Option<f64>,
    /// Root y coordinate
    #[arg(long, allow_negative_numbers = true)]
    pub y: Option<f64>,
    /// Trunk length
    #[arg(short, long)]
    pub length: Option<f64>,
    /// Trunk direction in degrees
    #[arg(short, long, allow_negative_numbers = true)]
    pub angle: Option<f64>,
    /// Branches per node
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    pub children: Option<i32>,
    /// Length ratio child/parent
    #[arg(short, long)]
    pub scale: Option<f64>,
    /// Angle between siblings in degrees
    #[arg(long, allow_negative_numbers = true)]
    pub delta: Option<f64>,
    /// Recursion depth
    #[arg(short = 'm', long)]
    pub max_depth: Option<usize>,
}

impl TreeArgs {
    /// Convert to domain overrides (degrees become radians).
    ///
    /// `x` and `y` are only meaningful together; a single one keeps the other
    /// coordinate of `base_start`.
    pub fn to_overrides(&self, base_start: DVec2) -> ParamOverrides {
        let start = match (self.x, self.y) {
            (None, None) => None,
            (x, y) => Some(DVec2::new(
                x.unwrap_or(base_start.x),
                y.unwrap_or(base_start.y),
            )),
        };
        ParamOverrides {
            start,
            length: self.length,
            angle: self.angle.map(f64::to_radians),
            num_children: self.children,
            length_scale: self.scale,
            delta_angle: self.delta.map(f64::to_radians),
            depth: None,
            max_depth: self.max_depth,
        }
    }
}

/// Command-line spelling of [`TraversalOrder`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    /// Level order
    #[value(alias = "bfs")]
    BreadthFirst,
    /// Pre-order
    #[value(alias = "dfs")]
    DepthFirst,
}

impl From<OrderArg> for TraversalOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::BreadthFirst => TraversalOrder::BreadthFirst,
            OrderArg::DepthFirst => TraversalOrder::DepthFirst,
        }
    }
}
