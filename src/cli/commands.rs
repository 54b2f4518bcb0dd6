//! Command dispatch

use std::io::{self, BufWriter, ErrorKind, Write};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::application::CurrentTree;
use crate::cli::args::{Cli, Commands, ConfigCommands, OrderArg, TreeArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, validate_params, Settings};
use crate::domain::{
    angle_spectrum, expected_node_count, traverse, TraversalOrder, TreeNode, TreeParams,
};
use crate::tree_traits::TreeNodeConvert;

/// Trees above this many nodes get a warning before they are built.
const LARGE_TREE_NODES: usize = 1_000_000;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Build { tree, parallel }) => cmd_build(cli, tree, *parallel),
        Some(Commands::Tree { tree }) => cmd_tree(cli, tree),
        Some(Commands::Segments { tree, order }) => cmd_segments(cli, tree, *order),
        Some(Commands::Spectrum {
            angle,
            delta,
            children,
        }) => cmd_spectrum(*angle, *delta, *children),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(cli),
            ConfigCommands::Path => cmd_config_path(cli),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run with --help for usage".into(),
        )),
    }
}

/// Settings layered with the command-line overrides, validated as a whole.
fn resolve_params(settings: &Settings, args: &TreeArgs) -> CliResult<TreeParams> {
    let base = settings.to_params();
    let params = base.merge(&args.to_overrides(base.start));
    validate_params(&params)?;
    Ok(params)
}

/// Refuse trees above `max_nodes`, warn about large ones.
fn check_size(params: &TreeParams, max_nodes: usize) -> CliResult<()> {
    let Ok(branching) = usize::try_from(params.num_children) else {
        // negative counts are rejected by construction
        return Ok(());
    };
    let levels = params.max_depth.saturating_sub(params.depth);
    let expected = expected_node_count(branching, levels);
    if expected > max_nodes {
        return Err(CliError::Usage(format!(
            "tree would have {} nodes, more than max_nodes = {} (raise it in the config file or with FRACTREE_MAX_NODES)",
            expected, max_nodes
        )));
    }
    if expected > LARGE_TREE_NODES {
        warn!(expected, "large tree requested");
        output::warning(&format!("building a tree with {} nodes", expected));
    }
    Ok(())
}

fn build_tree(settings: &Settings, args: &TreeArgs, parallel: bool) -> CliResult<Arc<TreeNode>> {
    let params = resolve_params(settings, args)?;
    debug!(?params, parallel, "building tree");
    check_size(&params, settings.max_nodes)?;
    let current = if parallel {
        CurrentTree::with_parallel_construction()
    } else {
        CurrentTree::new()
    };
    Ok(current.install(&params)?)
}

#[instrument(skip(cli))]
fn cmd_build(cli: &Cli, args: &TreeArgs, parallel: bool) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let tree = build_tree(&settings, args, parallel || settings.parallel)?;
    let (lo, hi) = tree.bounds();

    output::header("Fractal tree");
    output::stat("nodes", &tree.node_count());
    output::stat("leaves", &tree.leaf_count());
    output::stat("height", &tree.height());
    output::stat("branching", &tree.num_children());
    output::stat(
        "bounds",
        &format!("({:.2}, {:.2}) .. ({:.2}, {:.2})", lo.x, lo.y, hi.x, hi.y),
    );
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, args: &TreeArgs) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let tree = build_tree(&settings, args, settings.parallel)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_segments(cli: &Cli, args: &TreeArgs, order: Option<OrderArg>) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let tree = build_tree(&settings, args, settings.parallel)?;
    let order = order.map(Into::into).unwrap_or(settings.traversal);
    debug!(?order, "writing segments");

    end_of_output(write_segments(io::stdout().lock(), order, &tree))
}

fn write_segments(out: impl Write, order: TraversalOrder, tree: &TreeNode) -> CliResult<()> {
    let mut out = BufWriter::new(out);
    traverse(order, Some(tree), |node: &TreeNode| -> CliResult<()> {
        writeln!(out, "{}", segment_line(node))?;
        Ok(())
    })?;
    out.flush()?;
    Ok(())
}

/// A reader that stops early (`fractree segments | head`) ends the output normally.
fn end_of_output(result: CliResult<()>) -> CliResult<()> {
    match result {
        Err(CliError::Output(e)) if e.kind() == ErrorKind::BrokenPipe => {
            debug!("output closed by reader");
            Ok(())
        }
        other => other,
    }
}

/// `depth start_x start_y end_x end_y angle°`, tab separated
fn segment_line(node: &TreeNode) -> String {
    let (start, end) = (node.start(), node.end());
    let coords = [start.x, start.y, end.x, end.y, node.angle().to_degrees()]
        .iter()
        .map(|v| format!("{:.4}", v))
        .join("\t");
    format!("{}\t{}", node.depth(), coords)
}

#[instrument]
fn cmd_spectrum(angle: f64, delta: f64, children: i32) -> CliResult<()> {
    let spectrum = angle_spectrum(angle.to_radians(), delta.to_radians(), children)?;
    let degrees = spectrum
        .iter()
        .map(|a| format!("{:.4}", a.to_degrees()))
        .join(", ");
    output::info(&format!("[{}]", degrees));
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    output::header("# merged settings");
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(cli: &Cli) -> CliResult<()> {
    match global_config_path() {
        Some(path) => output::stat("global", &path.display()),
        None => output::stat("global", "<no home directory>"),
    }
    match &cli.config {
        Some(path) => output::stat("local", &path.display()),
        None => output::stat("local", "<none>"),
    }
    Ok(())
}
