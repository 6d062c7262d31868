use std::fmt::Display;
use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::random::{RandomSource, SeededRandom};
use crate::tree::Tree;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let seed = cli.seed.or(settings.seed);
    debug!(?seed, "settings loaded");

    match &cli.command {
        Some(Commands::Demo { depth, swaps }) => _demo(&settings, seed, *depth, *swaps),
        Some(Commands::Shuffle {
            values,
            swaps,
            level,
            grandchildren,
        }) => _shuffle(&settings, seed, values, *swaps, *level, *grandchildren),
        Some(Commands::Show { depth }) => _show(&settings, seed, *depth),
        Some(Commands::Config { command }) => _config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "hipstree", &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn random_source(seed: Option<u64>) -> SeededRandom {
    match seed {
        Some(seed) => SeededRandom::new(seed),
        None => SeededRandom::from_entropy(),
    }
}

/// First and last `count` leaves around `...`, walking the leaf iterator once.
pub fn head_tail<T: Display, R: RandomSource>(tree: &Tree<T, R>, count: usize, separator: &str) -> String {
    let total = tree.leaf_count();
    if count.saturating_mul(2) >= total {
        return tree.to_string_with(separator);
    }
    let mut it = tree.iter();
    let head = it.by_ref().take(count).map(|(_, node)| node).join(separator);
    let tail = it
        .skip(total - 2 * count)
        .map(|(_, node)| node)
        .join(separator);
    format!("{}{}...{}{}", head, separator, separator, tail)
}

/// Leaf values read through a fresh set of leaf handles.
pub fn leaf_handle_line<T: Display, R: RandomSource>(
    tree: &mut Tree<T, R>,
    separator: &str,
) -> CliResult<String> {
    Ok(tree
        .in_order_leaves()?
        .iter()
        .map(|leaf| leaf.value())
        .join(separator))
}

/// Overwrites the third leaf through its handle; the handles are dropped on return.
pub fn set_third_leaf<T, R: RandomSource>(tree: &mut Tree<T, R>, value: T) -> CliResult<()> {
    if let Some(leaf) = tree.in_order_leaves()?.get_mut(2) {
        leaf.set_value(value);
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _demo(
    settings: &Settings,
    seed: Option<u64>,
    depth: Option<usize>,
    swaps: Option<usize>,
) -> CliResult<()> {
    let mut settings = settings.clone();
    if let Some(depth) = depth {
        settings.demo.depth = depth;
    }
    if let Some(swaps) = swaps {
        settings.demo.swaps = swaps;
    }
    settings.validate()?;
    let sep = settings.separator.as_str();

    let mut tree: Tree<usize> = Tree::with_source(random_source(seed));
    output::action("Empty tree", &tree.to_string_with(sep));

    tree.populate_by_vector(vec![0, 1, 2, 3])?;
    output::action("Tree populated", &tree.to_string_with(sep));

    tree.populate_by_vector(vec![5, 6, 7, 8])?;
    output::action("New tree populated", &tree.to_string_with(sep));

    tree.swap_at_level(0)?;
    output::action("Tree with root node swapped", &tree.to_string_with(sep));

    let level = tree.swap_at_random_level()?;
    output::action(
        &format!("Tree with node swapped at level {}", level),
        &tree.to_string_with(sep),
    );

    tree.populate_by_vector((0..8).collect())?;
    output::action("Leaf node values", &leaf_handle_line(&mut tree, sep)?);

    set_third_leaf(&mut tree, 400)?;
    output::action(
        "Leaf node values after one has been changed",
        &leaf_handle_line(&mut tree, sep)?,
    );
    output::action("Leaf values", &tree.in_order_values()?.iter().join(sep));

    output::header("=== Large Tree Demo ===");
    let depth = settings.demo.depth;
    tree.populate_by_vector((0..1usize << (depth - 1)).collect())?;
    output::info(&format!(
        "Initial tree with {} levels and {} leaves:",
        depth,
        tree.leaf_count()
    ));
    output::info(&head_tail(&tree, settings.demo.print_count, " "));

    for i in 0..settings.demo.swaps {
        let level = tree.swap_at_random_level()?;
        output::header(&format!("Swap {} (level {})", i, level));
        output::info(&head_tail(&tree, settings.demo.print_count, " "));
    }
    Ok(())
}

#[instrument(skip(settings, values))]
fn _shuffle(
    settings: &Settings,
    seed: Option<u64>,
    values: &[String],
    swaps: usize,
    level: Option<usize>,
    grandchildren: bool,
) -> CliResult<()> {
    let mut tree = Tree::from_values_with_source(values.to_vec(), random_source(seed))?;
    for _ in 0..swaps {
        match (level, grandchildren) {
            (Some(level), false) => tree.swap_at_level(level)?,
            (Some(level), true) => tree.swap_grandchildren_at_level(level)?,
            (None, false) => {
                tree.swap_at_random_level()?;
            }
            (None, true) => {
                tree.swap_grandchildren_at_random_level()?;
            }
        }
    }
    output::info(&tree.to_string_with(&settings.separator));
    Ok(())
}

#[instrument(skip(settings))]
fn _show(settings: &Settings, seed: Option<u64>, depth: usize) -> CliResult<()> {
    if depth == 0 || depth > settings.max_depth {
        return Err(CliError::InvalidArgs(format!(
            "depth must be in 1..={}, got {}",
            settings.max_depth, depth
        )));
    }
    let mut tree: Tree<usize> = Tree::with_source(random_source(seed));
    tree.populate_by_vector((0..1usize << (depth - 1)).collect())?;
    output::info(&tree.to_termtree());
    Ok(())
}

fn _config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::action("Global config", &path.display()),
            None => output::action("Global config", "(no home directory)"),
        },
    }
    Ok(())
}
