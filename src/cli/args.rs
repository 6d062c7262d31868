//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Complete binary leaf tree with seeded subtree and grandchild swaps
#[derive(Parser, Debug)]
#[command(name = "hipstree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Seed for the random source (default: config, then OS entropy)
    #[arg(short, long, global = true)]
    pub seed: Option<u64>,

    /// Config file (TOML), layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk through the tree operations on sample trees
    Demo {
        /// Layers of the large tree (default: demo.depth)
        #[arg(long)]
        depth: Option<usize>,
        /// Random swaps on the large tree (default: demo.swaps)
        #[arg(long)]
        swaps: Option<usize>,
    },

    /// Build a tree from values, apply swaps, print the leaf order
    Shuffle {
        /// Leaf values; the count must be a power of two
        #[arg(required = true)]
        values: Vec<String>,
        /// Number of swaps to apply
        #[arg(short = 'n', long, default_value_t = 1)]
        swaps: usize,
        /// Swap at this level instead of a random one
        #[arg(short, long)]
        level: Option<usize>,
        /// Cross-swap grandchildren instead of whole subtrees
        #[arg(short, long)]
        grandchildren: bool,
    },

    /// Print the shape of a tree with leaves 0..2^(depth-1)
    Show {
        /// Layers of the tree
        #[arg(long, default_value_t = 3)]
        depth: usize,
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
