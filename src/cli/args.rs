//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::application::Strategy;
use crate::domain::TreeSource;

const TREE_HELP: &str = "Tree: 'k=N' (random tree of N..10N), '5,3,8' (BST insertion order), \
'((1) 2 (3))' (explicit shape) or 'empty'. Values may be negative ('-3,1'), so pass options \
after the trees";

/// Walk binary trees concurrently and compare their in-order values
#[derive(Parser, Debug)]
#[command(name = "treewalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Verbose results
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (replaces ./.treewalk.toml)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by commands that build trees.
#[derive(Args, Debug, Clone, Default)]
pub struct TreeOpts {
    /// RNG seed for generated trees
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of values in a generated tree
    #[arg(long)]
    pub size: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a tree's in-order values, produced by a channel walker
    Walk {
        #[arg(help = TREE_HELP, allow_hyphen_values = true)]
        tree: TreeSource,

        #[command(flatten)]
        opts: TreeOpts,

        /// Channel buffer (0 = unbuffered handoff)
        #[arg(long)]
        capacity: Option<usize>,
    },

    /// Print a tree
    Show {
        #[arg(help = TREE_HELP, allow_hyphen_values = true)]
        tree: TreeSource,

        #[command(flatten)]
        opts: TreeOpts,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ShowFormat::Paren)]
        format: ShowFormat,
    },

    /// Compare the in-order values of two trees (exit 1 if different)
    Same {
        #[arg(help = TREE_HELP, allow_hyphen_values = true)]
        left: TreeSource,

        #[arg(help = TREE_HELP, allow_hyphen_values = true)]
        right: TreeSource,

        #[command(flatten)]
        opts: TreeOpts,

        /// Comparison strategy
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Channel buffer per walker (0 = unbuffered handoff)
        #[arg(long)]
        capacity: Option<usize>,
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
    /// Show effective settings as TOML
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowFormat {
    /// `((1) 2 (3))`
    #[default]
    Paren,
    /// Indented diagram
    Tree,
}
