//! # Find Command Implementation
//!
//! This module implements the `find` subcommand. It resolves a main component,
//! then searches a file (`--file`) or a directory (`--dir`) in every fetched
//! component, templating them with the merged `vars` and the `--var` flags.
//!
//! Matching absolute paths are printed one per line. With `--prefix P` they
//! are printed on one line, each preceded by `P`, ready to be passed as
//! repeated flags to another tool (`--prefix -i` prints `-i /a -i /b`).
//!
//! Templated copies are released before exiting unless `--keep` is given.

use anyhow::{bail, Result};
use clap::{ArgGroup, Args};

use super::ComponentArgs;

/// Resolve a component and search a file or directory in the resolved components
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("entry").required(true).args(["file", "dir"])))]
pub struct FindArgs {
    #[command(flatten)]
    pub component: ComponentArgs,

    /// Relative path of the file to search.
    #[arg(long, value_name = "NAME")]
    pub file: Option<String>,

    /// Relative path of the directory to search.
    #[arg(long, value_name = "NAME")]
    pub dir: Option<String>,

    /// Token printed before every path.
    #[arg(long, value_name = "PREFIX", allow_hyphen_values = true)]
    pub prefix: Option<String>,

    /// Keep templated copies instead of releasing them.
    #[arg(long)]
    pub keep: bool,
}

/// Execute the `find` command.
pub fn execute(args: FindArgs) -> Result<()> {
    let (manager, model) = args.component.resolve()?;
    let ctx = args.component.model_context(&model);

    let (name, found) = match (&args.file, &args.dir) {
        (Some(file), _) => (file, manager.contains_file(file, &ctx, &[])),
        (None, Some(dir)) => (dir, manager.contains_directory(dir, &ctx, &[])),
        (None, None) => bail!("one of --file or --dir is required"),
    };

    if found.is_empty() {
        bail!("'{}' not found in any resolved component", name);
    }

    match &args.prefix {
        Some(prefix) => println!("{}", found.prefix_paths(prefix).join(" ")),
        None => {
            for path in &found {
                println!("{}", path.absolute_path().display());
            }
        }
    }

    if !args.keep {
        found.release();
    }
    Ok(())
}
