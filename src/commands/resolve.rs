//! # Resolve Command Implementation
//!
//! This module implements the `resolve` subcommand, which resolves a main
//! component and prints the components kept in the final model, in merge
//! order. With `--json` it prints the order and the merged template
//! variables as a JSON document.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::ComponentArgs;

/// Resolve a component and print the resolved components in merge order
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub component: ComponentArgs,

    /// Print `{"order": [...], "vars": {...}}` instead of one id per line.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `resolve` command.
pub fn execute(args: ResolveArgs) -> Result<()> {
    let (manager, model) = args.component.resolve()?;

    if args.json {
        let document = json!({
            "order": manager.order(),
            "vars": model.vars(),
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        for id in manager.order() {
            println!("{}", id);
        }
    }
    Ok(())
}
