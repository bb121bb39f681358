use std::path::PathBuf;

use clap::Args;
use coldcrm_store::ExportFilter;
use serde_json::json;

use crate::commands::{CommandContext, CommandResult};

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[arg(long, short, help = "Destination file; the .csv or .json extension picks the format")]
    pub output: PathBuf,
    #[arg(long, default_value = "all", help = "all | active | high")]
    pub filter: String,
}

pub fn run(context: &CommandContext, args: &ExportArgs) -> CommandResult {
    let filter = match args.filter.parse::<ExportFilter>() {
        Ok(filter) => filter,
        Err(message) => return CommandResult::bad_request("export", message),
    };
    let workspace = match context.open("export") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };

    match workspace.store.save(&args.output, filter) {
        Ok(written) => CommandResult::success_with(
            "export",
            format!("wrote {written} prospects to {}", args.output.display()),
            json!({ "path": args.output, "filter": format!("{filter:?}"), "prospects": written }),
        ),
        Err(error) => CommandResult::failure("export", "data_write", error.to_string(), 6),
    }
}
