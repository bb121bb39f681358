use std::path::PathBuf;

use clap::Args;
use coldcrm_store::read_records;
use serde_json::json;

use crate::commands::{CommandContext, CommandResult};

#[derive(Debug, Clone, Default, Args)]
pub struct ImportArgs {
    #[arg(help = "Prospect file (.csv or .json) appended under fresh ids")]
    pub file: PathBuf,
    #[arg(long, help = "Write the updated table to this .csv or .json file")]
    pub save: Option<PathBuf>,
}

pub fn run(context: &CommandContext, args: &ImportArgs) -> CommandResult {
    let mut workspace = match context.open("import") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let records = match read_records(&args.file) {
        Ok(records) => records,
        Err(error) => {
            let message = format!("failed to read `{}`: {error}", args.file.display());
            return CommandResult::failure("import", "data_load", message, 3);
        }
    };
    let ids = match workspace.store.import(records) {
        Ok(ids) => ids,
        Err(error) => return CommandResult::store_failure("import", error),
    };
    if let Err(failure) = workspace.save_to("import", args.save.as_deref()) {
        return failure;
    }

    CommandResult::success_with(
        "import",
        format!("imported {} prospects, table now holds {}", ids.len(), workspace.store.len()),
        json!({
            "file": args.file,
            "ids": ids.iter().map(|id| id.0).collect::<Vec<_>>(),
            "prospects": workspace.store.len(),
            "saved_to": args.save,
        }),
    )
}
