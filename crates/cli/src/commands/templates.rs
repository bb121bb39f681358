use clap::Args;
use coldcrm_core::templates::{self, TEMPLATES};
use coldcrm_core::ProspectId;
use serde_json::json;

use crate::commands::{CommandContext, CommandResult};

#[derive(Debug, Clone, Default, Args)]
pub struct TemplatesArgs {
    #[arg(long, help = "Template to render, e.g. \"Initial Outreach\"")]
    pub name: Option<String>,
    #[arg(long, requires = "name", help = "Prospect id used to personalize the template")]
    pub prospect: Option<u64>,
}

pub fn run(context: &CommandContext, args: &TemplatesArgs) -> CommandResult {
    let Some(name) = args.name.as_deref() else {
        return CommandResult::success_with(
            "templates",
            format!("{} templates available", TEMPLATES.len()),
            &TEMPLATES,
        );
    };

    let Some(template) = templates::find(name) else {
        let known: Vec<&str> = TEMPLATES.iter().map(|template| template.name).collect();
        return CommandResult::bad_request(
            "templates",
            format!("unknown template `{name}` (expected one of: {})", known.join(", ")),
        );
    };

    let Some(id) = args.prospect else {
        let message = format!("template `{}`", template.name);
        return CommandResult::success_with("templates", message, template);
    };

    let workspace = match context.open("templates") {
        Ok(workspace) => workspace,
        Err(failure) => return failure,
    };
    let Some(prospect) = workspace.store.get(ProspectId(id)) else {
        return CommandResult::bad_request("templates", format!("prospect {id} does not exist"));
    };

    let rendered = template.personalize(prospect);
    CommandResult::success_with(
        "templates",
        format!("`{}` personalized for {}", template.name, prospect.name),
        json!({
            "template": template.name,
            "prospect": id,
            "to": prospect.email,
            "email": rendered,
        }),
    )
}
