//! Roles command - List configured agent roles.

use anyhow::Result;
use clap::Args;
use forge_agents::RoleRegistry;

#[derive(Args)]
pub struct RolesArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(args: RolesArgs) -> Result<()> {
    let registry = RoleRegistry::standard();

    if args.json {
        let roles: serde_json::Map<String, serde_json::Value> = registry
            .configs()
            .map(|config| {
                (
                    config.role.as_str().to_string(),
                    serde_json::json!({
                        "displayName": config.display_name,
                        "description": config.description,
                        "userFacing": config.is_user_facing,
                        "tools": config.tool_names,
                    }),
                )
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&roles)?);
        return Ok(());
    }

    for config in registry.configs() {
        let marker = if config.is_user_facing { " (user-facing)" } else { "" };
        println!("{}{}", config.role, marker);
        println!("   {}", config.description);
        println!("   tools: {}", config.tool_names.join(", "));
    }
    Ok(())
}
