use crate::cmd::CliContext;
use crate::output::{print_json, print_table};
use anyhow::Context;
use spinbox_core::project::ProjectRecord;
use spinbox_core::toolchain::{self, Toolchain};
use spinbox_core::types::join_components;

fn describe(t: &Toolchain) -> String {
    match (&t.runtime, &t.package_manager) {
        (Some(rt), Some(pm)) => format!("{} + {}", rt.display(), pm.display()),
        (Some(rt), None) => format!("{} (no package manager)", rt.display()),
        (None, _) => "not found".to_string(),
    }
}

pub fn run(ctx: &CliContext) -> anyhow::Result<()> {
    let record = ProjectRecord::load(&ctx.root)
        .with_context(|| format!("failed to read project record in {}", ctx.root.display()))?;
    let toolchains = toolchain::detect_all();

    if ctx.json {
        let value = serde_json::json!({
            "root": ctx.root,
            "project": record,
            "toolchains": toolchains,
        });
        return print_json(&value);
    }

    match &record {
        Some(r) => {
            println!("Project:    {}", r.name);
            println!("Root:       {}", ctx.root.display());
            println!("Profile:    {}", r.profile.as_deref().unwrap_or("-"));
            println!("Template:   {}", r.template.as_deref().unwrap_or("-"));
            println!("Components: {}", join_components(&r.components));
            println!("Generated:  {} files", r.generated.len());
            println!(
                "Updated:    {} (spinbox {})",
                r.updated_at.format("%Y-%m-%d %H:%M UTC"),
                r.spinbox_version
            );
        }
        None => println!("No spinbox project at {}", ctx.root.display()),
    }

    println!();
    let rows = toolchains
        .iter()
        .map(|t| {
            vec![
                t.ecosystem.label().to_string(),
                if t.is_ready() { "ready" } else { "missing" }.to_string(),
                describe(t),
            ]
        })
        .collect();
    print_table(&["TOOLCHAIN", "STATUS", "DETAIL"], rows);
    Ok(())
}
