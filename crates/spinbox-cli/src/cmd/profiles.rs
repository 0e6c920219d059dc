use crate::cmd::{load_store, CliContext};
use crate::output::{print_json, print_table};
use spinbox_core::catalog::{ExampleQuery, Profile};
use spinbox_core::resolve::active_ecosystems;
use spinbox_core::TemplateStore;

pub fn run(ctx: &CliContext, name: Option<&str>) -> anyhow::Result<()> {
    let store = load_store()?;
    match name {
        Some(n) => show(&store, store.profile(n)?, ctx.json),
        None => list(&store, ctx.json),
    }
}

fn components_of(profile: &Profile) -> Vec<&'static str> {
    profile.components.iter().map(|c| c.as_str()).collect()
}

fn list(store: &TemplateStore, json: bool) -> anyhow::Result<()> {
    if json {
        let items: Vec<serde_json::Value> = store
            .profiles()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "description": p.description,
                    "components": components_of(p),
                    "template": p.template,
                })
            })
            .collect();
        return print_json(&items);
    }

    let rows = store
        .profiles()
        .map(|p| {
            vec![
                p.name.clone(),
                components_of(p).join(", "),
                p.template.clone().unwrap_or_else(|| "-".to_string()),
                p.description.clone(),
            ]
        })
        .collect();
    print_table(&["NAME", "COMPONENTS", "TEMPLATE", "DESCRIPTION"], rows);

    println!();
    let rows = store
        .templates()
        .map(|t| vec![t.name.clone(), t.packages.len().to_string(), t.description.clone()])
        .collect();
    print_table(&["TEMPLATE", "PACKAGES", "DESCRIPTION"], rows);
    Ok(())
}

fn show(store: &TemplateStore, profile: &Profile, json: bool) -> anyhow::Result<()> {
    let members = profile.component_set();
    let ecosystems: Vec<&str> = active_ecosystems(&members)
        .into_iter()
        .map(|e| e.label())
        .collect();
    let examples = store.lookup_examples(&ExampleQuery::fresh(&members, Some(profile)));
    let template = profile
        .template
        .as_deref()
        .map(|t| store.template(t))
        .transpose()?;

    if json {
        let value = serde_json::json!({
            "name": profile.name,
            "description": profile.description,
            "components": profile.components.iter().map(|c| serde_json::json!({
                "name": c.as_str(),
                "description": c.description(),
            })).collect::<Vec<_>>(),
            "ecosystems": ecosystems,
            "template": template.map(|t| serde_json::json!({
                "name": t.name,
                "packages": t.packages.iter().map(|p| format!("{}{}", p.name, p.constraint)).collect::<Vec<_>>(),
            })),
            "examples": examples.iter().map(|e| &e.path).collect::<Vec<_>>(),
        });
        return print_json(&value);
    }

    println!("{}: {}", profile.name, profile.description);
    println!("  components: {}", components_of(profile).join(", "));
    for c in &profile.components {
        println!("    {:<12}{}", c.as_str(), c.description());
    }
    println!("  ecosystems: {}", ecosystems.join(", "));
    match template {
        Some(t) => {
            println!("  template:   {} ({})", t.name, t.description);
            for p in &t.packages {
                println!("    {}{}", p.name, p.constraint);
            }
        }
        None => println!("  template:   -"),
    }
    println!("  examples:   {}", examples.len());
    Ok(())
}
