use crate::cmd::{load_store, scaffold_options, CliContext, ComponentFlags, GenerateFlags};
use crate::output::print_report;
use spinbox_core::request::{Mode, ProjectRequest};
use spinbox_core::scaffold;
use std::path::Path;

pub fn run(
    ctx: &CliContext,
    path: &Path,
    components: &ComponentFlags,
    profile: Option<String>,
    template: Option<String>,
    generate: &GenerateFlags,
) -> anyhow::Result<()> {
    let store = load_store()?;
    let cfg = ctx.global_config()?;

    // the configured default profile only applies when nothing was selected
    let profile = match profile {
        Some(p) => Some(p),
        None if components.is_empty() => cfg.default_profile.clone(),
        None => None,
    };
    let (with_deps, with_examples) = generate.resolve(&cfg);

    let mut builder = ProjectRequest::builder(path, Mode::Create)
        .components(components.selected())
        .profile(profile)
        .template(template)
        .with_deps(with_deps)
        .with_examples(with_examples);
    for name in &components.names {
        builder = builder.component_name(name.clone());
    }
    let request = builder.build(&store)?;

    let report = scaffold::create(&store, &request, &scaffold_options(&cfg))?;
    print_report(&report, ctx.json)?;
    if report.has_failures() {
        anyhow::bail!("some files could not be written");
    }
    Ok(())
}
