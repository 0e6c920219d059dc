use crate::cmd::{load_store, scaffold_options, CliContext, ComponentFlags, GenerateFlags};
use crate::output::print_report;
use spinbox_core::request::{Mode, ProjectRequest};
use spinbox_core::scaffold;

pub fn run(
    ctx: &CliContext,
    components: &ComponentFlags,
    template: Option<String>,
    generate: &GenerateFlags,
) -> anyhow::Result<()> {
    let store = load_store()?;
    let cfg = ctx.global_config()?;
    let (with_deps, with_examples) = generate.resolve(&cfg);

    let mut builder = ProjectRequest::builder(&ctx.root, Mode::Add)
        .components(components.selected())
        .template(template)
        .with_deps(with_deps)
        .with_examples(with_examples);
    for name in &components.names {
        builder = builder.component_name(name.clone());
    }
    let request = builder.build(&store)?;

    let report = scaffold::add(&store, &request, &scaffold_options(&cfg))?;
    print_report(&report, ctx.json)?;
    if report.has_failures() {
        anyhow::bail!("some files could not be written");
    }
    Ok(())
}
