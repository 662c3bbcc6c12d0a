use crate::cli::context::Context;
use crate::core::errors::Result;
use crate::core::models::object_attrs::ObjectAttrs;

/// Execute `tresor ls`: one line per object, or per generation with `--versions`.
pub fn execute(ctx: &Context, prefix: Option<&str>, versions: bool) -> Result<()> {
    let listing = ctx
        .objects()
        .list_objects(ctx.bucket(), prefix, versions)?;

    for attrs in &listing {
        println!("{}", line(attrs, versions));
    }
    Ok(())
}

fn line(attrs: &ObjectAttrs, versions: bool) -> String {
    let mut line = format!(
        "{}  {:>10}  ",
        attrs.updated.format("%Y-%m-%d %H:%M:%S"),
        attrs.size
    );
    if versions {
        line.push_str(&format!("{:>18}  ", attrs.generation));
    }
    line.push_str(&attrs.name);
    if versions && !attrs.live {
        line.push_str("  (noncurrent)");
    }
    line
}
