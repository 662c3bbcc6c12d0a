use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;

/// Execute `tresor mv`: copy with metadata, then remove the source.
pub fn execute(ctx: &Context, source: &str, destination: &str) -> Result<()> {
    let attrs = output::with_spinner(&format!("Moving {source} to {destination}..."), || {
        ctx.objects()
            .move_object(ctx.bucket(), source, destination)
    })?;
    output::success(&format!(
        "Moved {source} to {destination} (generation {})",
        attrs.generation
    ));
    Ok(())
}
