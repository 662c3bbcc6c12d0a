use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;

/// Execute `tresor cp`. The destination is overwritten.
pub fn execute(ctx: &Context, source: &str, destination: &str) -> Result<()> {
    let sp = output::spinner(&format!("Copying {source} to {destination}..."));
    let result = ctx
        .objects()
        .copy_object(ctx.bucket(), source, destination);
    match result {
        Ok(attrs) => {
            output::finish_spinner(
                sp,
                &format!("Copied {source} to {destination} (generation {})", attrs.generation),
            );
            Ok(())
        }
        Err(e) => {
            sp.finish_and_clear();
            Err(e)
        }
    }
}
