use crate::cli::context::Context;
use crate::cli::output;
use crate::core::errors::Result;
use crate::core::models::object_attrs::DeletePolicy;

/// Execute `tresor rm`.
pub fn execute(ctx: &Context, key: &str) -> Result<()> {
    output::with_spinner(&format!("Removing {key}..."), || {
        ctx.objects().remove_object(ctx.bucket(), key)
    })?;

    match ctx.config.storage.delete_policy {
        DeletePolicy::Retain => output::success(&format!(
            "Removed {key} (noncurrent generations stay readable with --version)"
        )),
        DeletePolicy::Purge => output::success(&format!("Removed {key} and all its generations")),
    }
    Ok(())
}
