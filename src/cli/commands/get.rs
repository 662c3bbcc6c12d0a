use std::io::Write;
use std::path::Path;

use crate::cli::context::{self, Context};
use crate::cli::output;
use crate::config::app_config::InputMode;
use crate::core::errors::Result;
use crate::core::models::object_attrs::Generation;
use crate::core::models::payload::SignatureStatus;

/// Execute `tresor get`.
///
/// Plaintext goes to `output` or stdout; status lines go to stderr.
pub fn execute(
    ctx: &Context,
    key: &str,
    output_path: Option<&Path>,
    generation: Option<Generation>,
) -> Result<()> {
    let keyring = ctx.keys.load_keyring(&ctx.config.private_key_path())?;
    let prompt = context::passphrase_prompt(InputMode::File);

    let object = ctx
        .objects()
        .get_object(ctx.bucket(), key, generation, &keyring, prompt.as_ref())?;

    match output_path {
        Some(path) => {
            std::fs::write(path, object.plaintext.as_slice())?;
            output::success(&format!("Wrote {key} to {}", path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&object.plaintext)?;
            stdout.flush()?;
        }
    }

    match &object.signature {
        SignatureStatus::Verified { signer } => {
            output::success(&format!("Good signature from key {signer}"))
        }
        SignatureStatus::Unsigned => output::warning("Object is not signed"),
        SignatureStatus::UnknownSigner { issuer } => output::warning(&format!(
            "Signed by key {issuer}, which is not in your keyring; signature not checked"
        )),
        // into_verified already refused failed signatures
        SignatureStatus::Failed { .. } => {}
    }
    Ok(())
}
