use std::io::Read;
use std::path::Path;

use zeroize::Zeroizing;

use crate::adapters::prompt::terminal_prompt::TerminalPrompt;
use crate::cli::context::{self, Context};
use crate::cli::output;
use crate::config::app_config::InputMode;
use crate::core::errors::{Result, TresorError};
use crate::core::models::object_metadata::ObjectMetadata;
use crate::core::services::object_service::PutRequest;

/// Execute `tresor put`.
///
/// Reads the plaintext from a file, stdin or the terminal, encrypts it for
/// the configured identity (or the key in `recipient_key`), signs it unless
/// signing is disabled, and uploads it together with its metadata record.
pub fn execute(
    ctx: &Context,
    key: &str,
    file: Option<&Path>,
    input: Option<InputMode>,
    armor: bool,
    recipient_key: Option<&Path>,
) -> Result<()> {
    let mode = match (file, input) {
        (Some(_), None | Some(InputMode::File)) => InputMode::File,
        (Some(_), Some(other)) => {
            return Err(TresorError::InvalidConfig {
                detail: format!("--file cannot be combined with --input {other:?}"),
            });
        }
        (None, Some(mode)) => mode,
        (None, None) => ctx.config.tresor.input,
    };

    let prompt = context::passphrase_prompt(mode);
    let plaintext = read_plaintext(mode, file)?;

    let label = &ctx.config.tresor.identity;
    let recipient = match recipient_key {
        Some(path) => ctx.keys.load_key(path)?,
        None => ctx.keys.select_identity(&ctx.config.keyring_path(), label)?,
    };
    let signer = if ctx.config.tresor.sign {
        Some(ctx.keys.select_identity(&ctx.config.private_key_path(), label)?)
    } else {
        None
    };

    let extension = file.and_then(ObjectMetadata::extension_of);
    let request = PutRequest {
        key,
        plaintext: &plaintext,
        recipient: &recipient,
        signer: signer.as_ref(),
        extension: extension.as_deref(),
        armored: armor || ctx.config.tresor.armor,
    };

    let attrs = ctx
        .objects()
        .put_object(ctx.bucket(), &request, prompt.as_ref())?;
    output::success(&format!(
        "Stored {key} (generation {}, {} bytes)",
        attrs.generation, attrs.size
    ));
    Ok(())
}

fn read_plaintext(mode: InputMode, file: Option<&Path>) -> Result<Zeroizing<Vec<u8>>> {
    match mode {
        InputMode::File => {
            let path = file.ok_or_else(|| TresorError::InvalidConfig {
                detail: "input mode 'file' needs --file <path>".into(),
            })?;
            let bytes = std::fs::read(path).map_err(|e| TresorError::InvalidConfig {
                detail: format!("cannot read {}: {e}", path.display()),
            })?;
            Ok(Zeroizing::new(bytes))
        }
        InputMode::Stdin => {
            let mut bytes = Zeroizing::new(Vec::new());
            std::io::stdin().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
        InputMode::Interactive => TerminalPrompt::read_confirmed("Enter secret: ", || {
            output::warning("Entries do not match, try again.")
        }),
    }
}
