use colored::Colorize;

use crate::cli::context::Context;
use crate::core::errors::Result;
use crate::core::services::object_service::ObjectDescription;

/// Execute `tresor info`.
pub fn execute(ctx: &Context, key: &str) -> Result<()> {
    let description = ctx
        .objects()
        .describe_object(ctx.bucket(), key)?;
    print!("{}", render(&description));
    Ok(())
}

fn render(description: &ObjectDescription) -> String {
    let attrs = &description.attrs;
    let mut lines = vec![
        field("Name", &attrs.name),
        field("Generation", &attrs.generation.to_string()),
        field("Size", &format!("{} bytes", attrs.size)),
        field("Updated", &attrs.updated.to_rfc3339()),
        field("Content-Type", attrs.content_type.as_deref().unwrap_or("-")),
        field("MD5", attrs.md5.as_deref().unwrap_or("-")),
    ];

    match &description.metadata {
        Some(meta) => {
            lines.push(field("Encryption-Key", &meta.encryption_key));
            lines.push(field(
                "Signing-Key",
                meta.signing_key.as_deref().unwrap_or("unsigned"),
            ));
            lines.push(field(
                "File-Extension",
                meta.file_extension.as_deref().unwrap_or("none"),
            ));
            lines.push(field("ASCII-Armor", &meta.ascii_armor.to_string()));
        }
        None => lines.push(format!("  {}", "no tresor metadata record".yellow())),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn field(name: &str, value: &str) -> String {
    format!("  {:<15} {value}", format!("{name}:").bold())
}
