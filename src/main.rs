mod adapters;
mod cli;
mod config;
mod core;
#[cfg(test)]
mod test_support;

use clap::Parser;

use cli::context::Context;
use cli::{Cli, Commands};

fn main() {
    let args = Cli::parse();
    cli::logging::init(args.verbose);

    let result = Context::load(args.config.as_deref()).and_then(|ctx| match &args.command {
        Commands::Put {
            key,
            file,
            input,
            armor,
            recipient_key,
        } => cli::commands::put::execute(
            &ctx,
            key,
            file.as_deref(),
            *input,
            *armor,
            recipient_key.as_deref(),
        ),
        Commands::Get {
            key,
            output,
            generation,
        } => cli::commands::get::execute(&ctx, key, output.as_deref(), *generation),
        Commands::Cp {
            source,
            destination,
        } => cli::commands::cp::execute(&ctx, source, destination),
        Commands::Mv {
            source,
            destination,
        } => cli::commands::mv::execute(&ctx, source, destination),
        Commands::Rm { key } => cli::commands::rm::execute(&ctx, key),
        Commands::Info { key } => cli::commands::info::execute(&ctx, key),
        Commands::Ls { prefix, versions } => {
            cli::commands::ls::execute(&ctx, prefix.as_deref(), *versions)
        }
        Commands::Tree { prefix } => cli::commands::tree::execute(&ctx, prefix.as_deref()),
    });

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
