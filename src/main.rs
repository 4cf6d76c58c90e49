// A memory book of event pictures made with the Bevy game engine.

use clap::Parser;
use memory_book::content::admin::run_admin;
use memory_book::core::cli::Command;
use memory_book::core::errors::BookResult;
use memory_book::utils::logger::init_custom_logger;
use memory_book::{create_app, CliArgs};

fn run(cli_args: CliArgs) -> BookResult<()> {
    if let Some(Command::Admin(command)) = &cli_args.command {
        return run_admin(&cli_args, command);
    }
    create_app(cli_args)?.run();
    Ok(())
}

fn main() {
    let cli_args = CliArgs::parse();
    init_custom_logger(cli_args.debug);

    if let Err(e) = run(cli_args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
