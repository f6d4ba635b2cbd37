mod findup;
mod image;
mod massage;
mod sh;

use clap::{Parser, Subcommand};

/// xtask command-line interface
#[derive(Parser)]
#[command(name = "xtask", version, about = "Merlin auxiliary tasks")]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Command,
}

/// Supported subcommands
#[derive(Subcommand)]
enum Command {
    /// Run the 'massage' task
    Massage(massage::MassageArgs),
    /// Build a demo and write the testbench memory image
    Image(image::ImageArgs),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Massage(args) => massage::run(args),
        Command::Image(args) => image::run(args),
    };

    if let Err(e) = result {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
