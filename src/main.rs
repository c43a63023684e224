use std::path::PathBuf;
use std::process::ExitCode;
use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;
use keyrules::config::{Config, DEFAULT_CONFIG_PATH};

#[derive(ClapParser, Debug)]
#[clap(author, version, about = "Runs key event rule scripts", long_about = None)]
pub struct Args {
    #[clap(long, global = true, default_value = DEFAULT_CONFIG_PATH, help = "Path to config file")]
    pub config: PathBuf,

    #[clap(long, global = true, help = "Print debug log output")]
    pub debug: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the rules against incoming key events
    Run,
    /// Parse the rules and print the syntax tree
    Check,
    /// Print the token stream of the rules
    Tokens,
    /// List the input devices key events can be read from
    List,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("{},hyper=warn", level)))
        .init();

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::FAILURE
        },
    }
}

fn execute(args: &Args) -> anyhow::Result<()> {
    let config = || Config::load(&args.config);

    match args.command {
        Command::Run => keyrules::run(&config()?)?,
        Command::Check => print!("{}", keyrules::check(&config()?.rules)?),
        Command::Tokens => println!("{:?}", keyrules::tokens(&config()?.rules)?),
        Command::List => {
            for (path, name) in keyrules::list_devices() {
                println!("{:<20} {}", path.display(), name);
            }
        },
    }

    Ok(())
}
