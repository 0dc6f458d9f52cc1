use crate::prelude::*;
use clap::Parser;

mod docker;
mod googleapis;
mod prelude;
mod request;
mod run;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generates the google-cloud-dlp-v2 gem with the GAPIC microgenerator and merges it into the repository"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Option<SubCommands>,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "SYNTH_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Generate the library and merge it into the destination (default)
    Run(crate::run::RunOptions),

    /// Generate the library only and print where it was written
    Generate(crate::run::GenerateOptions),

    /// Print the generation request as JSON
    Request(crate::request::RequestOptions),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        Some(SubCommands::Run(options)) => crate::run::run(options, app.global),
        Some(SubCommands::Generate(options)) => crate::run::generate(options, app.global),
        Some(SubCommands::Request(options)) => crate::request::run(options, app.global),
        None => crate::run::run(crate::run::RunOptions::from_env(), app.global),
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
