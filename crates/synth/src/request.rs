use crate::prelude::{println, *};
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
pub struct RequestOptions {
    /// Read the generation request from a synth.toml file instead of the built-in DLP V2 request
    #[arg(long, env = "SYNTH_CONFIG")]
    pub config: Option<PathBuf>,
}

pub fn run(options: RequestOptions, _global: crate::Global) -> Result<()> {
    let request = crate::run::load_request(options.config.as_deref())?;
    let json =
        serde_json::to_string_pretty(&request).context("Failed to serialize generation request")?;
    println!("{json}");
    Ok(())
}
