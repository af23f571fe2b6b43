//! Tanbake - bake tangent bases into interleaved vertex buffers
//!
//! Examples:
//!   tanbake bake res/mdl/sphere.mdl -o sphere.bin
//!   tanbake cube --min -2,-1,-1 --max 2,1,1 -o cube.bin
//!   tanbake inspect --baked sphere.bin
use clap::Parser;
use std::io::stdout;
use tanbake_cli::{App, Cli};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.resolve_config()?;
    let app = App::new(config);

    app.run(&cli.command, &mut stdout())
}
