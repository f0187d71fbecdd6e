mod app;
mod args;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::FmtSubscriber;

use crate::{app::App, args::Args};

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut app = App::new(args)?;
    app.run()
}
