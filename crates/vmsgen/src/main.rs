#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ui::{Cli, Colors, Commands, ListCommands, colors};

mod generator;
mod ui;
mod utils;

/// Installs the diagnostic subscriber on stderr. `RUST_LOG` wins over the
/// verbosity count.
fn init_tracing(verbosity: u8, json: bool) {
  let default_level = match verbosity {
    0 => "error",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("vmsgen={default_level}")));

  let registry = tracing_subscriber::registry().with(filter);
  if json {
    registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
  } else {
    registry
      .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
      .init();
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose, cli.log_json);
  let colors = Colors::new(colors::colors_enabled(cli.color), colors::detect_theme(cli.theme));

  match cli.command {
    Commands::List { list_command } => match list_command {
      ListCommands::Packages {
        metamodel,
        navigation,
        show_unreleased,
      } => ui::commands::list_packages(&metamodel, navigation.as_deref(), show_unreleased, &colors).await?,
    },
    Commands::Generate(command) => {
      let config = ui::commands::GenerateConfig::from_command(command, cli.verbose)?;
      ui::commands::generate_documents(config, &colors).await?;
    }
  }

  Ok(())
}
