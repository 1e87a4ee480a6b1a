pub mod cli;
pub mod colors;
pub mod commands;

pub use cli::{Cli, Commands, GenerateCommand, ListCommands, OasVersion};
pub use colors::Colors;

fn term_width() -> u16 {
  crossterm::terminal::size().map_or(100, |(width, _)| width)
}
