use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use super::colors::{ColorMode, Colors, ThemeMode};

#[derive(Parser, Debug)]
#[command(name = "vmsgen")]
#[command(author, version, about = "vAPI metamodel to OpenAPI / Swagger generator")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,

  /// Increase diagnostic verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = ArgAction::Count, global = true)]
  pub verbose: u8,

  /// Emit diagnostics as JSON lines on stderr
  #[arg(long, default_value_t = false, global = true)]
  pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from a metamodel directory
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate OpenAPI documents from a metamodel directory
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateCommand {
  /// Directory holding one JSON document per metamodel component
  #[arg(short, long, value_name = "DIR")]
  pub metamodel: PathBuf,

  /// Recorded rest navigation answers used for services without routing metadata
  #[arg(short, long, value_name = "FILE")]
  pub navigation: Option<PathBuf>,

  /// Directory the documents are written to
  #[arg(short, long, value_name = "DIR", default_value = ".")]
  pub output: PathBuf,

  /// Output document flavour
  #[arg(long, value_enum, default_value = "3")]
  pub oas: OasVersion,

  /// Separator joining service id segments into a tag
  #[arg(long, value_name = "SEP", default_value = "/")]
  pub tag_separator: String,

  /// Replace operation ids with path-qualified unique ids
  #[arg(long, default_value_t = false)]
  pub unique_operation_ids: bool,

  /// Include services, operations and types marked Changing or Proposed
  #[arg(long, default_value_t = false)]
  pub show_unreleased: bool,

  /// Render /rest alongside /api for services routed both ways, marking /rest deprecated
  #[arg(long = "deprecate-slash-rest", default_value_t = false)]
  pub deprecate_rest: bool,

  /// Write separate rest_<package>.json and api_<package>.json files
  #[arg(long, default_value_t = false)]
  pub split: bool,

  /// Host written into every document
  #[arg(long, default_value = "<vcenter>")]
  pub host: String,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OasVersion {
  /// Swagger 2.0
  #[value(name = "2")]
  Swagger2,
  /// OpenAPI 3.0
  #[value(name = "3")]
  OpenApi3,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List the packages each family would produce
  Packages {
    /// Directory holding one JSON document per metamodel component
    #[arg(short, long, value_name = "DIR")]
    metamodel: PathBuf,

    /// Recorded rest navigation answers
    #[arg(short, long, value_name = "FILE")]
    navigation: Option<PathBuf>,

    /// Include services marked Changing or Proposed
    #[arg(long, default_value_t = false)]
    show_unreleased: bool,
  },
}
