pub mod generate;
pub mod list;

pub use generate::{GenerateConfig, generate_documents};
pub use list::list_packages;
