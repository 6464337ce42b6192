//! Shared pieces of the directory seeding tools: the company row model,
//! keyword categories, the INSERT tuple scanner and the SQL script writer.

pub mod category;
pub mod company;
pub mod error;
pub mod settings;
pub mod sql_script;
pub mod sql_tuples;
pub mod utils;

pub use category::{Category, Classifier, MatchMode};
pub use company::{Company, ParsedLine, SlugRegistry};
pub use error::{Result, SeedError};
pub use settings::Settings;
