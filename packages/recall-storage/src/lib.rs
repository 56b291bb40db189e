pub mod db;
pub mod history;
pub mod locks;
pub mod meta;
pub mod models;
pub mod schema;
pub mod settings;
pub mod usage;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
