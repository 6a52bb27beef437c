pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod restaurants;
pub mod settings;

pub use restaurants::load_restaurants;
pub use settings::Settings;
