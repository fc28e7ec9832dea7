//! CLI command implementations.

mod config;
mod doctor;
mod generate;
mod list;
mod rate;
mod search;
mod show;
mod sweep;
mod voices;

pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::{run_generate, GenerateOptions};
pub use list::run_list;
pub use rate::run_rate;
pub use search::run_search;
pub use show::run_show;
pub use sweep::run_sweep;
pub use voices::run_voices;
