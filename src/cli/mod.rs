pub mod forms;
pub mod headless;
pub mod output;
mod shell;

pub use headless::run_headless;
pub use shell::{run_cli, run_with_store};
