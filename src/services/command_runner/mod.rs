mod process_runner;
mod r#trait;

pub use self::r#trait::{create_command_runner, CommandRunner};
