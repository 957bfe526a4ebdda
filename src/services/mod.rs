pub mod command_runner;
pub mod composer;
pub mod publisher;
pub mod scheduler;
pub mod signals;

pub use command_runner::{create_command_runner, CommandRunner};
pub use composer::StatusComposer;
pub use publisher::{create_publisher, Publisher};
pub use scheduler::StatusBar;
pub use signals::{SignalLayout, SignalSource};
