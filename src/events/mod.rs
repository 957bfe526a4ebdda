pub mod status;

pub use status::{ClickEvent, StatusEvent};
