//! Publisher service: writes the composed status line where dwm reads it.
//!
//! Only the control loop calls `publish`, and only when the composer produced
//! bytes different from the last publication.

mod stdout;
#[cfg(feature = "xlib")]
mod xlib;
#[cfg(not(feature = "xlib"))]
mod xsetroot;
mod r#trait;

pub use self::r#trait::{create_publisher, Publisher};
