//! Signal dispatch: OS signals in, `StatusEvent`s out.
//!
//! Signal handling never touches block state. Signals are blocked and read
//! from a signalfd by a listener task, which forwards typed events to the
//! status bar's control loop over a channel.

mod layout;
mod listener;
mod signalfd;

pub use layout::SignalLayout;
pub use listener::SignalSource;
