use crate::error::Result;

/// Trait for sinks that make the status line visible to the window manager
///
/// Futures are not `Send`: the Xlib connection is bound to the control loop.
#[async_trait::async_trait(?Send)]
pub trait Publisher {
    /// Publish the composed status line
    async fn publish(&mut self, status: &[u8]) -> Result<()>;
}

/// Factory function to create an appropriate publisher based on the dry_run flag
pub fn create_publisher(dry_run: bool) -> Result<Box<dyn Publisher>> {
    if dry_run {
        return Ok(Box::new(super::stdout::StdoutPublisher::new()));
    }

    #[cfg(feature = "xlib")]
    {
        Ok(Box::new(super::xlib::XlibPublisher::connect()?))
    }

    #[cfg(not(feature = "xlib"))]
    {
        Ok(Box::new(super::xsetroot::XsetrootPublisher::connect()?))
    }
}
