//! CloudWatch-to-Timber plugin
//!
//! The plugin owns its host for the duration of a packaging pass and exposes
//! the lifecycle hooks the framework dispatches to it.

use crate::error::TimberResult;
use crate::host::version::ensure_compatible;
use crate::host::ServiceHost;
use crate::plugin::ForwardingOutcome;

/// Lifecycle event after which the forwarding resources are injected
pub const PACKAGE_HOOK: &str = "package:createDeploymentArtifacts";

/// Main plugin struct that holds the host and runs the packaging step
#[derive(Debug)]
pub struct TimberPlugin<H: ServiceHost> {
    pub(crate) host: H,
}

impl<H: ServiceHost> TimberPlugin<H> {
    /// Create the plugin for a host framework instance
    ///
    /// # Errors
    ///
    /// Fails when the framework is older than 1.12 or reports a version that
    /// cannot be parsed.
    pub fn new(host: H) -> TimberResult<Self> {
        let version = ensure_compatible(host.framework_version())?;
        log::debug!("Timber plugin initialised for framework {version}");
        Ok(Self { host })
    }

    /// Lifecycle events this plugin subscribes to
    pub fn hooks(&self) -> &'static [&'static str] {
        &[PACKAGE_HOOK]
    }

    /// Dispatch a lifecycle event. Returns `None` for events the plugin does
    /// not subscribe to.
    pub fn run_hook(&mut self, event: &str) -> Option<ForwardingOutcome> {
        if event == PACKAGE_HOOK {
            Some(self.add_timber())
        } else {
            log::trace!("Ignoring lifecycle event {event}");
            None
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    // add_timber() is implemented in package.rs
}
