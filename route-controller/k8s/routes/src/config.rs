use std::num::NonZeroUsize;

/// Tunes how route operations are issued to the remote control plane.
///
/// May be flattened into a controller's command-line arguments.
#[derive(Clone, Debug, clap::Args)]
pub struct Config {
    /// The maximum number of route creates, updates or deletes in flight at
    /// once. Batches still run in order: creates, then updates, then deletes.
    #[clap(
        long = "route-reconcile-concurrency",
        default_value = "1",
        env = "ROUTE_CONTROLLER_RECONCILE_CONCURRENCY"
    )]
    pub concurrency: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: NonZeroUsize::MIN,
        }
    }
}
