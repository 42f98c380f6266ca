//! Ports - Boundaries between the reconciliation core and the outside world.

pub mod captions;
pub mod credentials;
pub mod files;
pub mod transport;
