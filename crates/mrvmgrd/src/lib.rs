//! mrvmgrd - ML2 reconciliation daemon for MRV OptiSwitch equipment
//!
//! Keeps MRV switch configuration consistent with a logical
//! network/port model by translating entity add/delete events into
//! NETCONF config transactions and running a periodic full-resync loop
//! that repairs drift.
//!
//! Data flow:
//! 1. Lifecycle event → [`MrvDriver`] persists the entity in the
//!    [`Repository`] and fans the change out to every [`SwitchMgr`]
//! 2. Each [`SwitchMgr`] filters by scope, encodes ELAN/AC fragments
//!    and pushes them over one NETCONF session
//! 3. [`SyncWorker`] periodically replays the full desired state until
//!    a pass completes without transport failure

mod commands;
mod config;
mod driver;
mod error;
mod repository;
mod switch_mgr;
mod sync;
mod types;

pub use commands::*;
pub use config::{load_config, DriverConfig, SwitchScope};
pub use driver::{MrvDriver, NetworkEvent, PortEvent};
pub use error::{DriverError, DriverResult};
pub use repository::Repository;
pub use switch_mgr::SwitchMgr;
pub use sync::SyncWorker;
pub use types::{MrvNetwork, MrvPort};
