//! mrv-netconf - NETCONF client for MRV OptiSwitch equipment
//!
//! A small NETCONF 1.0 client speaking the candidate-datastore workflow
//! the switch reconciler needs: stage a config blob against the
//! candidate datastore, validate it, commit it, or throw it away.
//!
//! The client runs the `netconf` SSH subsystem over a password
//! authenticated session and uses end-of-message (`]]>]]>`) framing.
//!
//! # Session lifecycle
//!
//! One [`Session`] per configuration transaction: connect, exchange
//! hellos, run RPCs, close. There is no pooling; the switch population
//! is small and sessions are cheap relative to the sync interval.

mod error;
mod frame;
mod rpc;
mod session;
mod transaction;

pub use error::{NetconfError, NetconfResult};
pub use frame::{frame_message, FrameReader};
pub use rpc::{classify_reply, ReplyKind};
pub use session::{Session, SessionConfig, NETCONF_PORT};
pub use transaction::{apply_transaction, ConfigDatastore};
