//! NETCONF session over the SSH `netconf` subsystem.
//!
//! Host keys are not verified; the switches live on an isolated
//! management network and ship with factory keys. This matches the
//! connection options used against the deployed fleet.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::{Channel, ChannelMsg};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::error::{NetconfError, NetconfResult};
use crate::frame::{frame_message, FrameReader};
use crate::rpc::{self, classify_reply, ReplyKind};
use crate::transaction::ConfigDatastore;

/// Default NETCONF-over-SSH port.
pub const NETCONF_PORT: u16 = 830;

/// Default session establishment / RPC timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Connection parameters for one switch.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Device host or address.
    pub host: String,
    /// Device port.
    pub port: u16,
    /// SSH username.
    pub username: String,
    /// SSH password.
    pub password: String,
    /// Bound on session establishment and each RPC round-trip.
    pub timeout: Duration,
}

impl SessionConfig {
    /// Creates a config with the default port and timeout.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: NETCONF_PORT,
            username: username.into(),
            password: password.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// SSH client handler accepting any server key.
struct AcceptingHandler;

#[async_trait]
impl client::Handler for AcceptingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

/// One established NETCONF session.
///
/// Dropping the session closes the SSH connection; [`Session::close`]
/// additionally sends `close-session` so the device releases any
/// datastore locks immediately.
pub struct Session {
    handle: Handle<AcceptingHandler>,
    channel: Channel<Msg>,
    reader: FrameReader,
    message_id: u64,
    rpc_timeout: Duration,
}

impl Session {
    /// Connects, authenticates and exchanges hellos.
    ///
    /// The whole establishment sequence is bounded by `cfg.timeout`.
    pub async fn connect(cfg: &SessionConfig) -> NetconfResult<Session> {
        let secs = cfg.timeout.as_secs();
        timeout(cfg.timeout, Self::establish(cfg))
            .await
            .map_err(|_| NetconfError::Timeout { seconds: secs })?
    }

    async fn establish(cfg: &SessionConfig) -> NetconfResult<Session> {
        let addr = tokio::net::lookup_host((cfg.host.as_str(), cfg.port))
            .await
            .and_then(|mut addrs| {
                addrs.next().ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no address for host")
                })
            })
            .map_err(|source| NetconfError::Connect {
                host: cfg.host.clone(),
                port: cfg.port,
                source,
            })?;

        let ssh_config = Arc::new(client::Config::default());
        let mut handle = client::connect(ssh_config, addr, AcceptingHandler).await?;

        let authenticated = handle
            .authenticate_password(cfg.username.clone(), cfg.password.clone())
            .await?;
        if !authenticated {
            return Err(NetconfError::AuthFailed {
                username: cfg.username.clone(),
            });
        }

        let channel = handle.channel_open_session().await?;
        channel.request_subsystem(true, "netconf").await?;

        let mut session = Session {
            handle,
            channel,
            reader: FrameReader::new(),
            message_id: 0,
            rpc_timeout: cfg.timeout,
        };

        session.send(&rpc::hello()).await?;
        let server_hello = session.recv().await?;
        trace!("server hello: {}", server_hello);
        debug!("NETCONF session established with {}", cfg.host);

        Ok(session)
    }

    /// Stages a `<config>` document against the candidate datastore.
    pub async fn edit_config(&mut self, config: &str) -> NetconfResult<()> {
        let id = self.next_message_id();
        self.rpc(&rpc::edit_config_candidate(id, config)).await
    }

    /// Commits the candidate datastore.
    pub async fn commit(&mut self) -> NetconfResult<()> {
        let id = self.next_message_id();
        self.rpc(&rpc::commit(id)).await
    }

    /// Discards any uncommitted candidate changes.
    pub async fn discard_changes(&mut self) -> NetconfResult<()> {
        let id = self.next_message_id();
        self.rpc(&rpc::discard_changes(id)).await
    }

    /// Sends `close-session` and tears the connection down.
    ///
    /// Best-effort: a failure here is irrelevant, the session is gone
    /// either way.
    pub async fn close(mut self) {
        let id = self.next_message_id();
        let _ = timeout(self.rpc_timeout, async {
            let _ = self.send(&rpc::close_session(id)).await;
            let _ = self.channel.eof().await;
        })
        .await;
        let _ = self
            .handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await;
    }

    fn next_message_id(&mut self) -> u64 {
        self.message_id += 1;
        self.message_id
    }

    /// One RPC round-trip: send, await reply, classify.
    async fn rpc(&mut self, request: &str) -> NetconfResult<()> {
        let secs = self.rpc_timeout.as_secs();
        let reply = timeout(self.rpc_timeout, async {
            self.send(request).await?;
            self.recv().await
        })
        .await
        .map_err(|_| NetconfError::Timeout { seconds: secs })??;

        match classify_reply(&reply) {
            ReplyKind::Ok => Ok(()),
            ReplyKind::Error(message) => Err(NetconfError::rpc(message)),
        }
    }

    async fn send(&mut self, message: &str) -> NetconfResult<()> {
        trace!("send: {}", message);
        let framed = frame_message(message);
        self.channel.data(&framed[..]).await?;
        Ok(())
    }

    async fn recv(&mut self) -> NetconfResult<String> {
        loop {
            if let Some(message) = self.reader.next_message()? {
                trace!("recv: {}", message);
                return Ok(message);
            }
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => self.reader.push(&data),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(NetconfError::ChannelClosed)
                }
                Some(_) => continue,
            }
        }
    }
}

#[async_trait]
impl ConfigDatastore for Session {
    async fn discard_changes(&mut self) -> NetconfResult<()> {
        Session::discard_changes(self).await
    }

    async fn edit_config(&mut self, config: &str) -> NetconfResult<()> {
        Session::edit_config(self, config).await
    }

    async fn commit(&mut self) -> NetconfResult<()> {
        Session::commit(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let cfg = SessionConfig::new("10.0.0.1", "admin", "");
        assert_eq!(cfg.port, NETCONF_PORT);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_connect_refused_is_error() {
        // Nothing listens on this port; establishment must fail inside
        // the timeout with a transport error, not hang or panic.
        let cfg = SessionConfig {
            host: "127.0.0.1".to_string(),
            port: 47830,
            username: "admin".to_string(),
            password: String::new(),
            timeout: Duration::from_secs(2),
        };
        let result = Session::connect(&cfg).await;
        assert!(result.is_err());
    }
}
