#![forbid(unsafe_code)]

//! Keyboard remote control for a log player.
//!
//! The log player listens for single ASCII command datagrams on a UDP port. A viewer maps key
//! presses to [`LogplayerCommand`]s and forwards them with [`LogplayerRemote::send`].

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

pub const DEFAULT_REMOTE_PORT: u16 = 53261;
pub const DEFAULT_REMOTE_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_REMOTE_PORT));

pub const REMOTE_ADDR_ENV: &str = "LOGPLAYER_REMOTE_ADDR";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogplayerCommand {
    PlayPauseToggle,
    Step,
    Faster,
    Slower,
    Back5,
    Forward5,
}

impl LogplayerCommand {
    pub const ALL: [Self; 6] = [
        Self::PlayPauseToggle,
        Self::Step,
        Self::Faster,
        Self::Slower,
        Self::Back5,
        Self::Forward5,
    ];

    /// Key binding used by the viewer. `None` means the key is not handled.
    pub fn from_key(key: char) -> Option<Self> {
        Some(match key {
            'P' | 'p' => Self::PlayPauseToggle,
            'N' | 'n' => Self::Step,
            '=' | '+' => Self::Faster,
            '_' | '-' => Self::Slower,
            '[' => Self::Back5,
            ']' => Self::Forward5,
            _ => return None,
        })
    }

    /// Datagram payload understood by the log player.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlayPauseToggle => "PLAYPAUSETOGGLE",
            Self::Step => "STEP",
            Self::Faster => "FASTER",
            Self::Slower => "SLOWER",
            Self::Back5 => "BACK5",
            Self::Forward5 => "FORWARD5",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl std::fmt::Display for LogplayerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("invalid value for env var {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("failed to bind local udp socket: {0}")]
    Bind(#[source] std::io::Error),

    #[error("failed to send {command} to {target}: {source}")]
    Send {
        command: LogplayerCommand,
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Sends commands to one log player.
#[derive(Debug)]
pub struct LogplayerRemote {
    socket: UdpSocket,
    target: SocketAddr,
}

impl LogplayerRemote {
    pub fn new(target: SocketAddr) -> Result<Self, RemoteError> {
        let local: SocketAddr = match target {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((std::net::Ipv6Addr::UNSPECIFIED, 0)),
        };
        let socket = UdpSocket::bind(local).map_err(RemoteError::Bind)?;
        Ok(Self { socket, target })
    }

    /// Targets `LOGPLAYER_REMOTE_ADDR` if set, otherwise `127.0.0.1:53261`.
    pub fn from_env() -> Result<Self, RemoteError> {
        Self::new(target_from_lookup(|name| std::env::var(name).ok())?)
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn send(&self, command: LogplayerCommand) -> Result<(), RemoteError> {
        tracing::debug!(target_addr = %self.target, %command, "logplayer command");
        self.socket
            .send_to(command.as_str().as_bytes(), self.target)
            .map_err(|source| RemoteError::Send {
                command,
                target: self.target,
                source,
            })?;
        Ok(())
    }

    /// Handles a key press. Returns `Ok(false)` for keys without a binding.
    pub fn on_key(&self, key: char) -> Result<bool, RemoteError> {
        match LogplayerCommand::from_key(key) {
            Some(command) => self.send(command).map(|()| true),
            None => Ok(false),
        }
    }
}

pub fn target_from_lookup(
    lookup: impl Fn(&'static str) -> Option<String>,
) -> Result<SocketAddr, RemoteError> {
    match lookup(REMOTE_ADDR_ENV) {
        None => Ok(DEFAULT_REMOTE_ADDR),
        Some(value) => value.trim().parse().map_err(|_| RemoteError::InvalidEnv {
            var: REMOTE_ADDR_ENV,
            value,
        }),
    }
}
