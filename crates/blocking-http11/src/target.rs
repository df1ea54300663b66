//! クライアントの接続先

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use oneshot_http11::host::Host;

use crate::error::{Error, Result};

/// クライアントの接続先
///
/// `Host` はリクエストごとに名前解決し、`Addr` はそのまま使う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// `host[:port]` (ポート省略時は 80)
    Host(Host),
    /// IP アドレスとポート
    Addr(SocketAddr),
}

impl Target {
    /// `host[:port]` 文字列をパース
    ///
    /// ```
    /// use blocking_http11::Target;
    ///
    /// let target = Target::host("example.com:8080").unwrap();
    /// assert_eq!(target.host_header(), "example.com:8080");
    /// assert!(Target::host("exa mple.com").is_err());
    /// ```
    pub fn host(host: &str) -> Result<Self> {
        Host::parse(host)
            .map(Target::Host)
            .map_err(|e| Error::InvalidAddress(format!("{host}: {e}")))
    }

    /// IP アドレス文字列をパース
    ///
    /// ```
    /// use blocking_http11::Target;
    ///
    /// let target = Target::addr("127.0.0.1", 8080).unwrap();
    /// assert_eq!(target.host_header(), "127.0.0.1:8080");
    /// assert!(Target::addr("localhost", 80).is_err());
    /// ```
    pub fn addr(ip: &str, port: u16) -> Result<Self> {
        let ip: IpAddr = ip
            .parse()
            .map_err(|e| Error::InvalidAddress(format!("{ip}: {e}")))?;
        Ok(Target::Addr(SocketAddr::new(ip, port)))
    }

    /// リクエストが名前解決から始まるかどうか
    pub fn needs_resolve(&self) -> bool {
        matches!(self, Target::Host(_))
    }

    /// 毎回のリクエストで送る `Host` ヘッダーの値
    pub fn host_header(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Host(host) => host.fmt(f),
            Target::Addr(addr) => addr.fmt(f),
        }
    }
}

impl From<SocketAddr> for Target {
    fn from(addr: SocketAddr) -> Self {
        Target::Addr(addr)
    }
}
