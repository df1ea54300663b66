//! 接続先のホストとポート
//!
//! クライアント作成時に渡す `host[:port]` 形式をパースする。
//! 同じ文字列を `Host` ヘッダーとして送信する。
//!
//! ```rust
//! use oneshot_http11::host::Host;
//!
//! let host = Host::parse("example.com:8080").unwrap();
//! assert_eq!(host.host(), "example.com");
//! assert_eq!(host.port(), Some(8080));
//! assert_eq!(host.port_or(80), 8080);
//! ```

use core::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Host パースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// 空の入力
    Empty,
    /// 不正な形式
    InvalidFormat,
    /// 不正なホスト
    InvalidHost,
    /// 不正なポート
    InvalidPort,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Empty => write!(f, "empty host"),
            HostError::InvalidFormat => write!(f, "invalid host format"),
            HostError::InvalidHost => write!(f, "invalid host"),
            HostError::InvalidPort => write!(f, "invalid port"),
        }
    }
}

impl std::error::Error for HostError {}

/// ホストと省略可能なポート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    host: String,
    port: Option<u16>,
}

impl Host {
    /// `host[:port]` をパース
    pub fn parse(input: &str) -> Result<Self, HostError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(HostError::Empty);
        }

        if input.chars().any(|c| c.is_whitespace()) {
            return Err(HostError::InvalidFormat);
        }

        if input.starts_with('[') {
            return parse_ipv6_host(input);
        }

        let (host_part, port) = split_host_port(input)?;
        if host_part.is_empty() || host_part.contains('@') {
            return Err(HostError::InvalidHost);
        }

        if host_part.parse::<Ipv4Addr>().is_err() && !is_valid_reg_name(host_part) {
            return Err(HostError::InvalidHost);
        }

        Ok(Host {
            host: host_part.to_string(),
            port,
        })
    }

    /// ホスト名 (IPv6 は角括弧付き)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 名前解決に渡すホスト名 (IPv6 は角括弧なし)
    pub fn lookup_name(&self) -> &str {
        self.host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.host)
    }

    /// ポート (指定された場合)
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// ポート、指定がなければ `default`
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }

    /// IPv6 リテラルかどうか
    pub fn is_ipv6(&self) -> bool {
        self.host.starts_with('[')
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(port) = self.port {
            write!(f, "{}:{}", self.host, port)
        } else {
            write!(f, "{}", self.host)
        }
    }
}

fn parse_ipv6_host(input: &str) -> Result<Host, HostError> {
    let end = input.find(']').ok_or(HostError::InvalidHost)?;
    let host_inner = &input[1..end];
    let rest = &input[end + 1..];

    let port = if rest.is_empty() {
        None
    } else if let Some(port_str) = rest.strip_prefix(':') {
        Some(parse_port(port_str)?)
    } else {
        return Err(HostError::InvalidHost);
    };

    if host_inner.parse::<Ipv6Addr>().is_err() {
        return Err(HostError::InvalidHost);
    }

    Ok(Host {
        host: input[..end + 1].to_string(),
        port,
    })
}

fn split_host_port(input: &str) -> Result<(&str, Option<u16>), HostError> {
    if let Some((host, port_str)) = input.rsplit_once(':') {
        if host.contains(':') {
            return Err(HostError::InvalidHost);
        }
        if port_str.is_empty() {
            return Err(HostError::InvalidPort);
        }
        let port = parse_port(port_str)?;
        return Ok((host, Some(port)));
    }
    Ok((input, None))
}

fn parse_port(input: &str) -> Result<u16, HostError> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(HostError::InvalidPort);
    }
    input.parse::<u16>().map_err(|_| HostError::InvalidPort)
}

fn is_valid_reg_name(input: &str) -> bool {
    let bytes = input.as_bytes();
    if bytes.is_empty() {
        return false;
    }

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if is_unreserved(b) || is_sub_delim(b) {
            i += 1;
            continue;
        }
        if b == b'%' {
            if i + 2 >= bytes.len() {
                return false;
            }
            if !is_hexdig(bytes[i + 1]) || !is_hexdig(bytes[i + 2]) {
                return false;
            }
            i += 3;
            continue;
        }
        return false;
    }

    true
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'.' || b == b'_' || b == b'~'
}

fn is_sub_delim(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
    )
}

fn is_hexdig(b: u8) -> bool {
    b.is_ascii_hexdigit()
}
