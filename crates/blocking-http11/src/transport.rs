//! ライフサイクルエンジンが使うノンブロッキングなトランスポート
//!
//! エンジンが外部に求める非同期操作は、ホスト名の名前解決と、
//! 1 つのアドレスへのバイトストリームの接続の 2 つだけ。
//! 読み書きはストリームの tokio `AsyncRead` / `AsyncWrite` で行う。

use std::future::Future;
use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

/// 名前解決と接続
///
/// Future はクライアントのワーカースレッドで実行される。
pub trait Transport: Send + Sync + 'static {
    /// 1 つの接続のバイトストリーム
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// `host` を名前解決して接続先アドレスを得る
    fn resolve(
        &self,
        host: &str,
        port: u16,
    ) -> impl Future<Output = io::Result<Vec<SocketAddr>>> + Send;

    /// 1 つの接続先アドレスに接続
    fn connect(&self, addr: SocketAddr) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// tokio の TCP トランスポート
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransport;

impl Transport for TcpTransport {
    type Stream = TcpStream;

    async fn resolve(&self, host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
        let addrs = tokio::net::lookup_host((host, port)).await?;
        Ok(addrs.collect())
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}
