//! ブロッキング HTTP/1.1 クライアント

use std::sync::Arc;

use oneshot_http11::{Request, Response, encode_exchange_request};

use crate::bridge::Wait;
use crate::config::Config;
use crate::error::{Error, Failure, Result};
use crate::exchange::{Checkpoint, Exchange};
use crate::target::Target;
use crate::transport::{TcpTransport, Transport};
use crate::worker::{Session, Worker};

/// 1 つの接続先に対するブロッキング HTTP/1.1 クライアント
///
/// リクエストごとに新しい接続を開き、`Connection: close` を送り、
/// 相手が閉じるまでボディを読む。ソケット処理はクライアントが持つ
/// バックグラウンドスレッドで行い、呼び出し側のスレッドはレスポンスが完了するか
/// フェーズがタイムアウトするまでブロックする。
///
/// ```no_run
/// use blocking_http11::Client;
///
/// let mut client = Client::new("example.com")?;
/// let response = client.get("/").header("User-Agent", "my-app").send()?;
/// println!("{} {}", response.status_code, response.reason_phrase);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Client<T: Transport = TcpTransport> {
    target: Target,
    host_header: String,
    config: Config,
    transport: Arc<T>,
    worker: Worker,
}

impl Client<TcpTransport> {
    /// `host[:port]` 向けのクライアント (リクエストごとに名前解決する)
    pub fn new(host: &str) -> Result<Self> {
        Self::with_config(Target::host(host)?, Config::default())
    }

    /// IP アドレスとポート向けのクライアント
    pub fn with_addr(ip: &str, port: u16) -> Result<Self> {
        Self::with_config(Target::addr(ip, port)?, Config::default())
    }

    /// 設定を指定してクライアントを作成
    pub fn with_config(target: Target, config: Config) -> Result<Self> {
        Self::with_transport(target, config, TcpTransport)
    }
}

impl<T: Transport> Client<T> {
    /// 独自トランスポート上のクライアント
    pub fn with_transport(target: Target, config: Config, transport: T) -> Result<Self> {
        let worker = Worker::start()?;
        tracing::debug!(%target, "client created");
        Ok(Self {
            host_header: target.host_header(),
            target,
            config,
            transport: Arc::new(transport),
            worker,
        })
    }

    /// 接続先
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// 設定
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// GET リクエスト
    pub fn get(&mut self, path: &str) -> RequestBuilder<'_, T> {
        self.request("GET", path)
    }

    /// POST リクエスト
    pub fn post(&mut self, path: &str) -> RequestBuilder<'_, T> {
        self.request("POST", path)
    }

    /// PUT リクエスト
    pub fn put(&mut self, path: &str) -> RequestBuilder<'_, T> {
        self.request("PUT", path)
    }

    /// DELETE リクエスト
    pub fn delete(&mut self, path: &str) -> RequestBuilder<'_, T> {
        self.request("DELETE", path)
    }

    /// HEAD リクエスト
    ///
    /// この場合も相手が閉じるまでボディを読む。
    pub fn head(&mut self, path: &str) -> RequestBuilder<'_, T> {
        self.request("HEAD", path)
    }

    /// 任意のメソッドでリクエスト
    ///
    /// メソッドはそのまま送信する。
    pub fn request(&mut self, method: &str, path: &str) -> RequestBuilder<'_, T> {
        RequestBuilder {
            client: self,
            request: Request::new(method, path),
        }
    }

    /// 1 回のやり取りを行い、終わるまでブロック
    ///
    /// 失敗時の [`Failure`] はエラーと、それまでにデコードしたレスポンスを持つ。
    pub fn send(&mut self, request: Request) -> std::result::Result<Response, Failure> {
        let _span =
            tracing::debug_span!("request", method = %request.method, path = %request.uri)
                .entered();

        let outbound = encode_exchange_request(&request, &self.host_header);
        let exchange = Exchange::new(
            Arc::clone(&self.transport),
            self.target.clone(),
            outbound,
            &self.config,
        );
        let session = self.worker.open(exchange);
        let outcome = self.run(&session);

        // Done: 結果に関係なく接続を閉じる
        let response = session.close();
        match (outcome, response) {
            (Ok(()), Some(response)) => {
                tracing::debug!(status = response.status_code, "response complete");
                Ok(response)
            }
            (Ok(()), None) => {
                tracing::error!("worker lost the response");
                Err(Failure::new(Error::Exception))
            }
            (Err(error), response) => Err(Failure {
                error,
                response: response.unwrap_or_default(),
            }),
        }
    }

    fn run(&self, session: &Session) -> Result<()> {
        let checkpoints = [
            (
                Checkpoint::Resolved,
                self.config.resolve_timeout,
                Error::ResolveTimeout,
            ),
            (
                Checkpoint::Connected,
                self.config.connect_timeout,
                Error::ConnectTimeout,
            ),
            (
                Checkpoint::Received,
                self.config.request_timeout,
                Error::RequestTimeout,
            ),
        ];

        for (checkpoint, timeout, timeout_error) in checkpoints {
            match session.advance(checkpoint, timeout) {
                Wait::Ready(Ok(())) => {}
                Wait::Ready(Err(e)) => {
                    tracing::debug!(?checkpoint, error = %e, "request failed");
                    return Err(e);
                }
                Wait::TimedOut => {
                    tracing::warn!(?checkpoint, ?timeout, "timed out");
                    return Err(timeout_error);
                }
                Wait::Abandoned => {
                    tracing::error!(?checkpoint, "worker dropped the exchange");
                    return Err(Error::Exception);
                }
            }
        }
        Ok(())
    }
}

/// リクエストビルダー
///
/// [`Client::get`] などで取得し、ヘッダーとボディを追加してから
/// [`send`](Self::send) する。
pub struct RequestBuilder<'a, T: Transport> {
    client: &'a mut Client<T>,
    request: Request,
}

impl<T: Transport> RequestBuilder<'_, T> {
    /// ヘッダーを追加
    ///
    /// ヘッダーは追加した順に送信する。ここで指定した `Host` や
    /// `Content-Length` はクライアントが付けるものを置き換える。
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request.add_header(name, value);
        self
    }

    /// 複数のヘッダーを追加
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in headers {
            self.request.add_header(name.as_ref(), value.as_ref());
        }
        self
    }

    /// ボディを設定
    ///
    /// ボディが空でなければ `Content-Length` を付ける。
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.request.body = body.into();
        self
    }

    /// リクエストを送信し、やり取りが終わるまでブロック
    pub fn send(self) -> std::result::Result<Response, Failure> {
        self.client.send(self.request)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::net::SocketAddr;
    use std::time::{Duration, Instant};

    use tokio::io::DuplexStream;

    use super::*;

    /// 名前解決も接続も終わらないトランスポート
    struct Stalled;

    impl Transport for Stalled {
        type Stream = DuplexStream;

        async fn resolve(&self, _host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
            std::future::pending().await
        }

        async fn connect(&self, _addr: SocketAddr) -> io::Result<DuplexStream> {
            std::future::pending().await
        }
    }

    /// 相手が固定のレスポンスを返して閉じるトランスポート
    struct Canned(&'static [u8]);

    impl Transport for Canned {
        type Stream = DuplexStream;

        async fn resolve(&self, _host: &str, port: u16) -> io::Result<Vec<SocketAddr>> {
            Ok(vec![SocketAddr::from(([192, 0, 2, 1], port))])
        }

        async fn connect(&self, _addr: SocketAddr) -> io::Result<DuplexStream> {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};

            let (client, mut server) = tokio::io::duplex(64 * 1024);
            let reply = self.0;
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = server.read(&mut buf).await?;
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&buf[..n]);
                }
                server.write_all(reply).await?;
                // `server` の破棄が相手のクローズになる
                io::Result::Ok(())
            });
            Ok(client)
        }
    }

    fn short() -> Config {
        Config::default()
            .resolve_timeout(Duration::from_millis(100))
            .connect_timeout(Duration::from_millis(100))
            .request_timeout(Duration::from_millis(100))
    }

    #[test]
    fn test_resolve_timeout() {
        let mut client =
            Client::with_transport(Target::host("example.com").unwrap(), short(), Stalled).unwrap();

        let started = Instant::now();
        let failure = client.get("/").send().unwrap_err();
        assert_eq!(failure.error, Error::ResolveTimeout);
        assert_eq!(failure.response.status_code, 0);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_connect_timeout() {
        let target = Target::addr("192.0.2.1", 80).unwrap();
        let mut client = Client::with_transport(target, short(), Stalled).unwrap();

        let failure = client.get("/").send().unwrap_err();
        assert_eq!(failure.error, Error::ConnectTimeout);
        assert_eq!(failure.to_string(), "connect timeout");
    }

    #[test]
    fn test_canned_response() {
        let transport = Canned(b"HTTP/1.1 200 OK\r\nServer: canned\r\n\r\nbody");
        let target = Target::host("example.com").unwrap();
        let mut client = Client::with_transport(target, Config::default(), transport).unwrap();

        let response = client.get("/").send().unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.get_header("Server"), Some("canned"));
        assert_eq!(response.body, b"body");
    }

    #[test]
    fn test_requests_are_independent() {
        let transport = Canned(b"HTTP/1.0 404 Not Found\r\n\r\n");
        let target = Target::host("example.com").unwrap();
        let mut client = Client::with_transport(target, Config::default(), transport).unwrap();

        let first = client.delete("/x").send().unwrap();
        let second = client.delete("/x").send().unwrap();
        assert_eq!(first, second);
        assert_eq!(second.version, "HTTP/1.0");
        assert_eq!(second.reason_phrase, "Not Found");
    }

    #[test]
    fn test_invalid_response_keeps_nothing() {
        let transport = Canned(b"GARBAGE\r\n\r\n");
        let target = Target::host("example.com").unwrap();
        let mut client = Client::with_transport(target, Config::default(), transport).unwrap();

        let failure = client.get("/").send().unwrap_err();
        assert_eq!(failure.error, Error::InvalidResponse);
        assert_eq!(failure.to_string(), "invalid http response");
        assert_eq!(failure.response.status_code, 0);
    }

    #[test]
    fn test_constructor_errors() {
        assert!(matches!(
            Client::with_addr("not-an-ip", 80),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(Client::new(""), Err(Error::InvalidAddress(_))));
    }
}
