//! バックグラウンドのイベントスレッド
//!
//! [`Worker`] は専用の OS スレッドでシングルスレッドの tokio ランタイムを持つ。
//! リクエストごとに [`Exchange`] を持つタスクを 1 つ spawn し、そのタスクは
//! ブロック中の呼び出し側からの [`Control`] メッセージに従う。
//! ソケット操作はすべてそのスレッドで行い、呼び出し側は
//! [`Waiter`](crate::bridge::Waiter) でブロックするだけ。

use std::thread::JoinHandle;
use std::time::Duration;

use oneshot_http11::Response;
use tokio::runtime::{Builder, Handle};
use tokio::sync::{mpsc, oneshot};

use crate::bridge::{self, Signal, Wait};
use crate::error::{Error, Result};
use crate::exchange::{Checkpoint, Exchange};
use crate::transport::Transport;

const THREAD_NAME: &str = "http11-worker";

/// 呼び出し側からやり取りを進めるタスクへのメッセージ
pub(crate) enum Control {
    /// `checkpoint` まで進めて結果を通知
    Advance {
        checkpoint: Checkpoint,
        signal: Signal<Result<()>>,
    },
    /// 接続を閉じ、ここまでにデコードしたレスポンスを通知
    Close { reply: Signal<Response> },
}

/// 1 つのクライアントの全リクエストで共有するイベントスレッド
pub(crate) struct Worker {
    handle: Handle,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn start() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Runtime(e.to_string()))?;
        let handle = runtime.handle().clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                tracing::debug!("worker started");
                // 送信側が破棄されても送信されても終了
                let _ = runtime.block_on(shutdown_rx);
                // 実行中のやり取りは破棄し、名前解決などのブロッキングタスクは待たない
                runtime.shutdown_background();
                tracing::debug!("worker stopped");
            })
            .map_err(|e| Error::Runtime(e.to_string()))?;

        Ok(Self {
            handle,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    /// やり取りをワーカーに渡す
    pub(crate) fn open<T: Transport>(&self, exchange: Exchange<T>) -> Session {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        self.handle.spawn(drive(exchange, control_rx));
        Session {
            control: control_tx,
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("worker thread panicked");
        }
    }
}

/// ワーカーで実行中のやり取りに対する呼び出し側のハンドル
pub(crate) struct Session {
    control: mpsc::UnboundedSender<Control>,
}

impl Session {
    /// やり取りが `checkpoint` に達するまで、最大 `timeout` ブロック
    pub(crate) fn advance(&self, checkpoint: Checkpoint, timeout: Duration) -> Wait<Result<()>> {
        let (signal, waiter) = bridge::channel();
        if self
            .control
            .send(Control::Advance { checkpoint, signal })
            .is_err()
        {
            return Wait::Abandoned;
        }
        waiter.wait_timeout(timeout)
    }

    /// 接続を閉じ、ここまでにデコードしたレスポンスを取り出す
    ///
    /// 実行中の操作は中断する。
    pub(crate) fn close(self) -> Option<Response> {
        let (reply, waiter) = bridge::channel();
        if self.control.send(Control::Close { reply }).is_err() {
            return None;
        }
        match waiter.wait() {
            Wait::Ready(response) => Some(response),
            Wait::TimedOut | Wait::Abandoned => None,
        }
    }
}

enum Interrupt {
    Finished(Result<()>),
    Control(Option<Control>),
}

async fn drive<T: Transport>(
    mut exchange: Exchange<T>,
    mut control: mpsc::UnboundedReceiver<Control>,
) {
    let mut next = control.recv().await;
    while let Some(message) = next.take() {
        match message {
            Control::Advance { checkpoint, signal } => {
                let interrupt = tokio::select! {
                    outcome = exchange.run_until(checkpoint) => Interrupt::Finished(outcome),
                    message = control.recv() => Interrupt::Control(message),
                };
                match interrupt {
                    Interrupt::Finished(outcome) => {
                        signal.post(outcome);
                        next = control.recv().await;
                    }
                    Interrupt::Control(message) => {
                        // 呼び出し側が待つのをやめたので実行中の操作は破棄された
                        tracing::debug!(phase = ?exchange.phase(), ?checkpoint, "interrupted");
                        next = message;
                    }
                }
            }
            Control::Close { reply } => {
                exchange.close();
                reply.post(exchange.into_response());
                return;
            }
        }
    }
    exchange.close();
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::net::SocketAddr;
    use std::sync::Arc;

    use tokio::io::DuplexStream;

    use super::*;
    use crate::config::Config;
    use crate::target::Target;

    /// 接続が終わらないトランスポート
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

    fn stalled_exchange() -> Exchange<Stalled> {
        let target = Target::Addr("192.0.2.1:80".parse().unwrap());
        Exchange::new(Arc::new(Stalled), target, Vec::new(), &Config::default())
    }

    #[test]
    fn test_advance_and_close() {
        let worker = Worker::start().unwrap();
        let session = worker.open(stalled_exchange());

        let resolved = session.advance(Checkpoint::Resolved, Duration::from_secs(5));
        assert_eq!(resolved, Wait::Ready(Ok(())));

        let connected = session.advance(Checkpoint::Connected, Duration::from_millis(50));
        assert_eq!(connected, Wait::TimedOut);

        // Close で止まった接続を中断する
        let response = session.close().unwrap();
        assert_eq!(response.status_code, 0);
    }

    #[test]
    fn test_dropped_worker_abandons_session() {
        let worker = Worker::start().unwrap();
        let session = worker.open(stalled_exchange());
        drop(worker);

        assert_eq!(
            session.advance(Checkpoint::Resolved, Duration::from_secs(5)),
            Wait::Abandoned
        );
        assert!(session.close().is_none());
    }

    /// 名前解決がブロッキングプールで止まったままのトランスポート
    struct HungResolver;

    impl Transport for HungResolver {
        type Stream = DuplexStream;

        async fn resolve(&self, _host: &str, _port: u16) -> io::Result<Vec<SocketAddr>> {
            tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(10)))
                .await
                .map_err(io::Error::other)?;
            Ok(Vec::new())
        }

        async fn connect(&self, _addr: SocketAddr) -> io::Result<DuplexStream> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_drop_does_not_wait_for_hung_resolver() {
        let worker = Worker::start().unwrap();
        let target = Target::host("example.com").unwrap();
        let exchange = Exchange::new(
            Arc::new(HungResolver),
            target,
            Vec::new(),
            &Config::default(),
        );
        let session = worker.open(exchange);

        assert_eq!(
            session.advance(Checkpoint::Resolved, Duration::from_millis(50)),
            Wait::TimedOut
        );
        assert!(session.close().is_some());

        let started = std::time::Instant::now();
        drop(worker);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_worker_serves_many_sessions() {
        let worker = Worker::start().unwrap();
        for _ in 0..3 {
            let session = worker.open(stalled_exchange());
            assert_eq!(
                session.advance(Checkpoint::Resolved, Duration::from_secs(5)),
                Wait::Ready(Ok(()))
            );
            assert!(session.close().is_some());
        }
    }
}
