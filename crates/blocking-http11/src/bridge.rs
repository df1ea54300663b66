//! ワーカースレッドとブロック中の呼び出し側の一度きりの待ち合わせ
//!
//! リクエストのチェックポイントごとに新しい `(Signal, Waiter)` の組を作る。
//! ワーカーは [`Signal`] で結果を 1 つだけ通知し、呼び出し側はタイムアウト付きで
//! [`Waiter`] を待つ。スロットは 1 つなので、2 回目の通知や呼び出し側が待つのを
//! やめた後の通知は失敗にせず破棄する。

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::time::Duration;

/// Signal と Waiter の組を作成
pub fn channel<T>() -> (Signal<T>, Waiter<T>) {
    let (tx, rx) = mpsc::sync_channel(1);
    (Signal { tx }, Waiter { rx })
}

/// 通知側 (ワーカーが持つ)
#[derive(Debug)]
pub struct Signal<T> {
    tx: SyncSender<T>,
}

impl<T> Signal<T> {
    /// 結果を通知
    ///
    /// スロットが埋まっている、または Waiter がすでにない場合は値を破棄して
    /// `false` を返す。どちらもエラーではない。
    pub fn post(&self, value: T) -> bool {
        match self.tx.try_send(value) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::trace!("signal already posted, dropping duplicate");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("waiter gone, dropping late signal");
                false
            }
        }
    }
}

/// [`Waiter::wait_timeout`] の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wait<T> {
    /// ワーカーが値を通知した
    Ready(T),
    /// 時間内に通知がなかった
    TimedOut,
    /// 通知されないまま Signal が破棄された
    Abandoned,
}

/// 待機側 (呼び出し側が持つ)
#[derive(Debug)]
pub struct Waiter<T> {
    rx: Receiver<T>,
}

impl<T> Waiter<T> {
    /// 値が通知されるかタイムアウトするまでブロック
    ///
    /// Waiter を消費する。タイムアウトしても通知側は止めず、遅れた通知は破棄される。
    pub fn wait_timeout(self, timeout: Duration) -> Wait<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(value) => Wait::Ready(value),
            Err(RecvTimeoutError::Timeout) => Wait::TimedOut,
            Err(RecvTimeoutError::Disconnected) => Wait::Abandoned,
        }
    }

    /// 値が通知されるか Signal が破棄されるまでブロック
    pub fn wait(self) -> Wait<T> {
        match self.rx.recv() {
            Ok(value) => Wait::Ready(value),
            Err(_) => Wait::Abandoned,
        }
    }
}
