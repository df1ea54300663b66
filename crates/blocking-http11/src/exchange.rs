//! 1 回のリクエスト/レスポンスのやり取りのライフサイクルエンジン
//!
//! [`Exchange`] は
//! `Resolving -> Connecting -> Sending -> ReceivingStatusLine -> ReceivingHeaders -> ReceivingBody -> Done`
//! の順にフェーズを進め、1 回の [`step`](Exchange::step) で行うトランスポート操作は高々 1 つ。
//! 失敗するとすぐに `Done` になり、最初のエラーを保持して以降の呼び出しでも返す。
//!
//! 呼び出し側は [`Checkpoint`] ごとに進めるので、チェックポイントごとに
//! 別のタイムアウトをかけられる。

use std::net::SocketAddr;
use std::sync::Arc;

use oneshot_http11::{Response, ResponseDecoder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::config::Config;
use crate::error::Error;
use crate::target::Target;
use crate::transport::Transport;

/// ホスト文字列にポートがない場合のデフォルトポート
pub const DEFAULT_PORT: u16 = 80;

/// ライフサイクルのフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Resolving,
    Connecting,
    Sending,
    ReceivingStatusLine,
    ReceivingHeaders,
    ReceivingBody,
    Done,
}

/// エンジンが呼び出し側に結果を返す地点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// 接続先アドレスが確定した
    Resolved,
    /// 接続が開いた
    Connected,
    /// 相手のクローズでボディが終わった
    Received,
}

impl Checkpoint {
    fn reached(self, phase: Phase) -> bool {
        match self {
            Checkpoint::Resolved => phase != Phase::Resolving,
            Checkpoint::Connected => !matches!(phase, Phase::Resolving | Phase::Connecting),
            Checkpoint::Received => phase == Phase::Done,
        }
    }
}

/// 1 つの接続上での 1 回のリクエスト/レスポンスのやり取り
pub struct Exchange<T: Transport> {
    transport: Arc<T>,
    target: Target,
    endpoints: Vec<SocketAddr>,
    stream: Option<T::Stream>,
    outbound: Vec<u8>,
    decoder: ResponseDecoder,
    read_buf: Vec<u8>,
    phase: Phase,
    error: Option<Error>,
}

impl<T: Transport> Exchange<T> {
    /// エンコード済みのリクエスト `outbound` を送るやり取りを作成
    pub fn new(transport: Arc<T>, target: Target, outbound: Vec<u8>, config: &Config) -> Self {
        Self {
            transport,
            target,
            endpoints: Vec::new(),
            stream: None,
            outbound,
            decoder: ResponseDecoder::with_limits(config.limits.clone()),
            read_buf: vec![0; config.read_buffer_size.max(1)],
            phase: Phase::Resolving,
            error: None,
        }
    }

    /// 現在のフェーズ
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 名前解決で得た接続先アドレス
    pub fn endpoints(&self) -> &[SocketAddr] {
        &self.endpoints
    }

    /// やり取りを終わらせたエラー (あれば)
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// ここまでにデコードしたレスポンス
    pub fn response(&self) -> &Response {
        self.decoder.response()
    }

    /// `checkpoint` に達するか失敗するまで進める
    pub async fn run_until(&mut self, checkpoint: Checkpoint) -> Result<(), Error> {
        loop {
            if let Some(e) = &self.error {
                return Err(e.clone());
            }
            if checkpoint.reached(self.phase) {
                return Ok(());
            }
            if let Err(e) = self.step().await {
                tracing::debug!(phase = ?self.phase, error = %e, "exchange failed");
                self.stream = None;
                self.phase = Phase::Done;
                self.error = Some(e);
            }
        }
    }

    /// 現在のフェーズの処理を 1 回行う
    pub async fn step(&mut self) -> Result<(), Error> {
        match self.phase {
            Phase::Resolving => {
                self.resolve().await?;
                self.enter(Phase::Connecting);
            }
            Phase::Connecting => {
                self.connect().await?;
                self.enter(Phase::Sending);
            }
            Phase::Sending => {
                let stream = self.stream.as_mut().ok_or(Error::Exception)?;
                stream.write_all(&self.outbound).await?;
                stream.flush().await?;
                self.enter(Phase::ReceivingStatusLine);
            }
            Phase::ReceivingStatusLine => {
                if self.decoder.decode_status_line()? {
                    self.enter(Phase::ReceivingHeaders);
                } else {
                    self.read_head().await?;
                }
            }
            Phase::ReceivingHeaders => {
                if self.decoder.decode_headers()? {
                    self.enter(Phase::ReceivingBody);
                } else {
                    self.read_head().await?;
                }
            }
            Phase::ReceivingBody => {
                let n = self.read_some().await?;
                if n == 0 {
                    self.decoder.mark_eof();
                    self.stream = None;
                    self.enter(Phase::Done);
                } else {
                    self.decoder.feed(&self.read_buf[..n])?;
                }
            }
            Phase::Done => {}
        }
        Ok(())
    }

    /// フェーズに関係なく接続を閉じる
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(phase = ?self.phase, "connection closed");
        }
        self.phase = Phase::Done;
    }

    /// やり取りを消費し、ここまでにデコードしたレスポンスを返す
    pub fn into_response(self) -> Response {
        self.decoder.into_response()
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
    }

    async fn resolve(&mut self) -> Result<(), Error> {
        self.endpoints = match &self.target {
            Target::Addr(addr) => vec![*addr],
            Target::Host(host) => self
                .transport
                .resolve(host.lookup_name(), host.port_or(DEFAULT_PORT))
                .await
                .map_err(|e| Error::Resolve(e.to_string()))?,
        };
        if self.endpoints.is_empty() {
            return Err(Error::NoEndpoints);
        }
        tracing::debug!(endpoints = ?self.endpoints, "resolved");
        Ok(())
    }

    async fn connect(&mut self) -> Result<(), Error> {
        let mut last_error = None;
        for &addr in &self.endpoints {
            match self.transport.connect(addr).await {
                Ok(stream) => {
                    tracing::info!(peer = %addr, "connected");
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(peer = %addr, error = %e, "connect failed");
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(Error::Connect(e.to_string())),
            None => Err(Error::NoEndpoints),
        }
    }

    async fn read_some(&mut self) -> Result<usize, Error> {
        let stream = self.stream.as_mut().ok_or(Error::Exception)?;
        let n = stream.read(&mut self.read_buf).await?;
        Ok(n)
    }

    /// ヘッダーブロックの途中で読む。ここでのクローズは失敗
    async fn read_head(&mut self) -> Result<(), Error> {
        let n = self.read_some().await?;
        if n == 0 {
            return Err(Error::ConnectionClosed);
        }
        self.decoder.feed(&self.read_buf[..n])?;
        Ok(())
    }
}
