//! blocking-http11 エラー型

use std::fmt;

use oneshot_http11::Response;

/// blocking-http11 エラー
///
/// トランスポートの失敗はメッセージだけを保持する。
/// これによりエラーは `Clone` のまま、ワーカースレッドから呼び出し側に渡せる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 名前解決のタイムアウト内に名前解決が終わらなかった
    ResolveTimeout,
    /// 接続タイムアウト内に接続できなかった
    ConnectTimeout,
    /// リクエストタイムアウト内に送信からボディ終了までが終わらなかった
    RequestTimeout,
    /// 名前解決に失敗
    Resolve(String),
    /// 名前解決の結果アドレスがなかった
    NoEndpoints,
    /// 接続に失敗
    Connect(String),
    /// 送受信中の I/O エラー
    Io(String),
    /// ヘッダーブロックの完了前に相手が閉じた
    ConnectionClosed,
    /// ステータス行が HTTP のステータス行でない
    InvalidResponse,
    /// レスポンスがデコーダーの制限を超えた
    Http(oneshot_http11::Error),
    /// 作成時に渡したホストまたは IP アドレスが不正
    InvalidAddress(String),
    /// ワーカーのランタイムまたはスレッドを起動できなかった
    Runtime(String),
    /// ワーカーがやり取りを失った
    Exception,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ResolveTimeout => write!(f, "resolve timeout"),
            Error::ConnectTimeout => write!(f, "connect timeout"),
            Error::RequestTimeout => write!(f, "request timeout"),
            Error::Resolve(msg) | Error::Connect(msg) | Error::Io(msg) => write!(f, "{}", msg),
            Error::NoEndpoints => write!(f, "no endpoints resolved"),
            Error::ConnectionClosed => write!(f, "connection closed"),
            Error::InvalidResponse => write!(f, "invalid http response"),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::InvalidAddress(msg) => write!(f, "invalid address: {}", msg),
            Error::Runtime(msg) => write!(f, "runtime error: {}", msg),
            Error::Exception => write!(f, "request occurred exception"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<oneshot_http11::Error> for Error {
    fn from(e: oneshot_http11::Error) -> Self {
        match e {
            oneshot_http11::Error::InvalidResponse => Error::InvalidResponse,
            e => Error::Http(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// 失敗したリクエスト
///
/// エラーと、失敗までにデコードしたレスポンスを持つ。
/// レスポンスのフィールドを使う前にエラーを確認すること。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// エラー
    pub error: Error,
    /// 失敗までにデコードしたレスポンス
    pub response: Response,
}

impl Failure {
    /// 空のレスポンスを持つ Failure
    pub fn new(error: Error) -> Self {
        Self {
            error,
            response: Response::default(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<Failure> for Error {
    fn from(failure: Failure) -> Self {
        failure.error
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
