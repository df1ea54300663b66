//! クライアント設定

use std::time::Duration;

use oneshot_http11::DecoderLimits;

/// クライアント設定
///
/// ```
/// use std::time::Duration;
/// use blocking_http11::Config;
///
/// let config = Config::default()
///     .connect_timeout(Duration::from_secs(1))
///     .request_timeout(Duration::from_secs(10));
/// assert_eq!(config.resolve_timeout, Duration::from_secs(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 名前解決のタイムアウト (デフォルト: 3 秒)
    pub resolve_timeout: Duration,
    /// 接続タイムアウト (デフォルト: 3 秒)
    pub connect_timeout: Duration,
    /// 送信開始からボディ終了までのタイムアウト (デフォルト: 30 秒)
    pub request_timeout: Duration,
    /// 1 回のソケット読み込みサイズ (デフォルト: 8KB)
    pub read_buffer_size: usize,
    /// レスポンスデコーダーの制限 (デフォルト: ボディサイズは制限なし)
    pub limits: DecoderLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_secs(3),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
            read_buffer_size: 8192,
            limits: DecoderLimits::default(),
        }
    }
}

impl Config {
    /// 名前解決のタイムアウトを設定
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = timeout;
        self
    }

    /// 接続タイムアウトを設定
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// リクエストタイムアウトを設定
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// ソケット読み込みサイズを設定
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// デコーダーの制限を設定
    pub fn limits(mut self, limits: DecoderLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 1 回のリクエストで呼び出し側がブロックされる時間の上限
    pub fn max_request_duration(&self) -> Duration {
        self.resolve_timeout + self.connect_timeout + self.request_timeout
    }
}
