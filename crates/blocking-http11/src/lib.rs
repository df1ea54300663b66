//! blocking_http11 - oneshot_http11 を使ったブロッキング HTTP/1.1 クライアント
//!
//! 1 接続 1 リクエスト: 名前解決、接続、送信の後、ステータス行、ヘッダー、
//! 相手が閉じるまでのボディを読む。tokio ランタイムを動かすバックグラウンド
//! スレッドがソケット処理を行い、その間呼び出し側のスレッドはブロックする。
//!
//! ## タイムアウト
//!
//! | フェーズ | デフォルト | エラー |
//! |-------|---------|-------|
//! | 名前解決 | 3 秒 | `resolve timeout` |
//! | 接続 | 3 秒 | `connect timeout` |
//! | 送信からボディ終了まで | 30 秒 | `request timeout` |
//!
//! ## クライアント
//!
//! ```no_run
//! use blocking_http11::{Client, ResponseExt};
//!
//! // ホスト名 (リクエストごとに名前解決、ポート省略時は 80)
//! let mut client = Client::new("example.com")?;
//! let response = client.get("/index.html").send()?;
//! println!("{}", response.status_line());
//!
//! // IP アドレスとポート
//! let mut client = Client::with_addr("127.0.0.1", 8080)?;
//! let response = client
//!     .post("/api")
//!     .header("Content-Type", "application/json")
//!     .body(b"{\"key\": \"value\"}".to_vec())
//!     .send()?;
//! println!("{}", response.text()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## エラー
//!
//! 失敗したリクエストは [`Error`] と、失敗までにデコードしたレスポンスを持つ
//! [`Failure`] を返す:
//!
//! ```no_run
//! use blocking_http11::{Client, Error};
//!
//! let mut client = Client::with_addr("10.255.255.1", 80)?;
//! match client.get("/").send() {
//!     Ok(response) => println!("{}", response.status_code),
//!     Err(failure) if failure.error == Error::ConnectTimeout => println!("unreachable"),
//!     Err(failure) => println!("{}", failure),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod exchange;
pub mod response_ext;
pub mod target;
pub mod transport;
mod worker;

pub use client::{Client, RequestBuilder};
pub use config::Config;
pub use error::{Error, Failure, Result};
pub use exchange::{Checkpoint, Phase};
pub use response_ext::{JsonError, ResponseExt};
pub use target::Target;
pub use transport::{TcpTransport, Transport};

// oneshot_http11 の型を再エクスポート
pub use oneshot_http11::{DecoderLimits, Request, Response};
