//! # oneshot_http11
//!
//! 1 回のリクエスト/レスポンスのやり取り向けの依存なし HTTP/1.1 コーデック (Sans I/O)
//!
//! リクエストは `Connection: close` 付きでエンコードし、レスポンスボディは
//! ヘッダーブロックの後に相手が接続を閉じるまでに送ってきたすべてとする。
//! chunked 転送のデコード、keep-alive、パイプラインには対応しない。
//!
//! ## 使い方
//!
//! ```rust
//! use oneshot_http11::{Request, ResponseDecoder, encode_exchange_request};
//!
//! // リクエストをエンコード
//! let request = Request::new("GET", "/").header("User-Agent", "demo");
//! let bytes = encode_exchange_request(&request, "example.com");
//! assert!(bytes.ends_with(b"Connection: close\r\n\r\n"));
//! // bytes を送信...
//!
//! // レスポンスをデコード
//! let mut decoder = ResponseDecoder::new();
//! decoder.feed(b"HTTP/1.1 200 OK\r\n\r\nhello").unwrap();
//! assert!(decoder.decode_headers().unwrap());
//! decoder.mark_eof();
//! assert_eq!(decoder.into_response().body, b"hello");
//! ```

mod decoder;
mod encoder;
mod error;
pub mod host;
mod limits;
mod request;
mod response;

pub use decoder::{ResponseDecoder, parse_header_line, parse_status_line};
pub use encoder::{encode_exchange_request, encode_request};
pub use error::Error;
pub use limits::DecoderLimits;
pub use request::Request;
pub use response::Response;
