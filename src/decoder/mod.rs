//! HTTP/1.1 レスポンスデコーダー
//!
//! `Connection: close` 接続での 1 回のやり取り向けの Sans I/O ストリーミングデコーダー
//!
//! ## 使い方
//!
//! ```rust
//! use oneshot_http11::ResponseDecoder;
//!
//! let mut decoder = ResponseDecoder::new();
//! decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhel").unwrap();
//! assert!(decoder.decode_status_line().unwrap());
//! assert!(decoder.decode_headers().unwrap());
//! decoder.feed(b"lo").unwrap();
//!
//! // 相手が接続を閉じた
//! decoder.mark_eof();
//! let response = decoder.into_response();
//! assert_eq!(response.status_code, 200);
//! assert_eq!(response.body, b"hello");
//! ```

mod phase;
mod response;

pub use response::{ResponseDecoder, parse_header_line, parse_status_line};
