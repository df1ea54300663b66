//! HTTP レスポンスデコーダー

use crate::error::Error;
use crate::limits::DecoderLimits;
use crate::response::Response;

use super::phase::DecodePhase;

/// HTTP レスポンスデコーダー (Sans I/O)
///
/// クライアントがソケットから読む順に、ステータス行、ヘッダーブロック、
/// 相手が接続を閉じるまでのボディの 3 段階でデコードする。
/// レスポンスの `Content-Length`、`Transfer-Encoding`、`Connection` は解釈しない。
#[derive(Debug)]
pub struct ResponseDecoder {
    buf: Vec<u8>,
    phase: DecodePhase,
    response: Response,
    limits: DecoderLimits,
}

impl Default for ResponseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDecoder {
    /// 新しいデコーダーを作成
    pub fn new() -> Self {
        Self::with_limits(DecoderLimits::default())
    }

    /// 制限付きでデコーダーを作成
    pub fn with_limits(limits: DecoderLimits) -> Self {
        Self {
            buf: Vec::new(),
            phase: DecodePhase::StatusLine,
            response: Response::default(),
            limits,
        }
    }

    /// 制限設定
    pub fn limits(&self) -> &DecoderLimits {
        &self.limits
    }

    /// 受信データを追加
    ///
    /// ヘッダーブロックのデコード後はそのままボディに追加する。
    pub fn feed(&mut self, data: &[u8]) -> Result<(), Error> {
        match self.phase {
            DecodePhase::BodyUntilClose => {
                let size = self.response.body.len() + data.len();
                if size > self.limits.max_body_size {
                    return Err(Error::BodyTooLarge {
                        size,
                        limit: self.limits.max_body_size,
                    });
                }
                self.response.body.extend_from_slice(data);
            }
            DecodePhase::StatusLine | DecodePhase::Headers => {
                self.buf.extend_from_slice(data);
            }
            // やり取りは終わっているので無視
            DecodePhase::Complete | DecodePhase::Rejected => {}
        }
        Ok(())
    }

    /// 未パースのステータス行・ヘッダーブロックのバイト列
    pub fn remaining(&self) -> &[u8] {
        &self.buf
    }

    /// 次のやり取りのためにデコーダーをリセット
    pub fn reset(&mut self) {
        self.buf.clear();
        self.phase = DecodePhase::StatusLine;
        self.response = Response::default();
    }

    /// ステータス行をデコード
    ///
    /// ステータス行をパースできたら `Ok(true)` (以降の呼び出しでも同じ)、
    /// データが足りなければ `Ok(false)` を返す。
    /// バージョンが `HTTP/` で始まらないステータス行は [`Error::InvalidResponse`]
    /// で拒否し、以降はパースしない。
    pub fn decode_status_line(&mut self) -> Result<bool, Error> {
        match self.phase {
            DecodePhase::StatusLine => {}
            DecodePhase::Rejected => return Err(Error::InvalidResponse),
            _ => return Ok(true),
        }

        let Some(pos) = self.take_line_end()? else {
            return Ok(false);
        };

        let (version, status_code, reason_phrase) = match split_status_line(&self.buf[..pos]) {
            Ok(parts) => parts,
            Err(e) => {
                self.phase = DecodePhase::Rejected;
                return Err(e);
            }
        };
        self.buf.drain(..pos + 2);

        self.response.version = version;
        self.response.status_code = status_code;
        self.response.reason_phrase = reason_phrase;
        self.phase = DecodePhase::Headers;
        Ok(true)
    }

    /// 空行までのヘッダー行をデコード
    ///
    /// 空行を読んだら `Ok(true)` を返し、それ以降のバイト列はボディの先頭になる。
    /// コロンのない行は読み飛ばす。
    /// ヘッダー行は lossy に文字列化するため、obs-text は U+FFFD に置き換わる。
    pub fn decode_headers(&mut self) -> Result<bool, Error> {
        match self.phase {
            DecodePhase::StatusLine => {
                if !self.decode_status_line()? {
                    return Ok(false);
                }
            }
            DecodePhase::Headers => {}
            DecodePhase::Rejected => return Err(Error::InvalidResponse),
            DecodePhase::BodyUntilClose | DecodePhase::Complete => return Ok(true),
        }

        loop {
            let Some(pos) = self.take_line_end()? else {
                return Ok(false);
            };

            if pos == 0 {
                // 空行 - ヘッダー終了
                self.buf.drain(..2);
                let body = std::mem::take(&mut self.buf);
                self.phase = DecodePhase::BodyUntilClose;
                self.feed(&body)?;
                return Ok(true);
            }

            let line = String::from_utf8_lossy(&self.buf[..pos]).into_owned();
            self.buf.drain(..pos + 2);

            if let Some(header) = parse_header_line(&line) {
                if self.response.headers.len() >= self.limits.max_headers_count {
                    return Err(Error::TooManyHeaders {
                        count: self.response.headers.len() + 1,
                        limit: self.limits.max_headers_count,
                    });
                }
                self.response.headers.push(header);
            }
        }
    }

    /// 相手が接続を閉じたことを通知
    ///
    /// ヘッダーブロックをデコード済みならボディを完了する。
    /// そうでなければ何もせず、[`is_complete`](Self::is_complete) は false のまま。
    pub fn mark_eof(&mut self) {
        if self.phase == DecodePhase::BodyUntilClose {
            self.phase = DecodePhase::Complete;
        }
    }

    /// ステータス行をデコード済みかどうか
    pub fn has_status_line(&self) -> bool {
        matches!(
            self.phase,
            DecodePhase::Headers | DecodePhase::BodyUntilClose | DecodePhase::Complete
        )
    }

    /// ヘッダーブロックをデコード済みかどうか
    pub fn has_headers(&self) -> bool {
        matches!(
            self.phase,
            DecodePhase::BodyUntilClose | DecodePhase::Complete
        )
    }

    /// 相手のクローズでボディが完了したかどうか
    pub fn is_complete(&self) -> bool {
        self.phase == DecodePhase::Complete
    }

    /// ここまでにデコードしたレスポンス
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// ここまでにデコードしたレスポンスを取り出し、デコーダーをリセット
    pub fn take_response(&mut self) -> Response {
        let response = std::mem::take(&mut self.response);
        self.reset();
        response
    }

    /// デコーダーを消費し、ここまでにデコードしたレスポンスを返す
    pub fn into_response(self) -> Response {
        self.response
    }

    /// ここまでに追加したデータをデコード
    ///
    /// [`mark_eof`](Self::mark_eof) でボディが完了した後だけ `Some` を返す。
    pub fn decode(&mut self) -> Result<Option<Response>, Error> {
        if !self.decode_headers()? {
            return Ok(None);
        }
        if !self.is_complete() {
            return Ok(None);
        }
        Ok(Some(self.take_response()))
    }

    /// バッファ中の次の CRLF の位置 (行長制限を確認する)
    fn take_line_end(&self) -> Result<Option<usize>, Error> {
        let limit = self.limits.max_header_line_size;
        match find_line(&self.buf) {
            Some(pos) if pos > limit => Err(Error::HeaderLineTooLong { size: pos, limit }),
            Some(pos) => Ok(Some(pos)),
            None if self.buf.len() > limit.saturating_add(1) => Err(Error::HeaderLineTooLong {
                size: self.buf.len(),
                limit,
            }),
            None => Ok(None),
        }
    }
}

fn find_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// ステータス行をパース (CRLF は含まない)
///
/// (バージョン, ステータスコード, ステータスメッセージ) を返す。
/// メッセージはステータスコード以降の先頭の空白を除いた残りで、空でもよい。
pub fn parse_status_line(line: &str) -> Result<(String, u16, String), Error> {
    split_status_line(line.as_bytes())
}

/// バイト列のままステータス行を分割
///
/// バージョンとステータスコードは ASCII でなければならない。
/// メッセージは obs-text (0x80-0xFF) を含みうるため lossy に文字列化する。
fn split_status_line(line: &[u8]) -> Result<(String, u16, String), Error> {
    let line = line.trim_ascii_start();
    let (version, rest) = split_token(line);
    if !version.starts_with(b"HTTP/") || !version.is_ascii() {
        return Err(Error::InvalidResponse);
    }

    let (code, message) = split_token(rest.trim_ascii_start());
    let status_code: u16 = std::str::from_utf8(code)
        .ok()
        .and_then(|code| code.parse().ok())
        .ok_or(Error::InvalidResponse)?;

    Ok((
        String::from_utf8_lossy(version).into_owned(),
        status_code,
        String::from_utf8_lossy(message.trim_ascii_start()).into_owned(),
    ))
}

/// 最初の空白で分割する。空白は残りの側に含めない
fn split_token(data: &[u8]) -> (&[u8], &[u8]) {
    match data.iter().position(u8::is_ascii_whitespace) {
        Some(pos) => (&data[..pos], &data[pos + 1..]),
        None => (data, &data[data.len()..]),
    }
}

/// ヘッダー行をパース (CRLF は含まない)
///
/// 最初のコロンで分割し、値の先頭の空白をちょうど 1 つだけ取り除く。
/// コロンのない行は `None` を返す。
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once(':')?;
    let value = value.strip_prefix(' ').unwrap_or(value);
    Some((name.to_string(), value.to_string()))
}
