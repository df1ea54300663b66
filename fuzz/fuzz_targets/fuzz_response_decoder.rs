#![no_main]

use libfuzzer_sys::fuzz_target;
use oneshot_http11::{DecoderLimits, ResponseDecoder};

fuzz_target!(|data: &[u8]| {
    // 一度にすべて与えてから相手のクローズ
    let mut decoder = ResponseDecoder::new();
    if decoder.feed(data).is_ok() {
        let _ = decoder.decode_headers();
        decoder.mark_eof();
        if let Ok(Some(response)) = decoder.decode() {
            assert!(response.body.len() <= data.len());
        }
    }

    // ソケットの読み込み程度に小分け
    decoder.reset();
    for chunk in data.chunks(23) {
        if decoder.feed(chunk).is_err() {
            return;
        }
        if decoder.decode_headers().is_err() {
            return;
        }
    }
    decoder.mark_eof();
    let _ = decoder.decode();

    // 厳しい制限
    let limits = DecoderLimits {
        max_header_line_size: 32,
        max_headers_count: 2,
        max_body_size: 16,
    };
    let mut decoder = ResponseDecoder::with_limits(limits);
    if decoder.feed(data).is_ok() && decoder.decode_headers().is_ok() {
        assert!(decoder.response().headers.len() <= 2);
        assert!(decoder.response().body.len() <= 16);
    }
});
