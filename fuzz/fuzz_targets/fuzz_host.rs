#![no_main]

use libfuzzer_sys::fuzz_target;
use oneshot_http11::host::Host;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(host) = Host::parse(input) {
        // Host ヘッダーの値を再パースすると同じホストになる
        let again = Host::parse(&host.to_string()).expect("reparse");
        assert_eq!(host, again);
        let _ = host.lookup_name();
    }
});
