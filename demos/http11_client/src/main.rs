//! ブロッキング HTTP/1.1 クライアントの例
//!
//! 使い方:
//!   cargo run -p http11_client -- 127.0.0.1 8080 GET /
//!   cargo run -p http11_client -- --host example.com GET /index.html
//!   cargo run -p http11_client -- --header "X-A: 1" --data hello 127.0.0.1 8080 POST /api
//!
//! `RESULT: <version> <code> <message> <error>` を表示し、続けてボディを表示する。
//! 引数を解釈できればリクエストの結果に関係なく終了ステータスは 0。

use std::io::Write;
use std::time::Duration;

use blocking_http11::{Client, Config, Response, Target};
use tracing_subscriber::EnvFilter;

struct Options {
    target: Target,
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    data: Vec<u8>,
    config: Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(options) = parse_args()? else {
        return Ok(());
    };

    let mut client = Client::with_config(options.target, options.config)?;
    let (response, error) = match client
        .request(&options.method, &options.path)
        .headers(options.headers)
        .body(options.data)
        .send()
    {
        Ok(response) => (response, String::new()),
        Err(failure) => (failure.response, failure.error.to_string()),
    };

    print_result(&response, &error)?;
    Ok(())
}

fn parse_args() -> Result<Option<Options>, Box<dyn std::error::Error>> {
    let mut args = noargs::raw_args();
    args.metadata_mut().app_name = "http11_client";

    // --help フラグ
    noargs::HELP_FLAG.take_help(&mut args);

    // --version フラグ
    let version_flag: bool = noargs::flag("version")
        .short('V')
        .doc("Show version")
        .take(&mut args)
        .is_present();
    if version_flag {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    // --debug フラグ
    let debug: bool = noargs::flag("debug")
        .doc("Enable debug logging (RUST_LOG takes precedence)")
        .take(&mut args)
        .is_present();

    // --host オプション: <IP> <PORT> の代わりに名前解決する
    let host: Option<String> = noargs::opt("host")
        .doc("Host name with optional port (e.g., example.com:8080)")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // --header オプション (複数指定可)
    let mut headers = Vec::new();
    while let Some(header) = noargs::opt("header")
        .short('H')
        .doc("Request header \"Name: Value\" (repeatable)")
        .take(&mut args)
        .present_and_then(|o| parse_header(o.value()))
        .map_err(|e| format!("{:?}", e))?
    {
        headers.push(header);
    }

    // --data オプション
    let data: Vec<u8> = noargs::opt("data")
        .short('d')
        .doc("Request body")
        .take(&mut args)
        .present_and_then(|o| Ok::<_, &str>(o.value().as_bytes().to_vec()))
        .map_err(|e| format!("{:?}", e))?
        .unwrap_or_default();

    // --connect-timeout オプション
    let connect_timeout: f64 = noargs::opt("connect-timeout")
        .doc("Connect timeout in seconds")
        .default("3")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // --request-timeout オプション
    let request_timeout: f64 = noargs::opt("request-timeout")
        .doc("Timeout from sending to the end of the body, in seconds")
        .default("30")
        .take(&mut args)
        .then(|o| o.value().parse())
        .map_err(|e| format!("{:?}", e))?;

    // 位置引数
    let target = match &host {
        Some(host) => Target::host(host)?,
        None => {
            let ip: String = noargs::arg("<IP>")
                .doc("IP address (omit with --host)")
                .take(&mut args)
                .then(|a| Ok::<_, &str>(a.value().to_string()))
                .map_err(|e| format!("{:?}", e))?;
            let port: u16 = noargs::arg("<PORT>")
                .doc("Port (omit with --host)")
                .take(&mut args)
                .then(|a| a.value().parse())
                .map_err(|e| format!("{:?}", e))?;
            Target::addr(&ip, port)?
        }
    };
    let method: String = noargs::arg("<METHOD>")
        .doc("Request method, sent verbatim (e.g., GET)")
        .take(&mut args)
        .then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;
    let path: String = noargs::arg("<PATH>")
        .doc("Request target (e.g., /index.html)")
        .take(&mut args)
        .then(|a| Ok::<_, &str>(a.value().to_string()))
        .map_err(|e| format!("{:?}", e))?;

    // 未知の引数があればエラー、ヘルプが返されたら表示
    if let Some(help) = args.finish().map_err(|e| format!("{:?}", e))? {
        print!("{}", help);
        return Ok(None);
    }

    init_logging(debug);

    let config = Config::default()
        .connect_timeout(seconds(connect_timeout)?)
        .request_timeout(seconds(request_timeout)?);

    Ok(Some(Options {
        target,
        method,
        path,
        headers,
        data,
        config,
    }))
}

fn parse_header(value: &str) -> Result<(String, String), &'static str> {
    let (name, value) = value
        .split_once(':')
        .ok_or("header must be \"Name: Value\"")?;
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty");
    }
    Ok((name.to_string(), value.trim_start().to_string()))
}

fn seconds(value: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(value).map_err(|e| format!("invalid timeout {}: {}", value, e))
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(response: &Response, error: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "RESULT: {} {} {} {}",
        response.version, response.status_code, response.reason_phrase, error
    )?;
    writeln!(stdout, "response message:")?;
    stdout.write_all(&response.body)?;
    writeln!(stdout)?;
    stdout.flush()
}
