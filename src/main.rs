use std::process;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDateTime;
use clap::Parser;
use log::{debug, error};

use xmlrpc_codec::xmlrpc::{Client, MethodCall, MethodResponse, Value, DATE_TIME_FORMAT};
use xmlrpc_codec::ClientConfig;

/// Call a remote XML-RPC method and print what it returns.
#[derive(Parser, Debug)]
#[command(name = "xmlrpc-call", version, author)]
struct Cli {
    /// Endpoint, e.g. "http://localhost:8080/RPC2"
    #[arg(short, long)]
    url: String,

    /// User-Agent header sent with the request
    #[arg(long)]
    user_agent: Option<String>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Verbose mode, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Remote method name
    method: String,

    /// Arguments as type:text (int, i4, double, bool, string, base64,
    /// datetime) or the bare word nil; untyped text is sent as a string
    args: Vec<String>,
}

fn parse_arg(arg: &str) -> Result<Value, String> {
    if arg == "nil" {
        return Ok(Value::Nil);
    }
    let (kind, text) = match arg.split_once(':') {
        Some(pair) => pair,
        None => return Ok(Value::from(arg)),
    };
    match kind {
        "int" | "i4" => text
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|e| format!("bad integer {:?}: {}", text, e)),
        "double" => text
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|e| format!("bad double {:?}: {}", text, e)),
        "bool" => match text.trim() {
            "1" | "true" => Ok(Value::Boolean(true)),
            "0" | "false" => Ok(Value::Boolean(false)),
            other => Err(format!("bad boolean {:?}", other)),
        },
        "string" => Ok(Value::from(text)),
        "base64" => STANDARD
            .decode(text.trim())
            .map(Value::Binary)
            .map_err(|e| format!("bad base64 {:?}: {}", text, e)),
        "datetime" => NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT)
            .map(Value::DateTime)
            .map_err(|e| format!("bad datetime {:?}: {}", text, e)),
        _ => Ok(Value::from(arg)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<bool, String> {
    let params = cli
        .args
        .iter()
        .map(|arg| parse_arg(arg))
        .collect::<Result<Vec<_>, _>>()?;
    for (i, param) in params.iter().enumerate() {
        debug!("param {}: {}", i, param);
    }

    let mut config = ClientConfig::new(&cli.url);
    if let Some(ref user_agent) = cli.user_agent {
        config = config.with_user_agent(user_agent);
    }
    if let Some(secs) = cli.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let client = Client::new(config);
    let call = MethodCall::new(&cli.method, params);
    match client.call(&call).map_err(|e| e.to_string())? {
        MethodResponse::Params(values) => {
            for value in values {
                println!("{}", value);
            }
            Ok(true)
        }
        MethodResponse::Fault(fault) => {
            println!("fault {}: {}", fault.code(), fault.message());
            Ok(false)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            process::exit(2);
        }
    }
}
