use anyhow::{bail, Context, Result};
use reddit_extractor::{error_response, init_tracing_once, write_atomic, ExtractorOptions, RedditExtractor};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "usage: reddit-extractor <request.json | -> [report-out.json]";

fn read_request(arg: &str) -> Result<Value> {
    let text = if arg == "-" {
        let mut s = String::new();
        std::io::stdin().read_to_string(&mut s).context("read request from stdin")?;
        s
    } else {
        std::fs::read_to_string(arg).with_context(|| format!("read request file {arg}"))?
    };
    serde_json::from_str(&text).context("request is not valid JSON")
}

fn main() -> Result<ExitCode> {
    init_tracing_once();
    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!(USAGE);
    };
    let out = args.next().map(PathBuf::from);

    let raw = read_request(&input)?;
    let extractor = RedditExtractor::with_options(ExtractorOptions::from_env());

    match extractor.prepare(&raw) {
        Ok(prepared) => {
            let preview = prepared.preview();
            let text = serde_json::to_string_pretty(&preview)?;
            println!("{text}");
            if let Some(path) = out {
                let report = serde_json::to_vec_pretty(&prepared.report)?;
                write_atomic(&path, &report)?;
                tracing::info!("wrote processing report to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(issues) => {
            let response = error_response(&issues, Some(&raw));
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(ExitCode::from(2))
        }
    }
}
