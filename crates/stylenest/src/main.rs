//! Stylenest - flattens nested stylesheets into plain CSS
//!
//! Usage: stylenest [OPTIONS] <SOURCE>...

use std::env;
use std::error::Error;
use std::io::{self, Read};
use std::process::ExitCode;

use log::{info, warn};

use stylenest_css::{
    emit, flatten_with_diagnostics, Flattened, StyleSheetSink, BASE_RESET, DEFAULT_SINK_KEY,
};
use stylenest_net::{Source, StylesheetFetcher};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for a flattening run
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    /// Print rules and diagnostics as JSON instead of CSS
    json: bool,
    /// Report diagnostics and fail on unbalanced input
    check: bool,
    /// Start with the base page reset
    reset: bool,
    /// Paths, URLs, or `-` for stdin
    sources: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Version,
    Run(Options),
}

/// What a run produced
struct Output {
    text: String,
    /// False if some source stopped at an unclosed block
    complete: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("stylenest");

    match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(Command::Help) => {
            print_usage(program);
            ExitCode::SUCCESS
        }
        Ok(Command::Version) => {
            println!("Stylenest {}", VERSION);
            ExitCode::SUCCESS
        }
        Ok(Command::Run(options)) => match run(&options).await {
            Ok(output) => {
                println!("{}", output.text);
                if options.check && !output.complete {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(message) => {
            eprintln!("{}\n", message);
            print_usage(program);
            ExitCode::FAILURE
        }
    }
}

fn print_usage(program: &str) {
    println!(
        r#"Stylenest {} - flattens nested stylesheets into plain CSS

USAGE:
    {} [OPTIONS] <SOURCE>...

SOURCES:
    A file path, an http(s) or file:// URL, or - for stdin.
    Sources are flattened in order into one style sheet.

OPTIONS:
    -h, --help        Print this help message
    -V, --version     Print version information
    --json            Print the flattened rules and diagnostics as JSON
    --check           Report skipped input; fail if a block is never closed
    --reset           Start with a body margin/padding reset

EXAMPLES:
    {} styles/app.scss
    {} --check https://example.com/theme.css
    cat nested.css | {} -
"#,
        VERSION, program, program, program, program
    );
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut options = Options::default();

    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--json" => options.json = true,
            "--check" => options.check = true,
            "--reset" => options.reset = true,
            "-" => options.sources.push(arg.clone()),
            flag if flag.starts_with('-') => return Err(format!("Unknown option: {}", flag)),
            source => options.sources.push(source.to_string()),
        }
    }

    if options.sources.is_empty() {
        return Err("No source given".to_string());
    }

    Ok(Command::Run(options))
}

/// Flatten every source in order
async fn run(options: &Options) -> Result<Output, Box<dyn Error>> {
    let mut fetcher = StylesheetFetcher::new()?;
    let mut sink = StyleSheetSink::new();
    let mut collected = Flattened::default();
    let mut complete = true;

    let mut texts = Vec::new();
    if options.reset {
        texts.push(("<reset>".to_string(), BASE_RESET.to_string()));
    }
    for name in &options.sources {
        texts.push((name.clone(), read_source(&mut fetcher, name).await?));
    }

    for (name, text) in texts {
        let flattened = flatten_with_diagnostics(&text);

        if options.check {
            for diagnostic in &flattened.diagnostics {
                if diagnostic.is_fatal() {
                    warn!("{}: {}", name, diagnostic);
                } else {
                    info!("{}: {}", name, diagnostic);
                }
            }
        }
        complete &= flattened.is_complete();

        if options.json {
            collected.rules.extend(flattened.rules);
            collected.diagnostics.extend(flattened.diagnostics);
        } else {
            let css = emit(&flattened.rules);
            // keep one rule per line across sources
            if !css.is_empty() && !sink.text().is_empty() {
                sink.append(DEFAULT_SINK_KEY, "\n");
            }
            sink.append(DEFAULT_SINK_KEY, &css);
        }
    }

    let text = if options.json {
        serde_json::to_string_pretty(&collected)?
    } else {
        sink.text().to_string()
    };

    Ok(Output { text, complete })
}

async fn read_source(fetcher: &mut StylesheetFetcher, name: &str) -> Result<String, Box<dyn Error>> {
    if name == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let source = Source::parse(name)?;
    Ok(fetcher.load(&source).await?)
}
