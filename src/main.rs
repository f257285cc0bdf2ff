use clap::Parser;
use pubsql::console::{Console, Options};
use pubsql::gui;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use tracing::{Level, error};

/// Lexes and parses pubsql commands
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Parse a single command and exit
    #[arg(short, long, value_name = "COMMAND")]
    command: Option<String>,
    /// Print the token stream as well
    #[arg(long)]
    tokens: bool,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
    /// Open the console window
    #[arg(long, conflicts_with = "command")]
    gui: bool,
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    let options = Options {
        tokens: args.tokens,
        json: args.json,
    };
    if args.gui {
        return launch_gui(options);
    }
    let console = Console::new(options);
    if let Some(command) = args.command {
        return if run(&console, &command) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }
    println!("pubsql REPL (type '.exit' or '.quit' to stop)");
    let mut lines = io::stdin().lock().lines();
    loop {
        print!("pubsql> ");
        if let Err(err) = io::stdout().flush() {
            error!(%err, "failed to flush stdout");
            return ExitCode::FAILURE;
        }
        match lines.next() {
            Some(Ok(input)) => {
                let input = input.trim();
                // 종료 명령어 처리
                if input == ".exit" || input == ".quit" {
                    break;
                } else if !input.is_empty() {
                    run(&console, input);
                }
            }
            Some(Err(err)) => {
                error!(%err, "failed to read line");
                return ExitCode::FAILURE;
            }
            // stdin 종료
            None => break,
        }
    }
    ExitCode::SUCCESS
}

fn run(console: &Console, command: &str) -> bool {
    let outcome = console.run(command);
    match outcome.render(console.options()) {
        Ok(text) => println!("{text}"),
        Err(err) => error!(%err, "failed to render result"),
    }
    outcome.is_ok()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn launch_gui(options: Options) -> ExitCode {
    if let Err(err) = gui::Application::new(options).launch() {
        error!(%err, "console window failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
