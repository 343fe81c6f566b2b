use std::io::{self, stdout, Stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use medq::app::LogicThread;
use medq::config::Config;
use medq::display::ResponseView;
use medq::query::{QueryClient, QueryRequest};
use medq::render::{RenderState, FRAME_DURATION};
use medq::{qlog, qlog_error, ui, Error, Result};

/// medq - terminal client for a medical question-answering backend
#[derive(Parser, Debug)]
#[command(name = "medq")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    MEDQ_DEBUG=1      Enable debug logging (alternative to --debug)\n    MEDQ_DEBUG=trace  Also log every state snapshot")]
pub struct Cli {
    /// Backend base URL (overrides ~/.medq/medq.toml)
    #[arg(short = 'e', long, global = true)]
    pub endpoint: Option<String>,

    /// Enable debug logging (writes to ~/.medq/medq.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Submit one query without the TUI and print the answer
    Ask {
        /// The question to send
        query: String,

        /// Print the raw JSON response instead of formatted fields
        #[arg(long)]
        json: bool,
    },

    /// List the configured example queries
    Examples,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    medq::log::init(cli.debug);

    let config = Config::load()?.with_endpoint(cli.endpoint);

    match cli.command {
        Some(Command::Ask { query, json }) => {
            if let Err(e) = run_ask(&config, &query, json) {
                qlog_error!("Ask failed: {}", e);
                eprintln!("Error: {}", e.user_message());
                std::process::exit(1);
            }
            return Ok(());
        }
        Some(Command::Examples) => {
            for example in &config.examples {
                println!("{}", example);
            }
            return Ok(());
        }
        None => {}
    }

    if cli.debug {
        qlog!("medq starting (debug mode enabled) endpoint={}", config.endpoint);
    } else {
        qlog!("medq starting endpoint={}", config.endpoint);
    }

    // Fail before taking over the terminal
    QueryClient::new(&config.endpoint, config.request_timeout())?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle =
        thread::spawn(move || LogicThread::run(config, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle.join();
    restore_terminal(&mut terminal)?;

    match logic_result {
        Ok(Err(e)) => {
            qlog_error!("Logic thread exited with error: {}", e);
            return Err(e);
        }
        Err(_) => qlog_error!("Logic thread panicked"),
        Ok(Ok(())) => {}
    }
    result
}

/// Submit one query and print the result to stdout.
fn run_ask(config: &Config, query: &str, json: bool) -> Result<()> {
    let request = QueryRequest::new(query)?;
    let client = QueryClient::new(&config.endpoint, config.request_timeout())?;
    qlog!("Ask command: url={} len={}", client.url(), request.query.len());

    let rt = tokio::runtime::Runtime::new()?;
    let response = rt.block_on(client.submit(&request)).map_err(Error::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", ResponseView::from_response(&response).to_plain_text());
    }
    Ok(())
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableBracketedPaste)?;
    // Needed to tell Ctrl+Enter apart from Enter
    if supports_keyboard_enhancement().unwrap_or(false) {
        execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    if supports_keyboard_enhancement().unwrap_or(false) {
        execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
    }
    execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
