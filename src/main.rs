use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{unbounded, Receiver};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use docujudge::{
    ai::{EvaluationService, HttpClientFactory},
    ai_worker::spawn_worker,
    batch::BatchEvent,
    config::{EvaluationConfig, Overrides, Provider, Settings},
    documents::DEFAULT_DOCUMENTS_DIR,
    error::ConfigError,
    export::{write_json, DEFAULT_EXPORT_FILE},
    headless::{run_files, HeadlessRun},
    logger,
    models::{ResultSet, WorkerEvent},
    session::App,
    ui::draw,
    utils::{confidence_bar, single_line, truncate_string},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

/// Judge documents against a golden standard with an LLM.
#[derive(Parser, Debug)]
#[command(name = "docujudge", version, about)]
struct Args {
    /// Golden standard file. When given, runs without the terminal UI.
    #[arg(long)]
    golden: Option<PathBuf>,

    /// Documents to evaluate in headless mode.
    documents: Vec<PathBuf>,

    /// Where the CSV export is written.
    #[arg(long, default_value = DEFAULT_EXPORT_FILE)]
    output: PathBuf,

    /// Print results as JSON instead of a table (headless mode).
    #[arg(long)]
    json: bool,

    #[arg(long)]
    provider: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    temperature: Option<f64>,

    #[arg(long)]
    max_tokens: Option<i64>,

    /// API key for the selected provider; overrides the environment.
    #[arg(long)]
    api_key: Option<String>,

    /// Directory the terminal UI lists documents from.
    #[arg(long, default_value = DEFAULT_DOCUMENTS_DIR)]
    dir: PathBuf,

    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
}

impl Args {
    /// A key given on the command line belongs to the provider selected at
    /// startup and is not reused when the provider changes.
    fn overrides(&self, settings: &Settings) -> Result<Overrides, ConfigError> {
        let provider = match &self.provider {
            Some(name) => name.parse::<Provider>()?,
            None => settings.default_provider()?,
        };
        Ok(Overrides {
            provider: self.provider.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            api_key: self.api_key.clone().map(|key| (provider, key)),
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();
    let _guard = logger::init(&args.log_dir)?;

    let settings = Settings::from_env()?;
    let overrides = args
        .overrides(&settings)
        .context("invalid evaluation settings")?;

    match &args.golden {
        Some(golden) => run_headless(&args, golden, &settings, &overrides),
        None => {
            let config = settings
                .resolve(&overrides)
                .context("invalid evaluation settings")?;
            tracing::info!(config = %config.summary(), "configuration resolved");
            run_tui(&args, settings, overrides, config)
        }
    }
}

fn run_headless(
    args: &Args,
    golden: &Path,
    settings: &Settings,
    overrides: &Overrides,
) -> Result<()> {
    let run = HeadlessRun {
        golden: golden.to_path_buf(),
        documents: args.documents.clone(),
        output: args.output.clone(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(run_files(
        settings,
        overrides,
        Arc::new(HttpClientFactory),
        &run,
        |event| match event {
            BatchEvent::Progress(p) => eprintln!("[{}/{}] {}", p.index, p.total, p.filename),
            BatchEvent::Skipped(s) => eprintln!("Skipped {}: {}", s.name, s.reason),
            BatchEvent::Evaluated(_) => {}
        },
    ))?;

    if args.json {
        write_json(&outcome.results, io::stdout().lock())?;
    } else {
        print_table(&outcome.results);
    }
    eprintln!(
        "{} passed, {} errors, {} skipped. Results written to {}",
        outcome.results.passed(),
        outcome.results.errors(),
        outcome.skipped.len(),
        args.output.display()
    );
    Ok(())
}

fn print_table(results: &ResultSet) {
    println!(
        "{:<28} {:<8} {:<17} Explanation",
        "Document", "Verdict", "Confidence"
    );
    for r in results {
        println!(
            "{:<28} {:<8} {:<17} {}",
            truncate_string(&r.document, 28),
            r.verdict,
            confidence_bar(r.confidence, 10),
            truncate_string(&single_line(&r.explanation), 80)
        );
    }
}

fn run_tui(
    args: &Args,
    settings: Settings,
    overrides: Overrides,
    config: EvaluationConfig,
) -> Result<()> {
    let service = EvaluationService::with_http(config.clone())?;
    let (requests_tx, requests_rx) = unbounded();
    let (events_tx, events_rx) = unbounded();
    let worker = spawn_worker(service, events_tx, requests_rx)?;

    let mut app = App::new(
        args.dir.clone(),
        settings,
        overrides,
        config,
        args.output.clone(),
        requests_tx,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &events_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Dropping the app closes the request channel and lets the worker exit.
    drop(app);
    if worker.join().is_err() {
        tracing::error!("worker thread panicked");
    }
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events_rx: &Receiver<WorkerEvent>,
) -> Result<()> {
    loop {
        while let Ok(event) = events_rx.try_recv() {
            app.handle_worker_event(event);
        }

        terminal.draw(|f| draw(f, app))?;

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
