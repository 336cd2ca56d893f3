mod app;
mod calendar;
mod clock;
mod editor;
mod entries;
mod help;
mod logging;
mod session;
mod theme;
use crate::app::App;
use crate::calendar::WeekStart;
use crate::clock::{Clock, LocalClock};
use crate::entries::{DateKey, EntryRepository, JsonFileRepository, MemoryRepository};
use crate::logging::{choose_level, init_logging, DEFAULT_LOG_LEVEL, LOG_LEVEL_ENV};
use crate::session::CalendarState;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use log::info;
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use time::Date;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Config {
    start: Option<Date>,
    week_start: WeekStart,
    journal: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    log_level: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(Config),
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut config = Config::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('w') | Arg::Long("week-start") => {
                    config.week_start = parser.value()?.parse()?;
                }
                Arg::Short('j') | Arg::Long("journal") => {
                    config.journal = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log-dir") => config.log_dir = Some(PathBuf::from(parser.value()?)),
                Arg::Long("log-level") => config.log_level = Some(parser.value()?.string()?),
                Arg::Value(value) if config.start.is_none() => {
                    config.start = Some(value.parse::<DateKey>()?.date());
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(config))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(config) => {
                // The UTC offset has to be looked up before any other threads
                // (such as the logger's) are started.
                let clock = LocalClock::new().context("failed to determine local date")?;
                let _logger = match &config.log_dir {
                    Some(dir) => {
                        let level = choose_level(
                            config.log_level.clone(),
                            std::env::var(LOG_LEVEL_ENV).ok(),
                        );
                        Some(init_logging(dir, &level).context("failed to start logging")?)
                    }
                    None => None,
                };
                let today = clock.today();
                let mut state = CalendarState::new(today, config.week_start);
                if let Some(date) = config.start {
                    state = state.with_start_date(date);
                }
                info!(
                    "event=app_start today={} week_start={}",
                    DateKey::from(today),
                    config.week_start
                );
                match &config.journal {
                    Some(path) => {
                        let repo = JsonFileRepository::open(path)
                            .context("failed to open journal")?;
                        info!("event=repo_ready kind=json path={}", repo.path().display());
                        run_app(state, repo, clock)
                    }
                    None => {
                        info!("event=repo_ready kind=memory");
                        run_app(state, MemoryRepository::new(), clock)
                    }
                }
            }
            Command::Help => {
                println!("Usage: calvas [OPTIONS] [YYYY-MM-DD]");
                println!();
                println!("Terminal month calendar for attaching notes and photos to days");
                println!();
                println!("Options:");
                println!("  -w, --week-start <DAY>   First day of the week [default: sunday]");
                println!("  -j, --journal <PATH>     JSON journal file to load and save entries");
                println!("      --log-dir <DIR>      Write logs to files in the given directory");
                println!(
                    "      --log-level <LEVEL>  Log level spec [default: ${LOG_LEVEL_ENV} or {DEFAULT_LOG_LEVEL}]"
                );
                println!("  -h, --help               Display this help message and exit");
                println!("  -V, --version            Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn run_app<R: EntryRepository, C: Clock>(
    state: CalendarState,
    repo: R,
    clock: C,
) -> anyhow::Result<()> {
    with_terminal(|mut terminal| {
        terminal.hide_cursor().context("failed to hide cursor")?;
        App::new(state, repo, clock).run(&mut terminal)?;
        Ok(())
    })
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}
