use clap::Parser;
use log::*;
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            RollingFileAppender,
            policy::compound::{
                CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
            },
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::PathBuf;
use time::{Date, macros::format_description};
use ultiscores_common::{
    clock::SystemWallClock,
    config::{Config, Site},
    output::OutputTarget,
    ultiscores::{Query, ScoreboardClient},
};

mod commands;
mod polling_loop;
use polling_loop::PollingLoop;

#[cfg(test)]
mod test_support;

const APP_NAME: &str = "scores-reader";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long)]
    /// Which Ultiscores site to read from: test or wu
    url: Site,

    #[clap(long)]
    /// Game to read
    game: Option<u32>,

    #[clap(long, value_parser = parse_date)]
    /// Date of the schedule to list, as YYYY-MM-DD
    date: Option<Date>,

    #[clap(long)]
    /// Run the game clock for `--game` until the game ends
    start: bool,

    #[clap(long)]
    /// Print the game state without writing the overlay files
    no_write: bool,

    #[clap(long)]
    /// Don't verify the server's TLS certificate
    insecure: bool,

    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

fn parse_date(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
}

fn init_logging(args: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match &args.log_location {
        Some(path) => path.clone(),
        None => directories::BaseDirs::new()
            .ok_or("Could not find a directory to store logs")?
            .data_local_dir()
            .join("scores-reader-logs"),
    };
    let log_path = log_base_path.join(format!("{APP_NAME}-log.txt"));
    let archived_log_path = log_base_path.join(format!("{APP_NAME}-log-{{}}.txt.gz"));

    #[cfg(not(target_os = "windows"))]
    let console_target = Target::Stderr;
    #[cfg(target_os = "windows")]
    let console_target = Target::Stdout;
    let console = ConsoleAppender::builder()
        .target(console_target)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .to_str()
            .ok_or("Log path is not valid unicode")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(log_path, Box::new(file_policy))?;

    // Setup the logging from all locations to use `LevelFilter::Error`
    let root = Root::builder()
        .appender("file_appender")
        .appender("console")
        .build(LevelFilter::Error);

    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)))
        .appender(Appender::builder().build("console", Box::new(console)))
        .logger(Logger::builder().build("scores_reader", log_level))
        .logger(Logger::builder().build("ultiscores_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();
    Ok(())
}

fn load_config() -> Result<Config, confy::ConfyError> {
    info!(
        "Reading config file from {:?}",
        confy::get_configuration_file_path(APP_NAME, None)?
    );

    match confy::load(APP_NAME, None) {
        Ok(c) => Ok(c),
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = Config::default();
            confy::store(APP_NAME, None, &config)?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    init_logging(&args)?;

    let config = load_config()?;

    let Some(query) = Query::from_inputs(args.game, args.date, !args.no_write) else {
        error!("Please specify either --game or --date");
        return Err("Nothing to do, neither --game nor --date was given".into());
    };

    let client = ScoreboardClient::new(
        config.scoreboard.base_url(args.url),
        config.scoreboard.request_timeout(),
        args.insecure || config.scoreboard.accept_invalid_certs,
    )?;
    info!("Reading from {} ({})", args.url, client.base_url());

    let mut sink = OutputTarget::new(&config.output.directory, !args.no_write);
    if args.no_write {
        info!("Not writing the overlay files");
    }

    match (args.start, args.game) {
        (true, Some(game)) => {
            info!("Game started");
            let mut polling =
                PollingLoop::new(client.clone(), sink, SystemWallClock, &config.clock, game);
            polling.run_until(tokio::signal::ctrl_c()).await;
            sink = polling.into_sink();
            info!("Game stopped");
        }
        (true, None) => warn!("--start needs a --game to follow, ignoring it"),
        (false, _) => {}
    }

    let output = commands::execute(&query, &client, &mut sink).await?;
    println!("{output}");

    Ok(())
}
