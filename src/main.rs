//! chunky - chunked terminal pager
//!
//! Pages a file or piped stdin in fixed-size line chunks, with regex search
//! and a live mode that follows a stream as it grows.

use anyhow::{bail, Context, Result};
use chunky::app::{dump_chunks, Application, Viewer};
use chunky::config::Config;
use chunky::error::parse_count;
use chunky::pipeline::StreamPipeline;
use chunky::render::ui::TerminalUI;
use chunky::source::{CachingStreamSource, InputSource, ReaderFeed, SeekableFileSource};
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

const STDIN_NAME: &str = "<stdin>";

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
struct Options {
    file: Option<PathBuf>,
    chunk_size: Option<usize>,
    page_size: Option<usize>,
    live: bool,
}

fn build_cli() -> Command {
    Command::new("chunky")
        .version(chunky::VERSION)
        .about("A chunked terminal pager for very large files and unbounded streams")
        .long_about(
            "chunky shows a file or piped stdin as a sequence of fixed-size line chunks. \
             Files are indexed lazily so any chunk or line can be reached directly; \
             stdin is cached as it is read so it can be scrolled back.",
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("File to view (default: read stdin)"),
        )
        .arg(
            Arg::new("chunk-size")
                .short('c')
                .long("chunk-size")
                .value_name("N")
                .help("Lines per chunk [default: 1000]"),
        )
        .arg(
            Arg::new("page-size")
                .short('p')
                .long("page-size")
                .value_name("N")
                .help("Lines per page step [default: screen height]"),
        )
        .arg(
            Arg::new("live")
                .short('l')
                .long("live")
                .action(ArgAction::SetTrue)
                .help("Read stdin in the background and follow new lines"),
        )
}

fn positive_count(what: &'static str, input: &str) -> Result<usize> {
    let value = parse_count(what, input)?;
    if value == 0 {
        bail!("{what} must be greater than 0");
    }
    usize::try_from(value).with_context(|| format!("{what} is too large: {value}"))
}

/// Parse arguments; `None` means help or version was printed
fn parse_args<I, T>(args: I) -> Result<Option<Options>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match build_cli().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.print()?;
            return Ok(None);
        }
        Err(e) => bail!("{}", e.render().to_string().trim_end()),
    };

    let chunk_size = matches
        .get_one::<String>("chunk-size")
        .map(|s| positive_count("chunk size", s))
        .transpose()?;
    let page_size = matches
        .get_one::<String>("page-size")
        .map(|s| positive_count("page size", s))
        .transpose()?;

    Ok(Some(Options {
        file: matches.get_one::<PathBuf>("file").cloned(),
        chunk_size,
        page_size,
        live: matches.get_flag("live"),
    }))
}

async fn run_pager(
    source: Box<dyn InputSource>,
    config: Config,
    pipeline: Option<StreamPipeline>,
) -> Result<()> {
    let viewer = Viewer::new(source, config.chunk_size, 1)?
        .with_page_size(config.page_size)
        .with_live(pipeline.is_some());
    let ui_renderer = Box::new(TerminalUI::with_theme(config.color_theme()));

    let mut app = Application::new(viewer, ui_renderer, config);
    if let Some(pipeline) = pipeline {
        app = app.with_pipeline(pipeline);
    }
    app.run().await?;
    Ok(())
}

fn dump(source: &mut dyn InputSource, config: &Config) -> Result<()> {
    let mut out = io::stdout().lock();
    let lines = dump_chunks(source, config.chunk_size, &mut out)?;
    log::debug!("wrote {lines} lines to non-terminal stdout");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging goes to stderr and is off unless RUST_LOG is set
    env_logger::init();

    let Some(options) = parse_args(std::env::args_os())? else {
        return Ok(());
    };

    let config = Config::load()?.with_overrides(options.chunk_size, options.page_size);
    config.validate()?;
    log::debug!("running with {config:?}");

    let interactive = io::stdout().is_terminal();

    if let Some(path) = options.file {
        let mut source = SeekableFileSource::open(&path)
            .with_context(|| format!("Cannot view {}", path.display()))?;
        if options.live {
            log::warn!("--live only applies to stdin, ignoring it for {}", path.display());
        }
        if !interactive {
            return dump(&mut source, &config);
        }
        return run_pager(Box::new(source), config, None).await;
    }

    if io::stdin().is_terminal() {
        bail!("No input provided. Use --file or pipe input via stdin.");
    }

    if !interactive {
        let mut source = CachingStreamSource::new(ReaderFeed::new(io::stdin().lock()), STDIN_NAME);
        return dump(&mut source, &config);
    }

    if options.live {
        let (pipeline, receiver) =
            StreamPipeline::spawn(BufReader::new(io::stdin()), config.queue_capacity);
        let source = CachingStreamSource::new(receiver, STDIN_NAME);
        return run_pager(Box::new(source), config, Some(pipeline)).await;
    }

    let source = CachingStreamSource::new(ReaderFeed::new(io::stdin().lock()), STDIN_NAME);
    run_pager(Box::new(source), config, None).await
}
