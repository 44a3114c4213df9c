use std::{
    io::{Read, Write},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clipmux_client::{ClipboardService, RawConsumer, RawProducer};
use clipmux_clipboard::ClipboardSession;
use clipmux_provider::{GarbageCollectorOptions, Provider};
use snafu::ResultExt;
use tokio::runtime::Runtime;

use crate::{
    config::Config,
    error::{self, Error},
};

const OWNERSHIP_CHECK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = clipmux_base::CTL_PROGRAM_NAME, author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    commands: Commands,

    #[clap(
        long = "config",
        short = 'c',
        env = "CLIPMUXCTL_CONFIG_FILE_PATH",
        help = "Specify a configuration file"
    )]
    config_file: Option<PathBuf>,

    #[clap(long = "log-level", env = "CLIPMUXCTL_LOG_LEVEL", help = "Specify a log level")]
    log_level: Option<tracing::Level>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    #[clap(about = "Print version information")]
    Version,

    #[clap(about = "Output shell completion code for the specified shell (bash, zsh, fish)")]
    Completions { shell: clap_complete::Shell },

    #[clap(about = "Output default configuration")]
    DefaultConfig,

    #[clap(
        about = "Copy files into clipboard, one item per file, and keep serving them until the \
                 clipboard is taken over or the process is interrupted"
    )]
    Copy {
        #[clap(
            long = "mime",
            short = 'm',
            default_value = "text/plain; charset=utf-8",
            help = "Specify the MIME type of the items"
        )]
        mime: mime::Mime,

        #[clap(long = "detach", help = "Exit right after the items are installed")]
        detach: bool,

        #[clap(help = "Files to copy, standard input is read if none is given")]
        file_paths: Vec<PathBuf>,
    },

    #[clap(about = "Write the items of the current clipboard batch into file")]
    Paste {
        #[clap(
            long = "mime",
            short = 'm',
            default_value = "*/*",
            help = "Only paste items matching this MIME type"
        )]
        mime: mime::Mime,

        #[clap(long = "file", short = 'f')]
        file_path: Option<PathBuf>,
    },

    #[clap(about = "Check whether the clipboard manifest lists a MIME type")]
    Contains { mime: mime::Mime },

    #[clap(aliases = &["is-copied"], about = "Check whether any payload is still tracked")]
    Check,

    #[clap(about = "Delete every tracked payload")]
    Clear,

    #[clap(about = "Sweep payloads whenever the clipboard is taken over, until interrupted")]
    Watch,
}

impl Default for Cli {
    fn default() -> Self { Self::parse() }
}

impl Cli {
    fn load_config(&self) -> Config {
        let mut config =
            Config::load_or_default(self.config_file.clone().unwrap_or_else(Config::default_path));
        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }
        config
    }

    pub fn run(self) -> Result<i32, Error> {
        match self.commands {
            Commands::Version => {
                std::io::stdout()
                    .write_all(Self::command().render_long_version().as_bytes())
                    .context(error::WriteStdoutSnafu)?;
                return Ok(0);
            }
            Commands::Completions { shell } => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Commands::DefaultConfig => {
                let config_text = toml::to_string_pretty(&Config::default()).unwrap_or_default();
                std::io::stdout()
                    .write_all(config_text.as_bytes())
                    .context(error::WriteStdoutSnafu)?;
                return Ok(0);
            }
            _ => {}
        }

        let config = self.load_config();
        config.log.registry();

        let session = clipmux_clipboard::Clipboard::new(config.poll_interval())
            .context(error::OpenClipboardSnafu)?;
        let opts = config.service_options();
        let provider = Provider::new(&config.into()).context(error::OpenProviderSnafu)?;
        let service = ClipboardService::with_options(Arc::new(provider), session, opts);

        match self.commands {
            Commands::Copy { mime, detach, file_paths } => {
                let buffers = load_files_or_read_stdin(file_paths, &mime)?;
                let descriptor = service.try_copy(&RawProducer::new(buffers, mime))?;
                println!("Copied {} item(s)", descriptor.len());
                if !detach {
                    serve(&service)?;
                }
                Ok(0)
            }
            Commands::Paste { mime, file_path } => {
                match service.paste(&RawConsumer::new().with_mime(mime)) {
                    Some(items) => {
                        save_file_or_write_stdout(file_path, &items)?;
                        Ok(0)
                    }
                    None => {
                        eprintln!("Nothing to paste");
                        Ok(1)
                    }
                }
            }
            Commands::Contains { mime } => Ok(print_answer(service.contains(&mime))),
            Commands::Check => Ok(print_answer(service.is_copied())),
            Commands::Clear => {
                let removed = service.try_clear()?;
                println!("Removed {removed} payload file(s)");
                Ok(0)
            }
            Commands::Watch => {
                let opts = GarbageCollectorOptions { sweep_on_start: true, ..Default::default() };
                let gc = service.spawn_garbage_collector(opts)?;
                Runtime::new()
                    .context(error::InitializeTokioRuntimeSnafu)?
                    .block_on(tokio::signal::ctrl_c())
                    .context(error::WaitSignalSnafu)?;
                gc.shutdown();
                Ok(0)
            }
            Commands::Version | Commands::Completions { .. } | Commands::DefaultConfig => {
                unreachable!()
            }
        }
    }
}

// Some hosts drop the clipboard content together with its owner, so the owner stays alive
// until the content is replaced.
fn serve<S>(service: &ClipboardService<S>) -> Result<(), Error>
where
    S: ClipboardSession + Clone + Send + 'static,
    S::Subscriber: 'static,
{
    let gc = service.spawn_garbage_collector(GarbageCollectorOptions::default())?;
    let provider = service.provider().clone();

    let runtime = Runtime::new().context(error::InitializeTokioRuntimeSnafu)?;
    let result = runtime.block_on(async move {
        let mut interval = tokio::time::interval(OWNERSHIP_CHECK_INTERVAL);
        loop {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => return signal,
                _ = interval.tick() => {
                    if !provider.check() {
                        tracing::info!("Clipboard was taken over, stop serving");
                        return Ok(());
                    }
                }
            }
        }
    });

    gc.shutdown();
    result.context(error::WaitSignalSnafu)
}

fn load_files_or_read_stdin(
    file_paths: Vec<PathBuf>,
    mime: &mime::Mime,
) -> Result<Vec<Vec<u8>>, Error> {
    let buffers = if file_paths.is_empty() {
        let mut content = Vec::new();
        let _ = std::io::stdin().read_to_end(&mut content).context(error::ReadStdinSnafu)?;
        vec![("stdin".to_string(), content)]
    } else {
        file_paths
            .into_iter()
            .map(|file_path| {
                std::fs::read(&file_path)
                    .map(|content| (file_path.display().to_string(), content))
                    .context(error::ReadFileSnafu { filename: file_path.clone() })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    if mime.type_() == mime::TEXT {
        for (source_name, content) in &buffers {
            let _unused = simdutf8::basic::from_utf8(content)
                .context(error::CheckUtf8StringSnafu { source_name: source_name.clone() })?;
        }
    }

    Ok(buffers.into_iter().map(|(_, content)| content).collect())
}

fn save_file_or_write_stdout(file_path: Option<PathBuf>, items: &[Vec<u8>]) -> Result<(), Error> {
    let content = items.concat();
    if let Some(file_path) = file_path {
        std::fs::write(&file_path, content).context(error::WriteFileSnafu { filename: file_path })
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&content).and_then(|()| stdout.flush()).context(error::WriteStdoutSnafu)
    }
}

#[inline]
fn print_answer(answer: bool) -> i32 {
    println!("{answer}");
    i32::from(!answer)
}
