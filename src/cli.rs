use crate::{Error, Result};

/// Options shared by `run` and `status`; values are `None` when not provided on CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub config_path: Option<String>,
    pub display_path: Option<String>,
    pub led_dir: Option<String>,
    pub tick_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub syslog: bool,
}

/// Parsed command-line intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunOptions),
    Status(RunOptions),
    ShowHelp,
    ShowVersion,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        if args.is_empty() {
            return Ok(Command::Run(RunOptions::default()));
        }

        let mut iter = args.iter();
        match iter.next().map(|s| s.as_str()) {
            Some("run") => Ok(Command::Run(parse_run_options(&mut iter)?)),
            Some("status") => Ok(Command::Status(parse_run_options(&mut iter)?)),
            Some("--help") | Some("-h") => Ok(Command::ShowHelp),
            Some("--version") | Some("-V") => Ok(Command::ShowVersion),
            Some(flag) if flag.starts_with('-') => {
                // No subcommand given: treat the whole line as `run` flags.
                let mut iter = args.iter();
                Ok(Command::Run(parse_run_options(&mut iter)?))
            }
            Some(cmd) => Err(Error::InvalidArgs(format!(
                "unknown command '{cmd}', try --help"
            ))),
            None => Ok(Command::Run(RunOptions::default())),
        }
    }

    pub fn help() -> &'static str {
        concat!(
            "tx3vfd - front-panel VFD clock and health LED daemon\n",
            "\n",
            "USAGE:\n",
            "  tx3vfd [run] [OPTIONS]    Drive the display until SIGINT/SIGTERM (requires root)\n",
            "  tx3vfd status [OPTIONS]   Read sensors once and print them as JSON\n",
            "  tx3vfd --help\n",
            "  tx3vfd --version\n",
            "\n",
            "OPTIONS:\n",
            "  --config <path>        Config file (default: ~/.tx3vfd/config.toml)\n",
            "  --display-path <path>  Display text endpoint (default: /sys/devices/platform/spi/spi_master/spi0/spi0.0/display_text)\n",
            "  --led-dir <path>       LED class directory (default: /sys/class/leds)\n",
            "  --tick-ms <number>     Refresh interval, 50-1000 (default: 500)\n",
            "  --log-level <level>    error|warn|info|debug|trace (default: info)\n",
            "  --log-file <path>      Also append log lines to this file\n",
            "  --syslog               Also send log lines to the system log\n",
            "  -h, --help             Show this help\n",
            "  -V, --version          Show version\n",
        )
    }

    pub fn print_help() {
        println!("{}", Self::help());
    }
}

fn parse_run_options(iter: &mut std::slice::Iter<String>) -> Result<RunOptions> {
    let mut opts = RunOptions::default();

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--config" => {
                opts.config_path = Some(take_value(flag, iter)?);
            }
            "--display-path" => {
                opts.display_path = Some(take_value(flag, iter)?);
            }
            "--led-dir" => {
                opts.led_dir = Some(take_value(flag, iter)?);
            }
            "--tick-ms" => {
                let raw = take_value(flag, iter)?;
                opts.tick_ms = Some(raw.parse().map_err(|_| {
                    Error::InvalidArgs("tick-ms must be a positive integer".to_string())
                })?);
            }
            "--log-level" => {
                opts.log_level = Some(take_value(flag, iter)?);
            }
            "--log-file" => {
                opts.log_file = Some(take_value(flag, iter)?);
            }
            "--syslog" => {
                opts.syslog = true;
            }
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown flag '{other}', try --help"
                )));
            }
        }
    }

    Ok(opts)
}

fn take_value(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| Error::InvalidArgs(format!("expected a value after {flag}")))
}
