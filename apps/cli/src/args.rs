use std::env;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub home: Option<PathBuf>,
    pub once: bool,
}

pub fn parse_args() -> Result<CliArgs, String> {
    let mut args = env::args().skip(1);
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --port".to_string())?;
                let port = value
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port value: {value}"))?;
                parsed.port = Some(port);
            }
            "--home" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --home".to_string())?;
                parsed.home = Some(PathBuf::from(value));
            }
            "--once" => {
                parsed.once = true;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "OpenClaw Usage Monitor\n\n\
Usage:\n  openclaw-monitor [--port <port>] [--home <dir>] [--once]\n\n\
Options:\n  --port <port>  Override the configured port for this run only\n  --home <dir>   Read session logs from this OpenClaw home instead of the default\n  --once         Run a single collect cycle, print a summary, and exit\n  -h, --help     Show this help message\n"
    );
}
