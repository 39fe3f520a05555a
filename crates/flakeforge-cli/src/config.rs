use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use flakeforge::SnowflakeOptions;

/// Command line configuration for the `flakeforge` binary.
///
/// Options are layered: defaults, then an optional JSON options file, then
/// individual flags or their environment variables. A `.env` file in the
/// working directory is loaded before parsing.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeforge",
    version,
    about = "Generate and deconstruct Snowflake-style IDs"
)]
pub struct CliArgs {
    /// JSON file holding generator options (`epoch`, `incrementBits`,
    /// `processBits`, `workerBits`, `processId`, `workerId`, `async`,
    /// `stringify`).
    ///
    /// Environment variable: `FLAKE_CONFIG`
    #[arg(long, env = "FLAKE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Epoch in milliseconds since 1970-01-01 UTC.
    ///
    /// Environment variable: `FLAKE_EPOCH`
    #[arg(long, env = "FLAKE_EPOCH", global = true)]
    pub epoch: Option<u64>,

    /// Width of the per-millisecond increment.
    #[arg(long, env = "FLAKE_INCREMENT_BITS", global = true)]
    pub increment_bits: Option<u32>,

    /// Width of the process id field.
    #[arg(long, env = "FLAKE_PROCESS_BITS", global = true)]
    pub process_bits: Option<u32>,

    /// Width of the worker id field.
    #[arg(long, env = "FLAKE_WORKER_BITS", global = true)]
    pub worker_bits: Option<u32>,

    /// Process id, reduced modulo 2^process_bits.
    ///
    /// Environment variable: `FLAKE_PROCESS_ID`
    #[arg(long, env = "FLAKE_PROCESS_ID", global = true)]
    pub process_id: Option<u64>,

    /// Worker id, reduced modulo 2^worker_bits.
    ///
    /// Environment variable: `FLAKE_WORKER_ID`
    #[arg(long, env = "FLAKE_WORKER_ID", global = true)]
    pub worker_id: Option<u64>,

    /// Serialize generation through the concurrent generator.
    #[arg(long, global = true, default_value_t = false)]
    pub concurrent: bool,

    /// Emit numeric output instead of text.
    #[arg(long, global = true, default_value_t = false)]
    pub numeric: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated snowflakes, one per line.
    Generate {
        /// How many snowflakes to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Print the fields of each snowflake as a JSON line.
    Deconstruct {
        /// Snowflakes in base-10.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Resolved configuration: generator options plus the command to run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub options: SnowflakeOptions,
    pub command: Command,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let mut options = match &args.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading options file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing options file {}", path.display()))?
            }
            None => SnowflakeOptions::default(),
        };

        if let Some(epoch) = args.epoch {
            options.epoch = epoch;
        }
        if let Some(bits) = args.increment_bits {
            options.increment_bits = bits;
        }
        if let Some(bits) = args.process_bits {
            options.process_bits = bits;
        }
        if let Some(bits) = args.worker_bits {
            options.worker_bits = bits;
        }
        if let Some(id) = args.process_id {
            options.process_id = id;
        }
        if let Some(id) = args.worker_id {
            options.worker_id = id;
        }
        options.concurrent |= args.concurrent;
        if args.numeric {
            options.stringify = false;
        }

        Ok(Self {
            options,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, FromArgMatches};

    use super::*;

    /// Parses `argv` with every `env` fallback detached, so `FLAKE_*`
    /// variables in the test environment cannot leak in.
    fn parse(argv: &[&str]) -> Result<CliArgs, clap::Error> {
        let matches = CliArgs::command()
            .mut_args(|arg| arg.env(None::<&str>))
            .try_get_matches_from(argv)?;
        CliArgs::from_arg_matches(&matches)
    }

    fn resolve(argv: &[&str]) -> AppConfig {
        AppConfig::try_from(parse(argv).unwrap()).unwrap()
    }

    #[test]
    fn defaults_without_flags() {
        let config = resolve(&["flakeforge", "generate"]);
        assert_eq!(config.options, SnowflakeOptions::default());
        assert_eq!(config.command, Command::Generate { count: 1 });
    }

    #[test]
    fn flags_override_defaults() {
        let config = resolve(&[
            "flakeforge",
            "generate",
            "-n",
            "5",
            "--increment-bits",
            "10",
            "--process-bits",
            "6",
            "--worker-bits",
            "6",
            "--worker-id",
            "7",
            "--concurrent",
            "--numeric",
        ]);
        assert_eq!(config.options.increment_bits, 10);
        assert_eq!(config.options.process_bits, 6);
        assert_eq!(config.options.worker_bits, 6);
        assert_eq!(config.options.worker_id, 7);
        assert!(config.options.concurrent);
        assert!(!config.options.stringify);
        assert_eq!(config.command, Command::Generate { count: 5 });
    }

    #[test]
    fn deconstruct_requires_ids() {
        assert!(parse(&["flakeforge", "deconstruct"]).is_err());
        let config = resolve(&["flakeforge", "deconstruct", "1", "2"]);
        assert_eq!(
            config.command,
            Command::Deconstruct {
                ids: vec!["1".into(), "2".into()]
            }
        );
    }

    #[test]
    fn missing_options_file_is_reported() {
        let args = parse(&["flakeforge", "--config", "/nonexistent/flake.json", "generate"]).unwrap();
        let err = AppConfig::try_from(args).unwrap_err();
        assert!(err.to_string().contains("reading options file"));
    }

    #[test]
    fn options_file_is_layered_under_flags() {
        let path = std::env::temp_dir().join(format!("flakeforge-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"epoch": 1288834974657, "workerId": 1, "processId": 2, "async": true}"#,
        )
        .unwrap();

        let config = resolve(&[
            "flakeforge",
            "--config",
            path.to_str().unwrap(),
            "--worker-id",
            "9",
            "generate",
        ]);
        fs::remove_file(&path).unwrap();

        assert_eq!(config.options.epoch, 1_288_834_974_657);
        assert_eq!(config.options.process_id, 2);
        assert_eq!(config.options.worker_id, 9);
        assert!(config.options.concurrent);
    }
}
