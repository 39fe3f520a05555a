//! # `flakeforge`
//!
//! Command line front end for the [`flakeforge`] library.
//!
//! ## Usage
//!
//! ```bash
//! flakeforge generate -n 3 --worker-id 4 --process-id 9
//! flakeforge deconstruct 397282797158964394
//! ```

mod config;
mod telemetry;

use std::io::{self, BufWriter, Write};

use clap::Parser;
use flakeforge::{Deconstructed, Sequencer, SleepProvider, Snowflake, TimeSource};
use serde::Serialize;

use crate::{
    config::{AppConfig, CliArgs, Command},
    telemetry::init_tracing,
};

#[derive(Serialize)]
struct DeconstructedLine<'a> {
    id: &'a str,
    #[serde(flatten)]
    fields: Deconstructed,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::try_from(CliArgs::parse())?;
    tracing::debug!(options = ?config.options, "resolved generator options");

    let sequencer = Sequencer::new(config.options)?;
    let mut out = BufWriter::new(io::stdout().lock());

    match config.command {
        Command::Generate { count } => write_generated(&mut out, &sequencer, count).await?,
        Command::Deconstruct { ids } => write_deconstructed(&mut out, &sequencer, &ids)?,
    }

    out.flush()?;
    Ok(())
}

/// Writes `count` fresh snowflakes, one per line.
async fn write_generated<T, S>(
    out: &mut impl Write,
    sequencer: &Sequencer<T, S>,
    count: usize,
) -> anyhow::Result<()>
where
    T: TimeSource,
    S: SleepProvider,
{
    for _ in 0..count {
        writeln!(out, "{}", sequencer.generate_output().await)?;
    }
    Ok(())
}

/// Writes one JSON object per id: the id as given plus its fields.
fn write_deconstructed<T, S>(
    out: &mut impl Write,
    sequencer: &Sequencer<T, S>,
    ids: &[String],
) -> anyhow::Result<()>
where
    T: TimeSource,
    S: SleepProvider,
{
    for id in ids {
        if id.parse::<Snowflake>().is_err() {
            tracing::warn!(%id, "not a decimal snowflake; fields are meaningless");
        }
        let line = DeconstructedLine {
            id,
            fields: sequencer.deconstruct(id),
        };
        serde_json::to_writer(&mut *out, &line)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use flakeforge::{DISCORD_EPOCH, SnowflakeOptions};

    use super::*;

    struct FixedTime(u64);

    impl TimeSource for FixedTime {
        fn current_millis(&self) -> u64 {
            self.0
        }
    }

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn deconstruct_writes_one_json_line_per_id() {
        let sequencer = Sequencer::new(SnowflakeOptions::default()).unwrap();
        let ids = vec!["397282797158964394".to_owned(), "nope".to_owned()];
        let mut out = Vec::new();

        write_deconstructed(&mut out, &sequencer, &ids).unwrap();

        assert_eq!(
            lines(out),
            vec![
                r#"{"id":"397282797158964394","timestamp":1514790000000,"workerId":4,"processId":9,"increment":3242}"#.to_owned(),
                format!(r#"{{"id":"nope","timestamp":{DISCORD_EPOCH},"workerId":0,"processId":0,"increment":0}}"#),
            ]
        );
    }

    #[test]
    fn deconstruct_keeps_wide_timestamps_exact() {
        let sequencer = Sequencer::new(SnowflakeOptions::default()).unwrap();
        // 2^100: a timestamp field of 2^78, past every native integer width
        // JSON readers agree on.
        let ids = vec!["1267650600228229401496703205376".to_owned()];
        let mut out = Vec::new();

        write_deconstructed(&mut out, &sequencer, &ids).unwrap();

        let line: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(line["timestamp"], "302231454905077364076544");
        assert_eq!(line["increment"], 0);
    }

    #[tokio::test]
    async fn generate_writes_count_lines() {
        let options = SnowflakeOptions {
            worker_id: 4,
            process_id: 9,
            stringify: false,
            ..SnowflakeOptions::default()
        };
        let sequencer = Sequencer::with_time(options, FixedTime(DISCORD_EPOCH + 7)).unwrap();
        let mut out = Vec::new();

        write_generated(&mut out, &sequencer, 3).await.unwrap();

        let lines = lines(out);
        assert_eq!(lines.len(), 3);
        for (increment, line) in lines.iter().enumerate() {
            let fields = sequencer.deconstruct(line.as_str());
            assert_eq!(fields.timestamp_millis(), Some(DISCORD_EPOCH + 7));
            assert_eq!((fields.worker_id, fields.process_id), (4, 9));
            assert_eq!(fields.increment, increment as u64);
        }
    }
}
