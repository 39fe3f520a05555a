use crate::{BitLayout, DISCORD_EPOCH, Error, Output, Snowflake};

/// Caller-facing options for building a generator.
///
/// Every field has a default, so only the fields that differ need to be set:
///
/// ```
/// use flakeforge::{Config, SnowflakeOptions};
///
/// let config = Config::try_from(SnowflakeOptions {
///     worker_id: 3,
///     process_id: 1,
///     ..SnowflakeOptions::default()
/// })
/// .unwrap();
///
/// assert_eq!(config.worker_id(), 3);
/// ```
///
/// With the `serde` feature, options deserialize from documents using
/// camel-cased keys (`incrementBits`, `workerId`, ...), where the concurrency
/// flag is spelled `async`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SnowflakeOptions {
    /// Milliseconds since 1970-01-01 UTC subtracted from every timestamp.
    ///
    /// Defaults to [`DISCORD_EPOCH`].
    pub epoch: u64,

    /// Width of the per-millisecond counter. Defaults to 12.
    pub increment_bits: u32,

    /// Width of the process id field. Defaults to 5.
    pub process_bits: u32,

    /// Width of the worker id field. Defaults to 5.
    pub worker_bits: u32,

    /// Reduced modulo `2^process_bits`. Defaults to 0.
    pub process_id: u64,

    /// Reduced modulo `2^worker_bits`. Defaults to 0.
    pub worker_id: u64,

    /// Serialize generation through a FIFO-fair critical section, trading a
    /// suspension point for a no-duplicates guarantee. Defaults to `false`.
    #[cfg_attr(feature = "serde", serde(rename = "async"))]
    pub concurrent: bool,

    /// Render generated snowflakes as decimal text. Defaults to `true`.
    pub stringify: bool,
}

impl Default for SnowflakeOptions {
    fn default() -> Self {
        Self {
            epoch: DISCORD_EPOCH,
            increment_bits: BitLayout::DEFAULT.increment_bits(),
            process_bits: BitLayout::DEFAULT.process_bits(),
            worker_bits: BitLayout::DEFAULT.worker_bits(),
            process_id: 0,
            worker_id: 0,
            concurrent: false,
            stringify: true,
        }
    }
}

/// How [`crate::Sequencer::generate_output`] renders a snowflake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    #[default]
    Text,
    Numeric,
}

/// Validated, immutable generator configuration.
///
/// Only obtainable through [`Config::try_from`], which enforces the 22-bit
/// budget and normalizes the ids. There are no setters: a `Config` cannot
/// change once built.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    epoch: u64,
    layout: BitLayout,
    worker_id: u64,
    process_id: u64,
    node_bits: u64,
    concurrent: bool,
    output: OutputFormat,
}

impl Config {
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    pub const fn layout(&self) -> BitLayout {
        self.layout
    }

    /// The worker id after reduction modulo `2^worker_bits`.
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// The process id after reduction modulo `2^process_bits`.
    pub const fn process_id(&self) -> u64 {
        self.process_id
    }

    /// Worker and process ids already shifted into place.
    pub const fn node_bits(&self) -> u64 {
        self.node_bits
    }

    pub const fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    pub const fn output_format(&self) -> OutputFormat {
        self.output
    }

    /// Renders a snowflake according to [`Self::output_format`].
    pub fn render(&self, id: Snowflake) -> Output {
        match self.output {
            OutputFormat::Text => Output::Text(id.to_string()),
            OutputFormat::Numeric => Output::Numeric(id),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epoch: DISCORD_EPOCH,
            layout: BitLayout::DEFAULT,
            worker_id: 0,
            process_id: 0,
            node_bits: 0,
            concurrent: false,
            output: OutputFormat::Text,
        }
    }
}

impl TryFrom<SnowflakeOptions> for Config {
    type Error = Error;

    fn try_from(options: SnowflakeOptions) -> Result<Self, Self::Error> {
        let layout = BitLayout::new(
            options.increment_bits,
            options.process_bits,
            options.worker_bits,
        )?;

        // A zero-width field reduces its id to zero.
        let worker_id = options.worker_id & layout.max_worker_id();
        let process_id = options.process_id & layout.max_process_id();

        Ok(Self {
            epoch: options.epoch,
            layout,
            worker_id,
            process_id,
            node_bits: layout.node_bits(worker_id, process_id),
            concurrent: options.concurrent,
            output: if options.stringify {
                OutputFormat::Text
            } else {
                OutputFormat::Numeric
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::try_from(SnowflakeOptions::default()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.epoch(), 1_420_070_400_000);
        assert_eq!(config.layout().increment_bits(), 12);
        assert_eq!(config.layout().process_bits(), 5);
        assert_eq!(config.layout().worker_bits(), 5);
        assert!(!config.is_concurrent());
        assert_eq!(config.output_format(), OutputFormat::Text);
    }

    #[test]
    fn rejects_bits_not_summing_to_22() {
        let err = Config::try_from(SnowflakeOptions {
            worker_bits: 4,
            ..SnowflakeOptions::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBitWidthConfiguration {
                increment_bits: 12,
                process_bits: 5,
                worker_bits: 4,
                expected: 22,
            }
        ));
    }

    #[test]
    fn reduces_ids_modulo_width() {
        let config = Config::try_from(SnowflakeOptions {
            worker_id: 33,
            process_id: 70,
            ..SnowflakeOptions::default()
        })
        .unwrap();
        assert_eq!(config.worker_id(), 1);
        assert_eq!(config.process_id(), 6);
        assert_eq!(config.node_bits(), (1 << 17) | (6 << 12));
    }

    #[test]
    fn zero_width_ids_reduce_to_zero() {
        let config = Config::try_from(SnowflakeOptions {
            increment_bits: 22,
            process_bits: 0,
            worker_bits: 0,
            worker_id: u64::MAX,
            process_id: u64::MAX,
            ..SnowflakeOptions::default()
        })
        .unwrap();
        assert_eq!(config.worker_id(), 0);
        assert_eq!(config.process_id(), 0);
        assert_eq!(config.node_bits(), 0);
    }

    #[test]
    fn stringify_selects_output_format() {
        let config = Config::try_from(SnowflakeOptions {
            stringify: false,
            ..SnowflakeOptions::default()
        })
        .unwrap();
        let id = Snowflake::from(7u64);
        assert_eq!(config.render(id.clone()), Output::Numeric(id.clone()));
        assert_eq!(Config::default().render(id), Output::Text("7".into()));
    }

    #[test]
    fn options_are_copied_not_shared() {
        let mut options = SnowflakeOptions {
            worker_id: 2,
            ..SnowflakeOptions::default()
        };
        let config = Config::try_from(options.clone()).unwrap();
        options.worker_id = 9;
        options.increment_bits = 1;
        assert_eq!(config.worker_id(), 2);
        assert_eq!(config.layout().increment_bits(), 12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_camel_case_options() {
        let options: SnowflakeOptions = serde_json::from_str(
            r#"{
                "epoch": 1288834974657,
                "incrementBits": 10,
                "processBits": 6,
                "workerBits": 6,
                "workerId": 5,
                "async": true,
                "stringify": false
            }"#,
        )
        .unwrap();
        assert_eq!(
            options,
            SnowflakeOptions {
                epoch: 1_288_834_974_657,
                increment_bits: 10,
                process_bits: 6,
                worker_bits: 6,
                process_id: 0,
                worker_id: 5,
                concurrent: true,
                stringify: false,
            }
        );
    }
}
