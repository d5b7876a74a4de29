// tools/latency_bench/src/cli.rs

use clap::{Parser, ValueEnum};
use latency_engine::{
    Aggregation, ReferenceOverride, ReferenceTable, RunConfig, Selection, DEFAULT_ITERATIONS, DEFAULT_RUNS,
    DEFAULT_TOLERANCE_PCT,
};

/// Measure x86-64 instruction latencies and compare them with reference values
#[derive(Parser, Debug)]
#[command(name = "cpu-latency-bench", version, about, allow_negative_numbers = true)]
pub struct Cli {
    /// Iterations of the instruction per run
    #[arg(default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: i64,

    /// Runs per instruction
    #[arg(default_value_t = DEFAULT_RUNS)]
    pub runs: i32,

    /// Allowed deviation from the reference latency, in percent
    #[arg(short, long, default_value_t = DEFAULT_TOLERANCE_PCT)]
    pub tolerance: f64,

    /// How runs are combined into one latency
    #[arg(short, long, value_enum, default_value_t = AggregationArg::Mean)]
    pub aggregation: AggregationArg,

    /// Only measure these instructions or categories (repeatable, comma separated)
    #[arg(long, value_name = "NAME|CATEGORY", value_delimiter = ',')]
    pub only: Vec<String>,

    /// Override a reference latency (repeatable)
    #[arg(long = "expect", value_name = "NAME=CYCLES")]
    pub expect: Vec<ReferenceOverride>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Exit with status 1 when any instruction fails
    #[arg(long)]
    pub strict: bool,

    /// Print the instruction catalog and exit
    #[arg(long)]
    pub list: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AggregationArg {
    /// Arithmetic mean of all runs
    Mean,
    /// Fastest run only
    Min,
}

impl From<AggregationArg> for Aggregation {
    fn from(arg: AggregationArg) -> Self {
        match arg {
            AggregationArg::Mean => Aggregation::Mean,
            AggregationArg::Min => Aggregation::Min,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Csv,
    Markdown,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.iterations, self.runs, self.tolerance).with_aggregation(self.aggregation.into())
    }

    pub fn selection(&self) -> Selection {
        Selection::of(self.only.iter().map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()))
    }

    pub fn references(&self) -> ReferenceTable {
        ReferenceTable::from_overrides(self.expect.iter().cloned())
    }
}
