use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "chainbook",
    about = "In-memory hash-chained transaction ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ledger name
    #[arg(long, global = true, default_value = "chainbook")]
    pub name: String,

    /// TOML file with ledger settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load transfers from a JSON file and print a summary
    Ingest(InputArgs),
    /// Print one header line per block
    Headers(InputArgs),
    /// List every transaction block by block
    Transactions(InputArgs),
    /// Print transaction values in insertion order
    Values(ValuesArgs),
    /// Check chain integrity
    Verify(InputArgs),
    /// Generate random transfers and print the resulting headers
    Simulate(SimulateArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// JSON array of `{ "sender", "receiver", "value" }` objects
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ValuesArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Pair each value with its timestamp
    #[arg(long)]
    pub timestamps: bool,
}

#[derive(Args)]
pub struct SimulateArgs {
    #[arg(short = 'n', long, default_value = "23")]
    pub count: usize,
    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ingest() {
        let cli = Cli::try_parse_from(["chainbook", "ingest", "transfers.json"]).unwrap();
        if let Command::Ingest(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("transfers.json"));
        } else { panic!("wrong command"); }
        assert_eq!(cli.name, "chainbook");
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_ingest_requires_file() {
        assert!(Cli::try_parse_from(["chainbook", "ingest"]).is_err());
    }

    #[test]
    fn parse_headers() {
        let cli = Cli::try_parse_from(["chainbook", "headers", "t.json"]).unwrap();
        assert!(matches!(cli.command, Command::Headers(_)));
    }

    #[test]
    fn parse_values_with_timestamps() {
        let cli = Cli::try_parse_from(["chainbook", "values", "t.json", "--timestamps"]).unwrap();
        if let Command::Values(args) = cli.command {
            assert!(args.timestamps);
            assert_eq!(args.input.file, PathBuf::from("t.json"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_simulate_defaults() {
        let cli = Cli::try_parse_from(["chainbook", "simulate"]).unwrap();
        if let Command::Simulate(args) = cli.command {
            assert_eq!(args.count, 23);
            assert_eq!(args.seed, None);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_simulate_seeded() {
        let cli =
            Cli::try_parse_from(["chainbook", "simulate", "-n", "50", "--seed", "7"]).unwrap();
        if let Command::Simulate(args) = cli.command {
            assert_eq!(args.count, 50);
            assert_eq!(args.seed, Some(7));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chainbook", "verify", "t.json", "--name", "Net", "--config", "ledger.toml",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
        assert_eq!(cli.name, "Net");
        assert_eq!(cli.config, Some(PathBuf::from("ledger.toml")));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["chainbook", "--verbose", "simulate"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli =
            Cli::try_parse_from(["chainbook", "--format", "json", "headers", "t.json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn parse_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["chainbook", "--format", "xml", "simulate"]).is_err());
    }
}
