//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// Bondscope - screens exchange-traded bonds and ranks them by yield
#[derive(Debug, Parser)]
#[command(name = "bondscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Leave out corporate bonds that no rating agency covers
    #[arg(short, long)]
    pub clear: bool,

    /// Output workbook, overrides EXCEL_TABLE_NAME
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log: String,

    /// Configuration file
    #[arg(long, value_name = "FILE", default_value = "config.json")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["bondscope"]);
        assert!(!cli.clear);
        assert!(cli.out.is_none());
        assert_eq!(cli.log, "warn");
        assert_eq!(cli.config, PathBuf::from("config.json"));
    }

    #[test]
    fn test_short_clear_and_overrides() {
        let cli = Cli::parse_from([
            "bondscope",
            "-c",
            "--out",
            "screen.xlsx",
            "--log",
            "debug",
            "--config",
            "/etc/bondscope.json",
        ]);
        assert!(cli.clear);
        assert_eq!(cli.out, Some(PathBuf::from("screen.xlsx")));
        assert_eq!(cli.log, "debug");
        assert_eq!(cli.config, PathBuf::from("/etc/bondscope.json"));
    }
}
