//! Command-line interface

use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

use crate::{Linter, ReportWriter};

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        Command::new("krm-linter")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Report group, kind, origin and schema coverage for every version of a set of CRDs")
            .arg(
                Arg::new("file")
                    .short('f')
                    .long("file")
                    .help("File containing one or more CustomResourceDefinitions (YAML or JSON)")
                    .value_name("FILE")
                    .value_parser(clap::value_parser!(PathBuf))
                    .required(true),
            )
    }

    /// Run the CLI application
    pub async fn run(matches: &ArgMatches) -> Result<()> {
        let config = utils::load_config(matches)?;
        info!("Inspecting CRDs in {}", config.input.display());

        let input = config.read_input().await?;

        let stdout = std::io::stdout();
        let mut writer = ReportWriter::new(stdout.lock());
        Linter::new(&input).run(&mut writer)?;

        Ok(())
    }
}

/// Common CLI utilities
pub mod utils {
    use anyhow::{anyhow, Result};
    use std::path::PathBuf;

    use crate::LintConfig;

    /// Build the run configuration from parsed arguments
    pub fn load_config(matches: &clap::ArgMatches) -> Result<LintConfig> {
        let input = matches
            .get_one::<PathBuf>("file")
            .ok_or_else(|| anyhow!("No input file given. Use -f to name a file of CRDs"))?;

        Ok(LintConfig::new(input.clone()))
    }

}
