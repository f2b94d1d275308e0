use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "vjson")]
#[clap(version)]
#[clap(about = "Visual JSON editor core - replay edit logs and round-trip JSON documents losslessly", long_about = None)]
pub struct Cli {
    /// Path to the JSON document
    #[clap(value_name = "FILE")]
    pub file: PathBuf,

    /// Edit-log file (a JSON array of edit records) to replay onto the document
    #[clap(short, long, value_name = "PATH")]
    pub apply: Option<PathBuf>,

    /// Write the result to PATH instead of stdout
    #[clap(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Indent width for the written result (overrides config)
    #[clap(long, value_name = "WIDTH")]
    pub indent: Option<usize>,

    /// Abort on corrupted type tagging instead of recovering with a warning
    #[clap(long)]
    pub strict: bool,

    /// Verify that the document survives an encode/decode round trip; writes nothing
    #[clap(long)]
    pub check: bool,

    /// Path to custom configuration file
    #[clap(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
