use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "bioasq-fixer",
    version,
    about = "Repair and normalize a BioASQ-style question dataset"
)]
pub struct Cli {
    /// Dataset JSON with a top-level `questions` array.
    pub input: PathBuf,

    /// SQLite database holding the `pmid2abstract` table.
    pub abstracts_db: PathBuf,

    /// Where the normalized dataset is written.
    pub output: PathBuf,
}
