use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Post the isotope images of a job and write its result rows.
    Materialize(MaterializeArgs),
    /// Write template configuration and input files.
    WriteTemplate(WriteTemplateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct MaterializeArgs {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,

    /// Path to the json file with the per-ion metrics table.
    #[arg(long)]
    pub metrics: PathBuf,

    /// Path to the json file with the sparse isotope images of every ion.
    #[arg(long)]
    pub images: PathBuf,

    /// Path to the json file with the spatial mask (rows of 0/1).
    #[arg(long)]
    pub mask: PathBuf,

    /// Job id (will over-write the config file)
    #[arg(long)]
    pub job_id: Option<i64>,

    /// Dataset id (will over-write the config file)
    #[arg(long)]
    pub dataset_id: Option<String>,
}

#[derive(Parser, Debug)]
pub struct WriteTemplateArgs {
    /// The path to the output files.
    #[arg(short, long)]
    pub output_path: PathBuf,
}
