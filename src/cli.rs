use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "corrosion-ai")]
#[command(about = "Grade rust severity on photographed metal rods", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Vision provider (claude/openai); defaults to the configured one
    #[arg(long, global = true)]
    pub ai_provider: Option<AiProvider>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one or more rod photos, ranking them when more than one is given
    Analyze {
        /// Image files or folders
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write a JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum images per run (default: config value)
        #[arg(short, long)]
        max_images: Option<usize>,
    },

    /// Show or edit settings
    Config {
        /// Store an API key for the selected provider
        #[arg(long)]
        set_api_key: Option<String>,

        /// Change the default provider
        #[arg(long)]
        set_provider: Option<AiProvider>,

        /// Show settings
        #[arg(long)]
        show: bool,
    },
}
