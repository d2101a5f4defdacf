use anyhow::Context;
use clap::Parser;
use corrosion_ai::{ai_provider, analyzer, cli, config, error, report, scanner, vision};
use ai_provider::AiProvider;
use analyzer::RustAnalyzer;
use cli::{Cli, Commands};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load().context("failed to load config")?;
    let provider = cli.ai_provider.unwrap_or(config.provider);

    match cli.command {
        Commands::Analyze { paths, output, max_images } => {
            println!("🔩 corrosion-ai - rust analysis\n");

            // 1. Collect images
            println!("[1/3] Scanning images...");
            let mut images = scanner::collect_images(&paths)?;
            if images.is_empty() {
                let joined = paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(error::CorrosionError::NoImagesFound(joined).into());
            }

            let limit = max_images.unwrap_or(config.max_images).max(1);
            if images.len() > limit {
                warn!(found = images.len(), limit, "too many images, extra images are ignored");
                println!("⚠ {} images found, analyzing the first {}", images.len(), limit);
                images.truncate(limit);
            }
            let inputs = scanner::load_images(&images)?;
            println!("✔ {} image(s) loaded\n", inputs.len());

            // 2. Analyze
            let client = vision::create_client(provider, &config)?;
            let provider_name = client.name().to_string();
            let model = client.model().to_string();
            let analyzer = RustAnalyzer::new(client);

            println!("[2/3] Analyzing with {} ({})...", provider_name, model);
            let pb = spinner(if inputs.len() == 1 {
                "Analyzing rust condition".to_string()
            } else {
                format!("Comparing {} images", inputs.len())
            });
            let results = match inputs.as_slice() {
                [(id, image)] => vec![(id.clone(), analyzer.analyze(image).await)],
                _ => analyzer.analyze_multiple(&inputs).await,
            };
            pb.finish_and_clear();
            println!("✔ Analysis complete\n");

            // 3. Results
            println!("[3/3] Results\n");
            report::print_results(&results);

            if let Some(output) = output {
                let report = report::AnalysisReport::new(&provider_name, &model, &results);
                report::write_json(&report, &output)?;
                println!("✔ Report saved: {}", output.display());
            }
        }

        Commands::Config { set_api_key, set_provider, show } => {
            if let Some(new_provider) = set_provider {
                config.provider = new_provider;
                config.save()?;
                println!("✔ Default provider set to {}", new_provider);
            }

            if let Some(key) = set_api_key {
                let target = set_provider.unwrap_or(provider);
                config.set_api_key(target, key);
                config.save()?;
                println!("✔ API key saved for {}", target);
            }

            if show {
                println!("Settings:");
                println!("  Config file: {}", Config::config_path()?.display());
                println!("  Provider: {}", config.provider);
                println!("  Claude model: {}", config.claude_model);
                println!("  OpenAI model: {}", config.openai_model);
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Max images: {}", config.max_images);
                for p in [AiProvider::Claude, AiProvider::Openai] {
                    let status = if config.has_api_key(p) { "set" } else { "not set" };
                    println!("  {} API key: {} (env {})", p, status, p.api_key_env());
                }
            }
        }
    }

    Ok(())
}
