//! Resume screener: semantic resume screening against a job description

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use resume_screener::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use resume_screener::config::{Config, OutputFormat};
use resume_screener::error::{Result, ScreenerError};
use resume_screener::input::document::JobDescription;
use resume_screener::input::manager::InputManager;
use resume_screener::output::formatter::{self, ConsoleFormatter, OutputFormatter};
use resume_screener::output::report::{from_csv, CSV_MIME_TYPE};
use resume_screener::processing::batch::{validate_batch_input, BatchOrchestrator, BatchProgress, CancelHandle};
use resume_screener::processing::embedding_manager::EmbeddingModelManager;
use resume_screener::processing::embeddings::{CachedProvider, EmbeddingProvider, StaticModelProvider};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: PathBuf) -> Result<()> {
    match command {
        Commands::Screen {
            resumes,
            job,
            job_text,
            embedding,
            output,
            save,
            concurrency,
        } => {
            let output_format = match output {
                Some(format) => formatter::parse_output_format(&format)?,
                None => config.output.format,
            };

            let input_manager = InputManager::new();
            let job = match (job, job_text) {
                (Some(path), _) => {
                    cli::validate_file_extension(&path, &["txt", "md"])
                        .map_err(|e| ScreenerError::InvalidInput(format!("Job description file: {}", e)))?;
                    input_manager.load_job_description(&path).await?
                }
                (None, Some(text)) => JobDescription::new(text),
                (None, None) => {
                    return Err(ScreenerError::InvalidInput("Enter a job description".to_string()));
                }
            };
            let documents = input_manager.load_documents(&resumes).await?;
            validate_batch_input(&documents, &job)?;

            let model_id = embedding.unwrap_or_else(|| config.models.default_embedding_model.clone());
            let manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
            let source = manager.model_source(&model_id);
            let model = StaticModelProvider::load(&source.as_path(), &model_id)?;
            let mut cache = None;
            let provider: Arc<dyn EmbeddingProvider> = if config.processing.enable_caching {
                let cached = Arc::new(CachedProvider::new(model));
                cache = Some(Arc::clone(&cached));
                cached
            } else {
                Arc::new(model)
            };

            let mut orchestrator = BatchOrchestrator::from_config(&config, provider);
            if let Some(concurrency) = concurrency {
                orchestrator = orchestrator.with_max_concurrency(concurrency);
            }

            let cancel = CancelHandle::new();
            let ctrl_c_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, stopping after in-flight resumes");
                    ctrl_c_cancel.cancel();
                }
            });

            let progress_bar = ProgressBar::new(documents.len() as u64);
            progress_bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .map_err(|e| ScreenerError::OutputFormatting(e.to_string()))?,
            );
            let on_progress = |p: &BatchProgress| {
                progress_bar.set_position(p.completed as u64);
                progress_bar.set_message(p.document_name.clone());
            };

            let report = orchestrator
                .run_with(documents, job, &on_progress, &cancel)
                .await?;
            progress_bar.finish_and_clear();
            if let Some(cache) = &cache {
                let stats = cache.cache_stats();
                debug!(
                    "Embedding cache for {}: {} entries, {} hits, {} misses",
                    stats.model_name, stats.cache_size, stats.hits, stats.misses
                );
            }

            let use_colors = config.output.color_output;
            let rendered = formatter::formatter_for(output_format, use_colors, &model_id).format_report(&report)?;

            match (output_format, save) {
                (OutputFormat::Csv, save) => {
                    let path = save.unwrap_or_else(|| PathBuf::from(&config.output.csv_file_name));
                    formatter::save_report_to_file(&rendered, &path)?;
                    info!("Saved {} ({}) with {} row(s)", path.display(), CSV_MIME_TYPE, report.results.len());
                }
                (_, Some(path)) => {
                    formatter::save_report_to_file(&rendered, &path)?;
                    info!("Saved report to {}", path.display());
                }
                (_, None) => {
                    print!("{}", String::from_utf8_lossy(&rendered));
                }
            }

            if !report.is_complete() {
                warn!("Run was cancelled; the report only covers processed resumes");
            }
        }

        Commands::Report { csv } => {
            let bytes = std::fs::read(&csv)?;
            let table = from_csv(&bytes)?;
            print!("{}", ConsoleFormatter::new(config.output.color_output).format_table(&table));
        }

        Commands::Models { action } => {
            let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;
            match action {
                ModelAction::List => {
                    println!("Embedding models:");
                    for (id, model) in manager.list_available_models() {
                        let status = if manager.is_model_downloaded(id) { "downloaded" } else { "available" };
                        println!("  {} ({}) - {} MB [{}]", id, model.repo_id, model.size_mb, status);
                        println!("    {}", model.description);
                    }
                }

                ModelAction::Download { model } => {
                    let model_id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| ScreenerError::ModelNotFound(model.clone()))?;
                    let path = manager.ensure_model_available(&model_id).await?;
                    println!("Model '{}' is at {}", model_id, path.display());
                }

                ModelAction::Info { model } => {
                    let model_id = manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| ScreenerError::ModelNotFound(model.clone()))?;
                    if let Some(info) = manager.get_model_info(&model_id) {
                        println!("Name: {}", info.name);
                        println!("Repository: {}", info.repo_id);
                        println!("Dimensions: {}", info.dimensions);
                        println!("Size: {} MB", info.size_mb);
                        println!("Description: {}", info.description);
                        match manager.get_model_path(&model_id) {
                            Some(path) => println!("Location: {}", path.display()),
                            None => println!("Status: not downloaded (resume-screener models download {})", model_id),
                        }
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("{}", content);
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }

            Some(ConfigAction::Reset) => {
                Config::default().save_to(&config_path)?;
                println!("Configuration reset: {}", config_path.display());
            }
        },
    }

    Ok(())
}
