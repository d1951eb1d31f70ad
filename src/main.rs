//! Fanqie CLI - Chinese web novel scraper and translator.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fanqie::config::Config;
use fanqie::console::Console;
use fanqie::output::{load_document, save_json_to, translated_file_name};
use fanqie::pipeline::Pipeline;
use fanqie::remap::RemapTable;
use fanqie::scrapers::{FanqieScraper, Scraper};
use fanqie::translator::Translator;
use fanqie::utils::sanitize_file_name;
use std::path::PathBuf;

/// Chinese web novel scraper and translator.
#[derive(Parser, Debug)]
#[command(name = "fanqie")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use this config file instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a novel and its unlocked chapters into a JSON file.
    Scrape {
        /// The novel URL to scrape.
        #[arg(short, long)]
        url: String,

        /// Glyph mapping JSON file.
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Output folder.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Collect the info of every novel linked from a listing page.
    Books {
        /// The listing page URL.
        #[arg(short, long)]
        url: String,

        /// Output folder.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Translate the chapters of a scraped JSON file.
    Translate {
        /// JSON file to translate.
        #[arg(short, long)]
        input: PathBuf,

        /// Target language.
        #[arg(short, long)]
        language: String,

        /// Output folder.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// OpenAI-compatible API key.
        #[arg(short = 'k', long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model identifier.
        #[arg(short, long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let console = Console::new().with_debug(config.scraping.debug);
    console.section("Fanqie - Web Novel Scraper");

    match args.command {
        Command::Scrape {
            url,
            mapping,
            output,
        } => {
            let mapping = mapping.unwrap_or_else(|| config.paths.mapping_file.clone());
            let output = output.unwrap_or_else(|| config.paths.output_directory.clone());
            scrape(&config, &console, &url, mapping, output).await?;
        }
        Command::Books { url, output } => {
            let output = output.unwrap_or_else(|| config.paths.output_directory.clone());
            books(&config, &console, &url, output).await?;
        }
        Command::Translate {
            input,
            language,
            output,
            api_key,
            model,
        } => {
            let mut config = config;
            if let Some(key) = api_key {
                config.api.key = key;
            }
            if let Some(model) = model {
                config.api.model = model;
            }
            let output = output.unwrap_or_else(|| config.paths.output_directory.clone());
            translate(&config, &console, input, &language, output).await?;
        }
    }

    console.section("Done!");
    Ok(())
}

/// Scrapes one novel and writes `<output>/<name>.json`.
async fn scrape(
    config: &Config,
    console: &Console,
    url: &str,
    mapping: PathBuf,
    output: PathBuf,
) -> Result<()> {
    console.step("Loading glyph mapping...");
    let table = RemapTable::load(&mapping)
        .with_context(|| format!("Failed to load mapping file {}", mapping.display()))?;
    console.success(&format!("Loaded {} glyph mappings", console.count(table.len())));

    let scraper = create_scraper(config, console, url)?;
    let pipeline = Pipeline::new(&scraper, &table, console);
    let document = pipeline
        .scrape_novel(url)
        .await
        .context("Failed to scrape novel")?;

    let file_name = format!("{}.json", sanitize_file_name(&document.info.name));
    let path = save_json_to(&document, &output, &file_name).context("Failed to save novel")?;
    console.saved(&path);
    Ok(())
}

/// Crawls a listing page and writes `<output>/page-links-<millis>.json`.
async fn books(config: &Config, console: &Console, url: &str, output: PathBuf) -> Result<()> {
    let scraper = create_scraper(config, console, url)?;

    // Listing crawls never touch chapter text, so no mapping is needed.
    let table = RemapTable::default();
    let pipeline = Pipeline::new(&scraper, &table, console);
    let books = pipeline
        .collect_books(url)
        .await
        .context("Failed to collect novels")?;

    let file_name = format!("page-links-{}.json", chrono::Utc::now().timestamp_millis());
    let path = save_json_to(&books, &output, &file_name).context("Failed to save novel list")?;
    console.saved(&path);
    Ok(())
}

/// Translates a scraped document into `<output>/<stem>.<language>.json`.
async fn translate(
    config: &Config,
    console: &Console,
    input: PathBuf,
    language: &str,
    output: PathBuf,
) -> Result<()> {
    config
        .validate_for_translation()
        .context("Invalid configuration")?;

    console.step(&format!("Loading {}...", input.display()));
    let mut document = load_document(&input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let translator = Translator::new(
        config.api.clone(),
        config.translation.clone(),
        language,
        console.clone(),
    );
    let count = translator
        .translate_document(&mut document)
        .await
        .context("Translation failed")?;
    console.success(&format!("Translated {} chapters", console.count(count)));

    let file_name = translated_file_name(&input, language);
    let path = save_json_to(&document, &output, &file_name)
        .context("Failed to save translated novel")?;
    console.saved(&path);
    Ok(())
}

/// Builds the site scraper and checks it accepts `url`.
fn create_scraper(config: &Config, console: &Console, url: &str) -> Result<FanqieScraper> {
    let scraper =
        FanqieScraper::new(config.scraping.clone()).context("Failed to create HTTP client")?;
    if !scraper.can_handle(url) {
        anyhow::bail!("{} scraper does not handle URL: {}", scraper.name(), url);
    }
    console.info(&format!("Using {} scraper for {}", scraper.name(), url));
    Ok(scraper)
}
