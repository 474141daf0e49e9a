//! CLI for generating, rendering, exporting and inspecting CanvasDeck decks.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use deck_core::render::document_html;
use deck_core::{Deck, ImageUrlBuilder, SeedPolicy, Session, Theme, ThemeKey};
use deck_generate::{GeminiClient, GenerationConfig};
use deck_pptx::PptxInspector;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Generate slide decks from a prompt and export them to PowerPoint.
#[derive(Parser, Debug)]
#[command(name = "canvasdeck")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a deck description (JSON) from a free-text request
    Generate {
        /// What the deck should be about, e.g. "3 slides on renewable energy"
        #[arg(required = true)]
        prompt: Vec<String>,

        /// Write the deck JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a deck JSON file to a standalone HTML page
    Render {
        /// Deck JSON file
        deck: PathBuf,

        /// Theme: cyber, executive or electric
        #[arg(short, long, default_value = "cyber")]
        theme: String,

        /// Image seed: random, derived, or a number
        #[arg(short, long)]
        seed: Option<String>,

        /// Only render this slide (1-based)
        #[arg(long)]
        slide: Option<usize>,

        /// Write the HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a deck JSON file to .pptx
    Export {
        /// Deck JSON file
        deck: PathBuf,

        /// Theme: cyber, executive or electric
        #[arg(short, long, default_value = "cyber")]
        theme: String,

        /// Image seed: random, derived, or a number
        #[arg(short, long)]
        seed: Option<String>,

        /// Output file or directory (default: CanvasDeck_<Theme>.pptx next to the deck)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the slides and shapes of a .pptx file
    Inspect {
        /// .pptx file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the available themes
    Themes,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!("Failed to load .env: {}", e);
        }
    }

    match args.command {
        Command::Generate { prompt, output } => generate(&prompt.join(" "), output.as_deref()),
        Command::Render {
            deck,
            theme,
            seed,
            slide,
            output,
        } => {
            let session = open_session(&deck, &theme, seed.as_deref())?;
            let html = render_html(session, slide)?;
            emit(output.as_deref(), &html)
        }
        Command::Export {
            deck,
            theme,
            seed,
            output,
        } => {
            let session = open_session(&deck, &theme, seed.as_deref())?;
            let file = deck_pptx::export_session(&session).context("Export failed")?;
            let path = export_path(&deck, output.as_deref(), &file.file_name)?;
            std::fs::write(&path, &file.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Written to: {}", path.display());
            Ok(())
        }
        Command::Inspect { file, json } => inspect(&file, json),
        Command::Themes => {
            for theme in Theme::all() {
                println!(
                    "{:<10} {:<10} accent {}",
                    theme.key.as_str(),
                    theme.label,
                    theme.screen.accent
                );
            }
            Ok(())
        }
    }
}

fn generate(prompt: &str, output: Option<&Path>) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("Prompt is required");
    }
    let client = GeminiClient::new(GenerationConfig::from_env());
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let mut session = Session::new(ThemeKey::default());
    session.begin_generation()?;
    let outcome = runtime.block_on(client.generate_deck(prompt));
    let deck = session
        .finish_generation(outcome)
        .context("Generation failed")?;

    log::info!("generated {} slides: {:?}", deck.len(), deck.layout_tags());
    let json = serde_json::to_string_pretty(deck)?;
    emit(output, &format!("{}\n", json))
}

/// Load a deck file into a session with the requested theme and seed policy.
fn open_session(deck_path: &Path, theme: &str, seed: Option<&str>) -> Result<Session> {
    let theme: ThemeKey = theme.parse()?;
    let seed_policy: SeedPolicy = match seed {
        Some(raw) => raw.parse()?,
        None => match std::env::var("CANVASDECK_IMAGE_SEED") {
            Ok(raw) => raw.parse()?,
            Err(_) => SeedPolicy::default(),
        },
    };

    let json = std::fs::read_to_string(deck_path)
        .with_context(|| format!("Failed to read {}", deck_path.display()))?;
    let deck = Deck::from_json(&json)
        .with_context(|| format!("Failed to parse {}", deck_path.display()))?;
    log::debug!("loaded '{}' ({} slides)", deck.title, deck.len());

    let mut session = Session::new(theme)
        .with_images(ImageUrlBuilder::new().with_seed_policy(seed_policy));
    session.load_deck(deck);
    Ok(session)
}

fn render_html(mut session: Session, slide: Option<usize>) -> Result<String> {
    let title = session.deck().map(|d| d.title.clone()).unwrap_or_default();
    let nodes = match slide {
        Some(n) => {
            let count = session.deck().map(Deck::len).unwrap_or_default();
            if n == 0 || n > count {
                bail!("Slide {} is out of range (deck has {} slides)", n, count);
            }
            session.go_to(n - 1);
            vec![session.render_current()?]
        }
        None => session.render_all()?,
    };
    Ok(document_html(&title, session.theme(), &nodes)?)
}

fn inspect(path: &Path, json: bool) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let deck = PptxInspector::new()
        .inspect(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&deck)?);
        return Ok(());
    }
    if let Some(title) = &deck.title {
        println!("{}", title);
    }
    for slide in &deck.slides {
        println!("Slide {} ({})", slide.number, slide.path);
        for shape in &slide.shapes {
            if shape.text.is_empty() {
                println!("  [{}]", shape.name);
            } else {
                println!("  [{}] {}", shape.name, shape.text.replace('\n', " | "));
            }
        }
        for link in &slide.image_links {
            println!("  image: {}", link);
        }
    }
    Ok(())
}

/// Where to write an export: an explicit file, a directory, or next to the deck.
fn export_path(deck_path: &Path, output: Option<&Path>, file_name: &str) -> Result<PathBuf> {
    let path = match output {
        Some(out) if out.is_dir() => out.join(file_name),
        Some(out) if out.extension().is_none() => {
            std::fs::create_dir_all(out)
                .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
            out.join(file_name)
        }
        Some(out) => out.to_path_buf(),
        None => match deck_path.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        },
    };
    Ok(path)
}

/// Write to a file, or stdout when no path is given.
fn emit(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_path_defaults_next_to_deck() {
        let path = export_path(Path::new("decks/energy.json"), None, "CanvasDeck_Cyber.pptx").unwrap();
        assert_eq!(path, PathBuf::from("decks/CanvasDeck_Cyber.pptx"));

        let path = export_path(
            Path::new("energy.json"),
            Some(Path::new("out.pptx")),
            "CanvasDeck_Cyber.pptx",
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("out.pptx"));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "canvasdeck", "export", "deck.json", "--theme", "electric", "--seed", "42", "-v",
        ])
        .unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Export { theme, seed, .. } => {
                assert_eq!(theme, "electric");
                assert_eq!(seed.as_deref(), Some("42"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_render_single_slide() {
        let deck = Deck::from_json(
            r#"{"title": "T", "slides": [
                {"layout": "title-cyber", "title": "One"},
                {"layout": "big-stat", "title": "Two", "stat": {"value": "9", "label": "x"}}
            ]}"#,
        )
        .unwrap();
        let mut session = Session::new(ThemeKey::Cyber);
        session.load_deck(deck);

        let html = render_html(session.clone(), Some(2)).unwrap();
        assert!(html.contains("Two"));
        assert!(!html.contains(">One<"));
        assert!(render_html(session.clone(), Some(3)).is_err());
        assert_eq!(render_html(session, None).unwrap().matches("cd-counter\">").count(), 2);
    }
}
