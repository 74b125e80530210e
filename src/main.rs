//! hybridmark - Main Entry Point
//!
//! Renders a Markdown file through the hybrid pipeline and prints the result
//! as a standalone HTML page.
//!
//! ```text
//! hybridmark <file.md> [--edit-line N] [--plain] [--dark] [--config FILE]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use hybridmark::assets::FsAssetReader;
use hybridmark::config::{EditorConfig, Theme};
use hybridmark::editor::{EditInput, HybridEditor};
use hybridmark::error::{Error, Result};
use hybridmark::render::{
    render_hybrid, standalone_document, ClientSideDiagramRenderer, HtmlRenderer, HtmlView,
    RenderContext, ViewCache,
};
use hybridmark::theme::ThemeColors;
use log::info;

/// Application name constant.
const APP_NAME: &str = "hybridmark";

const USAGE: &str = "usage: hybridmark <file.md> [--edit-line N] [--plain] [--dark] [--config FILE]";

/// Parsed command line.
#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    path: PathBuf,
    edit_line: Option<usize>,
    plain: bool,
    dark: bool,
    /// JSON editor configuration
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut path = None;
    let mut edit_line = None;
    let mut plain = false;
    let mut dark = false;
    let mut config = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--plain" => plain = true,
            "--dark" => dark = true,
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| Error::Application(format!("--config needs a value\n{}", USAGE)))?;
                config = Some(PathBuf::from(value));
            }
            "--edit-line" => {
                let value = iter
                    .next()
                    .ok_or_else(|| Error::Application(format!("--edit-line needs a value\n{}", USAGE)))?;
                let line = value
                    .parse::<usize>()
                    .ok()
                    .filter(|line| *line > 0)
                    .ok_or_else(|| Error::Application(format!("invalid line number '{}'", value)))?;
                edit_line = Some(line);
            }
            flag if flag.starts_with("--") => {
                return Err(Error::Application(format!("unknown option '{}'\n{}", flag, USAGE)));
            }
            file if path.is_none() => path = Some(PathBuf::from(file)),
            extra => {
                return Err(Error::Application(format!("unexpected argument '{}'\n{}", extra, USAGE)));
            }
        }
    }

    let path = path.ok_or_else(|| Error::Application(USAGE.to_string()))?;
    Ok(CliArgs {
        path,
        edit_line,
        plain,
        dark,
        config,
    })
}

fn run(args: &CliArgs) -> Result<String> {
    let text = std::fs::read_to_string(&args.path).map_err(|e| Error::asset(args.path.clone(), e))?;

    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).map_err(|e| Error::asset(path.clone(), e))?;
            EditorConfig::from_json_or_default(&json)
        }
        None => EditorConfig::default(),
    };
    config.base_dir = EditorConfig::for_document(&args.path).base_dir;
    config.plain_text_mode |= args.plain;
    if args.dark {
        config.theme = Theme::Dark;
    }
    let theme = config.theme;

    let mut editor = HybridEditor::new(text, config);
    if let Some(line) = args.edit_line {
        editor.navigate_to_line(line);
        editor.handle_input(EditInput::Enter);
    }

    let colors = ThemeColors::from_theme(theme, false);
    let mut ctx = RenderContext::new(colors.dark);
    let mut cache: ViewCache<HtmlView> = ViewCache::default();
    let (views, stats) = cache.reconcile(editor.decorations(), &HtmlRenderer, &mut ctx);
    let delivered = ctx
        .tasks
        .run_pending(&FsAssetReader, &ClientSideDiagramRenderer);
    info!(
        "Rendered {} decorations ({} widgets, {} deferred results)",
        editor.decorations().len(),
        stats.rendered,
        delivered
    );

    let body = render_hybrid(editor.text(), editor.decorations(), &views);
    let title = args
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| APP_NAME.to_string());
    Ok(standalone_document(&title, &body, &colors))
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting {}", APP_NAME);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(|cli| run(&cli));
    match result {
        Ok(html) => {
            println!("{}", html);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", APP_NAME, e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let cli = parse_args(&args(&["notes.md", "--edit-line", "3", "--dark"])).unwrap();
        assert_eq!(
            cli,
            CliArgs {
                path: PathBuf::from("notes.md"),
                edit_line: Some(3),
                plain: false,
                dark: true,
                config: None,
            }
        );
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.md", "--edit-line", "0"])).is_err());
        assert!(parse_args(&args(&["a.md", "--bogus"])).is_err());
        assert!(parse_args(&args(&["a.md", "b.md"])).is_err());
        assert!(parse_args(&args(&["a.md", "--config"])).is_err());
    }

    #[test]
    fn test_run_renders_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Title\n\n- item\n").unwrap();

        let cli = CliArgs {
            path: path.clone(),
            edit_line: None,
            plain: false,
            dark: false,
            config: None,
        };
        let html = run(&cli).unwrap();
        assert!(html.contains("<title>doc.md</title>"));
        assert!(html.contains("<div class=\"cm-line\">Title</div>"));
        assert!(html.contains("hm-bullet"));

        let raw = run(&CliArgs {
            edit_line: Some(1),
            ..cli
        })
        .unwrap();
        assert!(raw.contains("<div class=\"cm-line\"># Title</div>"));
    }

    #[test]
    fn test_run_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("doc.md");
        let config = dir.path().join("config.json");
        std::fs::write(&doc, "**bold**").unwrap();
        std::fs::write(&config, r#"{"plain_text_mode": true, "theme": "dark"}"#).unwrap();

        let html = run(&CliArgs {
            path: doc,
            edit_line: None,
            plain: false,
            dark: false,
            config: Some(config),
        })
        .unwrap();
        assert!(html.contains("<div class=\"cm-line\">**bold**</div>"));
        assert!(html.contains("color-scheme: dark"));
    }

    #[test]
    fn test_run_missing_file() {
        let cli = CliArgs {
            path: PathBuf::from("/definitely/not/here.md"),
            edit_line: None,
            plain: true,
            dark: false,
            config: None,
        };
        assert!(matches!(run(&cli), Err(Error::AssetNotFound { .. })));
    }
}
