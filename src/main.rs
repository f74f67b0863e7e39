//! udoc: generate cross-linked documentation from doc comments in C++
//! sources.
//!
//! Walks ROOT for source files, writes one page per introduction and per
//! class into the output directory, and prints every documentation problem
//! found as `file:line: message`.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use udoc::render;

#[derive(Parser)]
#[command(
    name = "udoc",
    about = "Generate cross-linked documentation pages from doc comments in C++ sources"
)]
struct Cli {
    /// Directory walked for source files
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Output directory (created if missing)
    #[arg(short = 'o', long, default_value = ".")]
    output: PathBuf,

    /// Output format: html (default), markdown, json
    #[arg(short = 'f', long, default_value = "html")]
    format: String,

    /// File-name suffix of source files
    #[arg(long, default_value = ".cpp")]
    suffix: String,

    /// Copyright owner named in each page footer
    #[arg(long, env = "UDOC_OWNER", default_value = "")]
    owner: String,

    /// Home page of the owner, linked from the footer
    #[arg(long, env = "UDOC_OWNER_HOME", default_value = "")]
    owner_home: String,

    /// Exit with status 1 if any documentation problem was reported
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let mut renderer = render::create_renderer(&cli.format, &cli.owner, &cli.owner_home)?;
    let config = udoc::Config {
        root: cli.root.clone(),
        suffix: cli.suffix.clone(),
    };
    let reg = udoc::run(&config, renderer.as_mut())?;

    for d in reg.diagnostics.iter() {
        println!("{}", d);
    }

    let pages = renderer.finish();
    fs::create_dir_all(&cli.output)
        .with_context(|| format!("failed to create output directory: {}", cli.output.display()))?;
    for page in &pages {
        let path = cli.output.join(&page.name);
        fs::write(&path, &page.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!("wrote {}", path.display());
    }

    if cli.strict && !reg.diagnostics.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["udoc"]);
        assert_eq!(cli.root, PathBuf::from("."));
        assert_eq!(cli.output, PathBuf::from("."));
        assert_eq!(cli.format, "html");
        assert_eq!(cli.suffix, ".cpp");
        assert!(!cli.strict);
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "udoc", "src", "-o", "docs", "-f", "md", "--suffix", ".cc", "--owner", "Acme",
            "--strict",
        ]);
        assert_eq!(cli.root, PathBuf::from("src"));
        assert_eq!(cli.output, PathBuf::from("docs"));
        assert_eq!(cli.format, "md");
        assert_eq!(cli.suffix, ".cc");
        assert_eq!(cli.owner, "Acme");
        assert!(cli.strict);
    }
}
