//! Load extracted page text from disk.
//!
//! Accepts `pdftotext` output (pages separated by form feeds), one text file
//! per page, or a directory of `*.txt` pages read in file-name order.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tally_ingest::Statement;

pub fn load_statement(inputs: &[PathBuf]) -> Result<Statement> {
    let files = match inputs {
        [single] if single.is_dir() => page_files_in(single)?,
        _ => inputs.to_vec(),
    };
    if files.is_empty() {
        bail!("no page text files found");
    }

    let mut pages = Vec::new();
    for file in &files {
        pages.extend(read_pages(file)?);
    }
    Ok(Statement::from_pages(pages))
}

fn page_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_pages(path: &Path) -> Result<Vec<String>> {
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf")) {
        bail!(
            "{} is a PDF; extract its text first (e.g. `pdftotext -layout {} -`)",
            path.display(),
            path.display()
        );
    }
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(split_pages(&text))
}

fn split_pages(text: &str) -> Vec<String> {
    Statement::from_form_feed_text(text).pages().to_vec()
}
