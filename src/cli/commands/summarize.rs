//! Chapter summarization command

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, load_text};
use crate::types::Result;

pub async fn run(input: &Path, style: Option<&str>) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;
    let text = load_text(input)?;

    if text.trim().is_empty() {
        output.warning("nothing to summarize");
        return Ok(());
    }

    let summary = engine.summarize_chapter(&text, style).await?;
    println!("{}", summary);
    Ok(())
}
