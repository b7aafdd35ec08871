//! Interactive streaming chat command

use std::io::{BufRead, Write as _};
use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{build_engine, load_pages};
use crate::types::{Result, join_pages};

/// Chat with the academic assistant. With a context file, answers are
/// grounded in the document only. Fragments are printed as they stream in.
pub async fn run(context: Option<&Path>) -> Result<()> {
    let output = Output::new();
    let engine = build_engine()?;

    let session = match context {
        Some(path) => {
            let pages = load_pages(path)?;
            output.info(&format!("chat grounded in {} pages", pages.len()));
            engine.create_chat_with_context(&join_pages(&pages))
        }
        None => engine.create_chat(),
    };

    output.info("academic assistant ready; empty line to exit");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            break;
        }

        let mut stream = session.send(message).await?;
        while let Some(fragment) = stream.next_fragment().await {
            match fragment {
                Ok(text) => {
                    print!("{}", text);
                    std::io::stdout().flush()?;
                }
                Err(err) => {
                    println!();
                    output.error(&err.to_string());
                    break;
                }
            }
        }
        println!();
    }

    Ok(())
}
