//! `errand chat`: interactive or single-message chat mode.

use std::io::Write;
use std::path::PathBuf;

use errand_agent::Conversator;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Runtime;

pub async fn run(
    message: Option<String>,
    datasets: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = Runtime::load(datasets, verbose)?;
    let settings = runtime.config.chat_settings();
    let model = settings.model.clone();
    let mut conv = Conversator::new(
        runtime.provider.clone(),
        runtime.tools.clone(),
        runtime.session.clone(),
        settings,
    )
    .with_event_bus(runtime.event_bus.clone());

    if let Some(msg) = message {
        let reply = conv.send(&msg).await?;
        println!("{reply}");
        return Ok(());
    }

    println!();
    println!("  errand: interactive mode");
    println!();
    println!("  Provider:  {}", runtime.config.default_provider);
    println!("  Model:     {model}");
    println!("  Tools:     {}", runtime.tools.names().join(", "));
    println!();
    println!("  Type your message and press Enter.");
    println!("  ':reset' clears the conversation; 'exit' or Ctrl+D quits.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "exit" | "quit" | ":q" => break,
            ":reset" => {
                conv.reset();
                println!("  (conversation cleared)");
                continue;
            }
            _ => {}
        }

        match conv.send(input).await {
            Ok(reply) => {
                println!();
                for line in reply.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
