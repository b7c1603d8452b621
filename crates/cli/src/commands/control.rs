use anyhow::Result;
use colored::Colorize;

use crate::client::EvoClient;
use crate::output;

pub async fn pause(client: &EvoClient, json: bool) -> Result<()> {
    let pb = output::spinner("Pausing evolver...");
    let result = client.pause().await;
    pb.finish_and_clear();
    let result = result?;

    if json {
        println!("{result}");
        return Ok(());
    }
    println!("  {} evolver paused", "✓".green());
    Ok(())
}

pub async fn resume(client: &EvoClient, json: bool) -> Result<()> {
    let pb = output::spinner("Resuming evolver...");
    let result = client.resume().await;
    pb.finish_and_clear();
    let result = result?;

    if json {
        println!("{result}");
        return Ok(());
    }
    println!("  {} evolver resumed", "✓".green());
    Ok(())
}

pub async fn run_once(client: &EvoClient, json: bool) -> Result<()> {
    let pb = output::spinner("Running one generation cycle...");
    let result = client.run_once().await;
    pb.finish_and_clear();
    let result = result?;

    if json {
        println!("{result}");
        return Ok(());
    }
    let outcome = result
        .get("result")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    println!("  {} {}", output::status_dot(outcome), outcome.bold());
    Ok(())
}
