use anyhow::Result;
use colored::Colorize;

use crate::client::EvoClient;
use crate::output;

/// Combined Evolver + Budget + Router snapshot.
pub async fn status(client: &EvoClient, json: bool) -> Result<()> {
    let pb = output::spinner("Fetching status...");
    let status = client.get_status().await;
    let budget = client.get_budget().await;
    let router = client.get_router().await;
    pb.finish_and_clear();

    let status = status?;
    let budget = budget?;
    let router = router?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "evolver": status, "budget": budget, "router": router })
        );
        return Ok(());
    }

    output::print_header("Evolver");
    print_kv("generation", status.get("generation"));
    print_kv("running", status.get("running"));
    print_kv("interval_ms", status.get("interval_ms"));
    print_kv("accept_rate", status.get("accept_rate"));
    print_kv("last_result", status.get("last_result"));

    output::print_header("Token Budget");
    print_kv("tokens_used_today", budget.get("tokens_used_today"));
    print_kv("daily_cap", budget.get("daily_cap"));
    print_kv("remaining", budget.get("remaining"));

    output::print_header("Model Router");
    print_kv("current_model_tag", router.get("current_model_tag"));
    print_kv("cheap_calls", router.get("cheap_calls"));
    print_kv("capable_calls", router.get("capable_calls"));
    print_kv("consecutive_failures", router.get("consecutive_failures"));

    println!();
    Ok(())
}

pub async fn budget(client: &EvoClient, json: bool) -> Result<()> {
    let pb = output::spinner("Fetching budget...");
    let budget = client.get_budget().await;
    pb.finish_and_clear();
    let budget = budget?;

    if json {
        println!("{budget}");
        return Ok(());
    }

    output::print_header("Token Budget");
    print_kv("tokens_used_today", budget.get("tokens_used_today"));
    print_kv("daily_cap", budget.get("daily_cap"));
    print_kv("remaining", budget.get("remaining"));
    print_kv("percent_used", budget.get("percent_used"));
    println!();
    Ok(())
}

pub async fn router(client: &EvoClient, json: bool) -> Result<()> {
    let pb = output::spinner("Fetching router state...");
    let router = client.get_router().await;
    pb.finish_and_clear();
    let router = router?;

    if json {
        println!("{router}");
        return Ok(());
    }

    output::print_header("Model Router");
    print_kv("current_model_tag", router.get("current_model_tag"));
    print_kv("cheap_calls", router.get("cheap_calls"));
    print_kv("capable_calls", router.get("capable_calls"));
    print_kv("consecutive_failures", router.get("consecutive_failures"));
    println!();
    Ok(())
}

fn print_kv(key: &str, value: Option<&serde_json::Value>) {
    let value = value
        .map(|v| v.to_string().trim_matches('"').to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("  {:<22} {}", format!("{key}:").dimmed(), value.bold());
}
