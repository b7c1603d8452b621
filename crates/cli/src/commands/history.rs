use anyhow::Result;

use crate::cli::HistoryCommand;
use crate::client::EvoClient;
use crate::output;

pub async fn run(client: &EvoClient, cmd: HistoryCommand, json: bool) -> Result<()> {
    match cmd {
        HistoryCommand::Recent { limit } => {
            let pb = output::spinner("Fetching recent generations...");
            let result = client.recent_generations(limit).await;
            pb.finish_and_clear();
            let result = result?;

            if json {
                println!("{result}");
                return Ok(());
            }
            output::print_header(&format!("Recent generations (limit {limit})"));
            output::print_generations_table(as_records(&result));
        }
        HistoryCommand::Get { generation } => {
            let pb = output::spinner(&format!("Fetching generation {generation}..."));
            let result = client.get_generation(generation).await;
            pb.finish_and_clear();
            let result = result?;

            if json {
                println!("{result}");
                return Ok(());
            }
            output::print_header(&format!("Generation {generation}"));
            output::print_generations_table(std::slice::from_ref(&result));
        }
        HistoryCommand::ByStatus { status, limit } => {
            let pb = output::spinner(&format!("Fetching '{status}' generations..."));
            let result = client.generations_by_status(&status, limit).await;
            pb.finish_and_clear();
            let result = result?;

            if json {
                println!("{result}");
                return Ok(());
            }
            output::print_header(&format!("Generations with status '{status}' (limit {limit})"));
            output::print_generations_table(as_records(&result));
        }
    }
    Ok(())
}

fn as_records(value: &serde_json::Value) -> &[serde_json::Value] {
    value
        .get("generations")
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .or_else(|| value.as_array().map(|v| v.as_slice()))
        .unwrap_or(&[])
}
