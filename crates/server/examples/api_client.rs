//! Examples for using the Contex Server API

use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:8080";
const API_KEY: &str = "demo-key-12345";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: Publish a data key
    println!("2. Publish Data:");
    let resp = client
        .post(format!("{SERVER_URL}/data/publish"))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "project_id": "demo-project",
            "data_key": "users_schema",
            "data": {
                "table": "users",
                "columns": {"id": "uuid", "email": "varchar unique"}
            },
            "data_format": "json"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: Register an agent
    println!("3. Register Agent:");
    let resp = client
        .post(format!("{SERVER_URL}/agents/register"))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "agent_id": "agent-1",
            "project_id": "demo-project",
            "data_needs": ["user email schema"],
            "response_format": "json",
            "notification_method": "redis",
            "notification_channel": "agent-1:updates"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 4: Ad-hoc query
    println!("4. Ad-hoc Query:");
    let resp = client
        .post(format!("{SERVER_URL}/projects/demo-project/query"))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "query": "user email schema",
            "top_k": 1
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 5: Event log range
    println!("5. Event Log Range:");
    let resp = client
        .get(format!("{SERVER_URL}/projects/demo-project/events"))
        .header("X-API-Key", API_KEY)
        .query(&[("since", "0")])
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 6: List data keys
    println!("6. List Data Keys:");
    let resp = client
        .get(format!("{SERVER_URL}/projects/demo-project/data"))
        .header("X-API-Key", API_KEY)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 7: Unregister the agent
    println!("7. Unregister Agent:");
    let resp = client
        .delete(format!("{SERVER_URL}/agents/agent-1"))
        .header("X-API-Key", API_KEY)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 8: Server metadata
    println!("8. Server Metadata:");
    let resp = client
        .get(format!("{SERVER_URL}/metadata"))
        .header("X-API-Key", API_KEY)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 9: Metrics
    println!("9. Prometheus Metrics:");
    let resp = client.get(format!("{SERVER_URL}/metrics")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("All examples completed!");
    Ok(())
}
