use oura_ring_client::http_client::ReqwestOuraClient;
use oura_ring_client::{Category, DateRange, OuraClient, config::Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects OURA_ACCESS_TOKEN in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestOuraClient::from_config(&cfg)?;
    let range = DateRange::new("2024-03-01", "2024-03-07");
    let records = client.fetch_category(Category::PersonalInfo, &range).await?;
    for r in records {
        println!(
            "user {} (age {})",
            r.get("id").and_then(|v| v.as_str()).unwrap_or("?"),
            r.get("age").map(|v| v.to_string()).unwrap_or_default()
        );
    }
    Ok(())
}
