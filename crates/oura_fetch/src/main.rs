use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use oura_ring_client::config::Config;
use oura_ring_client::http_client::ReqwestOuraClient;
use oura_ring_client::{Category, DateRange, OuraClient, fetch_and_select};

/// Fetch one category of Oura Ring data and print it as JSON.
#[derive(Debug, Parser)]
#[command(name = "oura_fetch", version)]
struct Args {
    /// Category key or label, e.g. `heart_rate` or "Daily Sleep".
    #[arg(value_parser = parse_category)]
    category: Category,

    /// First day of the range (YYYY-MM-DD). Defaults to a week before `--end`.
    #[arg(long)]
    start: Option<String>,

    /// Last day of the range (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Only call the endpoint for the requested category instead of all ten.
    #[arg(long)]
    only_requested: bool,
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: oura_ring_client::OuraError| e.to_string())
}

/// Fill in missing range bounds: `end` defaults to `today`, `start` to a week before `end`.
fn resolve_range(start: Option<String>, end: Option<String>, today: NaiveDate) -> DateRange {
    let end = end.unwrap_or_else(|| today.to_string());
    let start = start.unwrap_or_else(|| {
        let anchor = NaiveDate::parse_from_str(&end, "%Y-%m-%d").unwrap_or(today);
        anchor
            .checked_sub_signed(Duration::days(7))
            .unwrap_or(anchor)
            .to_string()
    });
    DateRange::new(start, end)
}

fn log_filter() -> String {
    std::env::var("OURA_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_env = log_filter();
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    let args = Args::parse();
    let cfg = Config::from_env()?;
    let client = ReqwestOuraClient::from_config(&cfg)?;
    let range = resolve_range(args.start, args.end, Utc::now().date_naive());
    tracing::info!(
        category = %args.category,
        start = %range.start,
        end = %range.end,
        "oura_fetch: fetching"
    );

    let records = if args.only_requested {
        client.fetch_category(args.category, &range).await?
    } else {
        fetch_and_select(&client, args.category, &range).await?
    };

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &records)?;
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    #[test]
    fn resolve_range_defaults_to_last_week() {
        let r = resolve_range(None, None, today());
        assert_eq!(r, DateRange::new("2024-03-03", "2024-03-10"));
    }

    #[test]
    fn resolve_range_anchors_start_on_end() {
        let r = resolve_range(None, Some("2024-02-05".into()), today());
        assert_eq!(r, DateRange::new("2024-01-29", "2024-02-05"));
    }

    #[test]
    fn resolve_range_near_min_date_does_not_underflow() {
        let floor = NaiveDate::MIN.to_string();
        let r = resolve_range(None, Some(floor.clone()), today());
        assert_eq!(r.end, floor);
        assert!(!r.start.is_empty());

        let r = resolve_range(None, None, NaiveDate::MIN);
        assert_eq!(r, DateRange::new(NaiveDate::MIN.to_string(), NaiveDate::MIN.to_string()));
    }

    #[test]
    fn resolve_range_passes_explicit_bounds_through() {
        let r = resolve_range(Some("x".into()), Some("y".into()), today());
        assert_eq!(r, DateRange::new("x", "y"));
    }

    #[test]
    fn args_parse_label_and_flags() {
        let args = Args::try_parse_from([
            "oura_fetch",
            "Daily Sleep",
            "--start",
            "2024-01-01",
            "--only-requested",
        ])
        .expect("args");
        assert_eq!(args.category, Category::DailySleep);
        assert_eq!(args.start.as_deref(), Some("2024-01-01"));
        assert!(args.end.is_none());
        assert!(args.only_requested);
    }

    #[test]
    fn args_reject_unknown_category() {
        assert!(Args::try_parse_from(["oura_fetch", "steps"]).is_err());
    }

    #[test]
    fn env_filter_accepts_default() {
        assert!(tracing_subscriber::EnvFilter::try_new("info").is_ok());
    }
}
