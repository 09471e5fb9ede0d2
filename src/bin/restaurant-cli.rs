use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "restaurant-cli")]
#[command(about = "Command-line client for the Restaurant Inspection API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Sent as the X-API-Key header
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search inspections by borough, cuisine and grade
    Search {
        #[arg(long)]
        borough: Option<String>,
        #[arg(long)]
        cuisine: Option<String>,
        #[arg(long)]
        min_grade: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Show every inspection of one restaurant
    Details {
        name: String,
        #[arg(long)]
        borough: Option<String>,
    },
    /// List known boroughs
    Boroughs,
    /// List known cuisines
    Cuisines,
    /// Check that the API is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}/api/restaurants", cli.url.trim_end_matches('/'));

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert("x-api-key", HeaderValue::from_str(key)?);
    }

    let request = match cli.command {
        Commands::Search {
            borough,
            cuisine,
            min_grade,
            limit,
        } => client.post(format!("{base}/query")).json(&json!({
            "borough": borough,
            "cuisine": cuisine,
            "minGrade": min_grade,
            "limit": limit,
        })),
        Commands::Details { name, borough } => client
            .post(format!("{base}/details"))
            .json(&json!({ "restaurantName": name, "borough": borough })),
        Commands::Boroughs => client.get(format!("{base}/boroughs")),
        Commands::Cuisines => client.get(format!("{base}/cuisines")),
        Commands::Health => client.get(format!("{base}/health")),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await?;
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        eprintln!("Response: {}", text);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
