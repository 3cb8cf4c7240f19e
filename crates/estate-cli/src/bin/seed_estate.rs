use anyhow::Result;
use clap::Parser;
use estate_cli::Scenario;
use estate_sdk::EstateClient;

#[derive(Parser, Debug)]
#[command(author, version, about = "Create an estate and plant random trees", long_about = None)]
struct Args {
    /// Estate server URL
    #[arg(long, default_value = "http://localhost:1323")]
    url: String,

    /// Number of rows (y axis)
    #[arg(long, default_value_t = 10)]
    width: i64,

    /// Plots per row (x axis)
    #[arg(long, default_value_t = 10)]
    length: i64,

    /// Trees to plant
    #[arg(long, default_value_t = 20)]
    trees: usize,

    #[arg(long, default_value_t = 30)]
    max_height: i64,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Also print the rest point for this battery budget
    #[arg(long)]
    max_distance: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = EstateClient::new(&args.url);
    let scenario = Scenario::random(args.width, args.length, args.trees, args.max_height, args.seed);

    let estate_id = client.create_estate(scenario.width, scenario.length).await?;
    println!("Created estate {} ({}x{})", estate_id, scenario.width, scenario.length);

    let mut planted = 0;
    for tree in &scenario.trees {
        match client.plant_tree(estate_id, tree.x, tree.y, tree.height).await {
            Ok(_) => planted += 1,
            Err(e) => eprintln!("Failed to plant at ({}, {}): {}", tree.x, tree.y, e),
        }
    }
    println!("Planted {}/{} trees", planted, scenario.trees.len());

    let stats = client.stats(estate_id).await?;
    println!("Stats: {}", serde_json::to_string_pretty(&stats)?);

    let plan = client.drone_plan(estate_id, args.max_distance).await?;
    println!("Drone plan: {}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
