use anyhow::Result;
use clap::Parser;
use estate_sdk::EstateClient;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about = "Query the drone plan for an estate", long_about = None)]
struct Args {
    /// Estate server URL
    #[arg(long, default_value = "http://localhost:1323")]
    url: String,

    /// Estate id returned when the estate was created
    estate_id: Uuid,

    /// Battery budget; omit to get only the coverage distance
    #[arg(long)]
    max_distance: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = EstateClient::new(args.url);

    let plan = client.drone_plan(args.estate_id, args.max_distance).await?;
    println!("Coverage distance: {}", plan.distance);
    match plan.rest {
        Some(rest) => println!("Drone rests at ({}, {})", rest.x, rest.y),
        None if args.max_distance.is_some() => println!("No rest point returned"),
        None => {}
    }

    Ok(())
}
