use clap::Parser;
use client::network::Client;
use env_logger::Env;
use log::info;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server host name or IP address
    host: String,

    /// Server port
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("Starting client...");
    info!("Commands: MOVE/ATTACK UP|DOWN|LEFT|RIGHT, QUIT");

    let client = Client::connect(&args.host, args.port).await?;
    client.run().await?;

    // The stdin reader can still be parked on a blocking read
    std::process::exit(0);
}
