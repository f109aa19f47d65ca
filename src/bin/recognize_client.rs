use clap::Parser;
use image_recognition::client::{
    ClientError, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT, RecognitionClient,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload an image to the recognition server", long_about = None)]
struct Args {
    /// Image to upload
    #[arg(default_value = "flight.jpg")]
    image: PathBuf,

    /// Server base URL
    #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,

    /// Query /api/status instead of uploading
    #[arg(long)]
    status: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_recognition=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        match e {
            ClientError::Status { status, body } => {
                println!("📥 Server response status: {}", status);
                println!("❌ Request failed: {}", body);
            }
            other => println!("❌ Test failed: {}", other),
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ClientError> {
    let client = RecognitionClient::new(&args.server, Duration::from_secs(args.timeout))?;

    if args.status {
        let status = client.status().await?;
        print_json(&status);
        return Ok(());
    }

    println!("📤 Sending request to server...");
    let result = client.submit(&args.image).await?;

    println!("📥 Server response status: 200 OK");
    println!("✅ Recognition result:");
    print_json(&result);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("❌ Could not render response: {}", e),
    }
}
