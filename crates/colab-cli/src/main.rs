use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod rpc_client;

use rpc_client::RpcClient;

#[derive(Parser)]
#[command(name = "colab", about = "Co.Lab CLI - call collaboration tools over JSON-RPC")]
struct Cli {
    /// Co.Lab server URL
    #[arg(long, env = "COLAB_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Shared secret sent as a bearer token
    #[arg(long, env = "COLAB_API_KEY")]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tools the server exposes
    Tools,

    /// Call a tool and print its content
    Call {
        /// Tool name
        name: String,

        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },

    /// Check that the server has at least one callable tool
    SelfTest,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let client = RpcClient::new(&cli.url, cli.api_key);

    match cli.command {
        Commands::Tools => {
            for tool in client.list_tools().await? {
                println!(
                    "{:<24} {}",
                    tool["name"].as_str().unwrap_or_default(),
                    tool["description"].as_str().unwrap_or_default()
                );
            }
        }
        Commands::Call { name, args } => {
            let arguments: serde_json::Value = serde_json::from_str(&args)?;
            let content = client.call_tool(&name, arguments).await?;
            println!("{}", serde_json::to_string_pretty(&content)?);
        }
        Commands::SelfTest => {
            rpc_client::self_test(&client).await?;
        }
    }

    Ok(())
}
