// leregard - command-line entry point

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lepasserelle::cli::main().await
}
