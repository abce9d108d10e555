#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = internhub::run().await {
        eprintln!("internhub fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
