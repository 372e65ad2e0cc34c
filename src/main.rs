#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = elearn_api::run().await {
        eprintln!("elearn-api fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
