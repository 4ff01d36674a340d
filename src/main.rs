#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = xqueue_sweeper::run().await {
        eprintln!("xqueue-sweeper fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
