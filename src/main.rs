#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = assessment_core::run().await {
        eprintln!("assessment-core fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
