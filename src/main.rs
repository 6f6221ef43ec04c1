#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = college_records::run().await {
        eprintln!("college-records fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
