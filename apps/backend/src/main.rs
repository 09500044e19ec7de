#[tokio::main]
async fn main() -> anyhow::Result<()> {
    study_backend::run().await
}
