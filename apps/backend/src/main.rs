#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vocabboost_backend::run().await
}
