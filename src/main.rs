#[actix_rt::main]
async fn main() -> anyhow::Result<()> {
    article_service::run().await
}
