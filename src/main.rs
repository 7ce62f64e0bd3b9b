#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    iclub_eventtool::run().await
}
