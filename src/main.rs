// src/main.rs
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    poll_web::start_server().await
}
