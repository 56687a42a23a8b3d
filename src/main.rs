#[tokio::main]
async fn main() -> anyhow::Result<()> {
    keypad_login::run(std::env::args().nth(1)).await?;
    Ok(())
}
