use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    d2_mcp::main_entry().await
}
