#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finance_bot::cli::run_with_sys_args().await
}
