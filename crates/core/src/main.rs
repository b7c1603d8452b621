//! Binary entry point. Loads `.env`, initializes tracing, and hands off to
//! `evo_core::run_kernel`, mirroring the teacher's own thin `main.rs`
//! (`dotenvy` + `tracing_subscriber::fmt::init()` + a single kernel call).

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    evo_core::run_kernel().await
}
