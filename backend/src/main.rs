//! # Backend Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//! Configuration comes from the environment (and `.env`), see `lib_core::Config`.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lib_web::start_server().await
}
