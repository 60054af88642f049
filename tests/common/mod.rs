//! Shared integration-test bootstrap: load `.env` and turn on log output
//! once per test binary, the way `dbx_leaderboard`'s own unit tests do.

#[ctor::ctor]
fn init() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::try_init().ok();
}
