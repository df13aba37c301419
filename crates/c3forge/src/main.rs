use std::io;
use std::sync::Arc;

use c3forge::app::App;
use c3forge::infra::config::OracleConfig;
use c3forge::infra::oracle::gemini::GeminiCliOracle;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let oracle = GeminiCliOracle::new(OracleConfig::from_env());
    let app = Arc::new(App::with_seed_project(Arc::new(oracle)).map_err(io::Error::other)?);
    let input = BufReader::new(tokio::io::stdin());

    c3forge::runtime::run(app, input, &mut io::stdout()).await
}
