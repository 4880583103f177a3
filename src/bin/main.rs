use log::*;

use clap::Parser;
use dotenv::dotenv;

use fast_realworld_client::app::{*, commands::Cli};
use fast_realworld_client::error::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  dotenv().ok();
  env_logger::init();

  let cli = Cli::parse();
  let config = AppConfig::new(cli.config.as_deref())?;
  let ctx = AppContext::from_config(&config)?;

  // Commands still run logged out when the stored session is unreadable.
  match ctx.session.restore_session().await {
    Ok(true) => debug!("restored session: identity={}", ctx.session.has_identity()),
    Ok(false) => (),
    Err(err) => warn!("could not restore session: {}", err),
  }

  if let Err(err) = commands::execute(&ctx, cli.command).await {
    error!("command failed: {:?}", err);
    return Err(err);
  }
  debug!("Main finished");
  Ok(())
}
