use std::{io, process};

use arenals::{
  Arena, Error, Str, config,
  sys::{FsDir, HeapBuf},
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder().with_default_directive(LevelFilter::WARN.into()).from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  if let Err(err) = try_main() {
    error!(%err, "arenals failed");
    process::exit(err.exit_code());
  }
}

fn try_main() -> Result<(), Error> {
  let buf = HeapBuf::allocate(config::ARENA_BYTES).map_err(Error::Buffer)?;
  let mut arena = Arena::new(buf);
  info!(capacity = arena.capacity(), "arena ready");

  let summary =
    arenals::run(&mut arena, &mut FsDir, Str::new(config::BASE_PATH), &mut io::stdout().lock())?;
  info!(?summary, "listing complete");
  Ok(())
}
