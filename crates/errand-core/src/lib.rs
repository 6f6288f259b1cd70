pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod mvi;
pub mod navigator;
pub mod render;
pub mod repository;
pub mod screens;
pub mod shell;
pub mod task;

#[cfg(test)]
mod testing;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting errand shell"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  )?;
  if cli.json {
    cfg.render_format =
      render::RenderFormat::Json;
  }
  debug!(?cfg, "effective config");

  let runtime =
    tokio::runtime::Builder::new_current_thread()
      .enable_time()
      .build()
      .context(
        "failed to start async \
         runtime"
      )?;

  runtime.block_on(shell::run(
    &cfg,
    cli.script.as_deref()
  ))?;

  info!("done");
  Ok(())
}
