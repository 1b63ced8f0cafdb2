mod interface;

use std::collections::HashMap;
use std::io::{Read, Write};

use color_eyre::eyre::WrapErr;
use color_eyre::Result;

use rechain::chain::ChainBuilder;
use rechain::config::{Config, Overrides};
use rechain::message::cleanup_message;
use rechain::repo::ObjectRepository;
use rechain::storable::{GitObject, ObjectKind, Storable};
use rechain::store::GitCliStore;

use crate::interface::*;

use clap::Parser;
use once_cell::sync::Lazy;
use tracing::*;
use tracing_subscriber::prelude::*;

static ARGS: Lazy<Opt> = Lazy::new(Opt::parse);

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    Lazy::force(&ARGS);

    match &ARGS.command {
        Command::Replay {
            onto,
            from,
            head,
            sign,
        } => {
            let store = GitCliStore::open(&ARGS.git_dir);
            let overrides = Overrides {
                sign: sign.then_some(true),
                ..Overrides::default()
            };
            let config = Config::resolve(&overrides, &store)?;

            let onto = store
                .rev_parse(onto)
                .wrap_err_with(|| format!("Not a commit: '{onto}'"))?;
            let from = store
                .rev_parse(from)
                .wrap_err_with(|| format!("Not a commit: '{from}'"))?;
            let head = store
                .rev_parse(head)
                .wrap_err_with(|| format!("Not a commit: '{head}'"))?;

            let mut repo = ObjectRepository::new(store).with_signing(config.sign);
            let target = repo.find_commit(&from)?;

            let mut chain = ChainBuilder::new(&mut repo);
            let commits = chain.find_commits_range(&target, &head)?;
            let tip = chain.chain_commits(&onto, &commits, &mut |fraction: f64| {
                info!("Replaying commits: {:.0}%", fraction * 100.0)
            })?;

            println!("{tip}");
        }
        Command::Cleanup { mode, comment_char } => {
            let overrides = Overrides {
                cleanup: mode.clone(),
                comment: comment_char.clone(),
                sign: None,
            };
            let config = if ARGS.git_dir.is_dir() {
                Config::resolve(&overrides, &GitCliStore::open(&ARGS.git_dir))?
            } else {
                Config::resolve(&overrides, &HashMap::<String, String>::new())?
            };

            let mut message = Vec::new();
            std::io::stdin().read_to_end(&mut message)?;
            let cleaned = cleanup_message(&message, config.cleanup, Some(&config.comment));
            std::io::stdout().write_all(&cleaned)?;
        }
        Command::HashObject { write, file } => {
            let data =
                std::fs::read(file).wrap_err_with(|| format!("Could not read '{file}'"))?;
            let mut repo = ObjectRepository::new(GitCliStore::open(&ARGS.git_dir));

            let oid = if *write {
                let blob = repo.create_blob(data);
                repo.persist_object(&GitObject::Blob(blob.clone()))?;
                *blob.oid()
            } else {
                repo.fetch_oid(ObjectKind::Blob, &data)?
            };
            println!("{oid}");
        }
    }
    Ok(())
}
