use std::path::PathBuf;
use std::time::Instant;

use discovery::TargetGroup;
use exitcode::ExitCode;

use crate::config::Config;
use crate::sacloud::{self, Inventory};
use crate::targets;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("list servers of target {service:?} failed, {err}")]
    Inventory {
        service: String,
        err: sacloud::Error,
    },
    #[error(transparent)]
    Write(#[from] discovery::Error),
}

impl Error {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::Inventory { .. } => exitcode::UNAVAILABLE,
            Error::Write(_) => exitcode::IOERR,
        }
    }
}

/// Resolve target groups of all target rules, in the configured order.
///
/// Any inventory error aborts the whole run, partial results are never
/// returned.
pub async fn generate<I>(config: &Config, inventory: &I) -> Result<Vec<TargetGroup>, Error>
where
    I: Inventory + ?Sized,
{
    let mut groups = Vec::new();

    for rule in &config.targets {
        let mut tags = config.base_tags.clone();
        tags.extend(rule.tags.iter().cloned());

        let servers = inventory
            .find_servers(&config.zone, &tags)
            .await
            .map_err(|err| Error::Inventory {
                service: rule.service.clone(),
                err,
            })?;
        let found = servers.len();

        let eligible = targets::filter(servers, &rule.ignore_tags);
        let built = targets::build_all(&eligible, rule, config.hostname_mode);

        debug!(
            message = "target resolved",
            service = %rule.service,
            ?tags,
            found,
            eligible = eligible.len(),
            groups = built.len()
        );

        groups.extend(built);
    }

    Ok(groups)
}

/// Generator runs one discovery cycle, from listing servers to writing the
/// discovery file.
pub struct Generator<I> {
    config: Config,
    inventory: I,
    output: PathBuf,
}

impl<I: Inventory> Generator<I> {
    pub fn new(config: Config, inventory: I, output: PathBuf) -> Self {
        Generator {
            config,
            inventory,
            output,
        }
    }

    /// Generate target groups and replace the output file with them. The
    /// output file is untouched if anything fails.
    pub async fn run_once(&self) -> Result<usize, Error> {
        let start = Instant::now();

        let groups = generate(&self.config, &self.inventory).await?;
        discovery::write(&self.output, &groups)?;

        info!(
            message = "discovery file generated",
            path = ?self.output,
            groups = groups.len(),
            targets = groups.iter().map(|group| group.targets.len()).sum::<usize>(),
            elapsed = ?start.elapsed()
        );

        Ok(groups.len())
    }
}
