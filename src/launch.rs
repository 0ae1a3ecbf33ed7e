use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use argh::FromArgs;
use exitcode::ExitCode;
use sacloud_sd::config::{self, Config, Overrides};
use sacloud_sd::generate::Generator;
use sacloud_sd::sacloud::Client;
use sacloud_sd::{get_version, schedule, signal, trace};
use tracing::{error, info, warn};

const LOG_ENV: &str = "SACLOUD_SD_LOG";

#[derive(FromArgs)]
#[argh(
    description = "Generate Prometheus file based service discovery targets from Sakura Cloud servers",
    help_triggers("-h", "--help")
)]
pub struct RootCommand {
    #[argh(switch, short = 'v', description = "show version")]
    version: bool,

    #[argh(
        option,
        short = 'l',
        default = "\"info\".to_string()",
        description = "log level"
    )]
    log_level: String,

    #[argh(
        option,
        short = 'i',
        default = "0",
        description = "refresh interval in seconds, run once if it is 0"
    )]
    interval: u64,

    #[argh(
        option,
        short = 'c',
        default = "PathBuf::from(\"config.yml\")",
        description = "config file path"
    )]
    config: PathBuf,

    #[argh(
        option,
        short = 'g',
        default = "PathBuf::from(\"./generated.yml\")",
        description = "generated file path"
    )]
    generated: PathBuf,

    #[argh(option, default = "String::new()", description = "sakura cloud API token")]
    token: String,

    #[argh(option, default = "String::new()", description = "sakura cloud API secret")]
    secret: String,

    #[argh(option, default = "String::new()", description = "sakura cloud zone name")]
    zone: String,
}

impl RootCommand {
    #![allow(clippy::print_stdout)]
    fn show_version(&self) {
        println!("sacloud-sd {}", get_version());
    }

    fn load_config(&self) -> Result<Config, ExitCode> {
        let vars = config::environment();
        let mut config = config::load_from_path(&self.config).map_err(handle_config_error)?;

        config.merge(
            &Overrides {
                token: self.token.clone(),
                secret: self.secret.clone(),
                zone: self.zone.clone(),
            },
            &vars,
        );

        for warning in config.validate().map_err(handle_config_error)? {
            warn!(message = "suspicious configuration", %warning);
        }

        Ok(config)
    }

    pub fn run(&self) -> Result<(), ExitCode> {
        if self.version {
            self.show_version();
            return Ok(());
        }

        let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| trace::levels(&self.log_level));
        let color = std::io::stdout().is_terminal();
        trace::init(color, &log_level);

        let config = self.load_config()?;
        let interval = Duration::from_secs(self.interval);

        info!(
            message = "Start sacloud-sd",
            version = get_version(),
            config = ?self.config,
            generated = ?self.generated,
            zone = %config.zone,
            targets = config.targets.len(),
            ?interval
        );

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .map_err(|err| {
                error!(message = "build runtime failed", %err);
                exitcode::OSERR
            })?;

        runtime.block_on(async move {
            let client = Client::new(
                &config.api_root_url,
                config.token.clone(),
                config.secret.clone(),
            );
            let generator = Generator::new(config, client, self.generated.clone());

            schedule::run(interval, signal::shutdown(), async || {
                generator.run_once().await.map(|_| ())
            })
            .await
            .map_err(|err| {
                error!(message = "generate failed", %err);
                err.exit_code()
            })
        })
    }
}

fn handle_config_error(err: config::Error) -> ExitCode {
    error!(message = "configuration error", %err);

    exitcode::CONFIG
}
