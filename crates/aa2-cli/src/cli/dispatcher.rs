use crate::cli::command_handlers::{ConfigHandler, MetadataHandler, ReportHandler};
use crate::cli::main_types::Commands;
use aa2_core::api::client::AnalyticsClient;
use aa2_core::api::session::Session;
use aa2_core::core::services::auth_service::AuthService;
use aa2_core::core::services::config_service::ConfigService;
use aa2_core::error::AppError;
use aa2_core::storage::config::Config;
use aa2_core::utils::logging::print_verbose;
use std::path::PathBuf;

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    profile: Option<String>,
    verbose: bool,
}

impl Dispatcher {
    fn log_verbose(&self, msg: &str) {
        print_verbose(self.verbose, msg);
    }

    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        profile: Option<String>,
        verbose: bool,
    ) -> Self {
        Self {
            config,
            config_path,
            profile,
            verbose,
        }
    }

    fn create_config_service(&self) -> ConfigService {
        ConfigService::new(self.config.clone())
    }

    /// Resolve settings, then run the token exchange and company discovery
    async fn connect(&self) -> Result<(AnalyticsClient, Session), AppError> {
        let settings = self
            .create_config_service()
            .resolve_settings(self.profile.as_deref())?;
        self.log_verbose(&format!(
            "Using profile '{}' with report suite '{}'",
            settings.profile, settings.rsid
        ));

        let client = AnalyticsClient::new()?;
        let session = AuthService::new(&client, &settings).authenticate().await?;
        tracing::debug!(company_id = session.company_id(), "authenticated");
        self.log_verbose(&format!("Authenticated, base URL {}", session.base_url()));
        Ok((client, session))
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Config { command } => {
                let handler = ConfigHandler::new(self.config_path.clone());
                let mut config_service = self.create_config_service();
                handler
                    .handle(
                        command,
                        &mut config_service,
                        self.profile.as_deref(),
                        self.verbose,
                    )
                    .await
            }
            Commands::Report(args) => {
                let handler = ReportHandler::new();
                // Arguments are checked before authenticating
                let request = handler.build_request(&args)?;
                let (client, session) = self.connect().await?;
                handler
                    .handle(&request, &args.format, &client, &session, self.verbose)
                    .await
            }
            command => {
                let handler = MetadataHandler::new();
                handler.check(&command)?;
                let (client, session) = self.connect().await?;
                handler
                    .handle(command, &client, &session, self.verbose)
                    .await
            }
        }
    }
}
