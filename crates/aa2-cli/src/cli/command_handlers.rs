use crate::cli::main_types::{Commands, ConfigCommands, ConfigSetArgs, ReportArgs};
use aa2_core::api::client::AnalyticsClient;
use aa2_core::api::session::Session;
use aa2_core::core::report::DateRange;
use aa2_core::core::services::auth_service::AuthService;
use aa2_core::core::services::config_service::ConfigService;
use aa2_core::core::services::freeform_service::FreeformService;
use aa2_core::core::services::metadata_service::{
    DEFAULT_CALCULATED_METRIC_LIMIT, DEFAULT_SEGMENT_LIMIT, MetadataService,
};
use aa2_core::core::services::report_service::ReportService;
use aa2_core::core::services::types::FreeformRequest;
use aa2_core::core::table::ResultTable;
use aa2_core::display::{ListRow, OutputFormat, TableDisplay, list_to_csv, to_json};
use aa2_core::error::{AppError, CliError};
use aa2_core::storage::credentials::{
    API_KEY_ENV, CLIENT_SECRET_ENV, RSID_ENV, get_api_key, get_rsid, has_client_secret,
};
use aa2_core::utils::logging::{log_warning, print_verbose};
use aa2_core::utils::text::parse_key_value;
use aa2_core::utils::validation::{validate_freeform_counts, validate_url};
use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Print a metadata listing in the requested format
fn print_list<T: ListRow + Serialize>(items: &[T], format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => println!("{}", TableDisplay::new().render_list(items)),
        OutputFormat::Json => println!("{}", to_json(items)?),
        OutputFormat::Csv => print!("{}", list_to_csv(items)),
    }
    Ok(())
}

fn print_table(table: &ResultTable, format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Table => println!("{}", TableDisplay::new().render_result_table(table)),
        OutputFormat::Json => println!("{}", to_json(&table.to_records())?),
        OutputFormat::Csv => print!("{}", table.to_csv()),
    }
    Ok(())
}

fn env_status(name: &str, set: bool) -> String {
    if set {
        format!("✅ Set ({})", name)
    } else {
        "❌ Not set".to_string()
    }
}

pub struct ConfigHandler {
    config_path: Option<PathBuf>,
}

impl ConfigHandler {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub async fn handle(
        &self,
        command: ConfigCommands,
        config_service: &mut ConfigService,
        profile: Option<&str>,
        verbose: bool,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => self.show(config_service, profile, verbose),
            ConfigCommands::Set(args) => self.set(config_service, profile, args, verbose),
            ConfigCommands::Validate => self.validate(config_service, profile, verbose).await,
        }
    }

    fn show(
        &self,
        config_service: &ConfigService,
        profile: Option<&str>,
        verbose: bool,
    ) -> Result<(), AppError> {
        print_verbose(verbose, "Attempting config show command using ConfigService");

        let name = config_service.profile_name(profile);
        println!("Current Configuration:");
        println!("=====================");
        println!("Default Profile: {}", config_service.profile_name(None));

        let profiles = config_service.list_profiles();
        if profiles.is_empty() {
            println!("Profiles: none configured");
        } else {
            println!("Profiles: {}", profiles.join(", "));
        }

        println!("\nEnvironment:");
        println!("  {}: {}", API_KEY_ENV, env_status(API_KEY_ENV, get_api_key().is_some()));
        println!(
            "  {}: {}",
            CLIENT_SECRET_ENV,
            env_status(CLIENT_SECRET_ENV, has_client_secret())
        );
        println!("  {}: {}", RSID_ENV, env_status(RSID_ENV, get_rsid().is_some()));

        println!("\n[{}]", name);
        match config_service.config().get_profile(&name) {
            Some(stored) => {
                let fields = stored.display_fields();
                if fields.is_empty() {
                    println!("  No values set");
                } else {
                    println!("{}", TableDisplay::new().render_key_values(&fields));
                }
            }
            None if profile.is_some() => {
                // An explicitly requested profile must exist
                config_service.get_profile(&name)?;
            }
            None => println!("  Not configured"),
        }
        Ok(())
    }

    fn set(
        &self,
        config_service: &mut ConfigService,
        profile: Option<&str>,
        args: ConfigSetArgs,
        verbose: bool,
    ) -> Result<(), AppError> {
        let name = config_service.profile_name(profile);
        let fields = args.fields();
        print_verbose(
            verbose,
            &format!(
                "Attempting config set using ConfigService - profile: {}, fields: {:?}",
                name,
                fields.iter().map(|(f, _)| *f).collect::<Vec<_>>()
            ),
        );

        if fields.is_empty() && !args.default {
            return Err(AppError::Cli(CliError::InvalidArguments(
                "No configuration values provided. Run 'aa2 config set --help' for the available fields".to_string(),
            )));
        }

        for (field, value) in &fields {
            if field.ends_with("_url") && !value.is_empty() {
                validate_url(field, value)?;
            }
            config_service.set_profile_field(&name, field, value)?;
        }
        if args.default {
            config_service.set_default_profile(&name)?;
        }

        let updated: Vec<&str> = fields.iter().map(|(f, _)| *f).collect();
        if !updated.is_empty() {
            println!("✅ Set profile '{}': {}", name, updated.join(", "));
        }
        if args.default {
            println!("✅ '{}' is now the default profile", name);
        }

        config_service.save_config(self.config_path.clone())?;
        println!("Configuration saved successfully.");
        Ok(())
    }

    async fn validate(
        &self,
        config_service: &ConfigService,
        profile: Option<&str>,
        verbose: bool,
    ) -> Result<(), AppError> {
        print_verbose(verbose, "Validating profile settings and credentials");

        let settings = config_service.resolve_settings(profile)?;
        for (field, url) in [
            ("ims_exchange_url", &settings.ims_exchange_url),
            ("discovery_url", &settings.discovery_url),
            ("analytics_api_url", &settings.analytics_api_url),
        ] {
            validate_url(field, url)?;
        }
        settings.read_private_key()?;
        println!("✅ Profile '{}' is complete", settings.profile);

        let client = AnalyticsClient::new()?;
        match AuthService::new(&client, &settings).authenticate().await {
            Ok(session) => {
                println!("\nAuthentication Status:");
                println!("=====================");
                println!("✅ Token exchange succeeded");
                println!("  Global company id: {}", session.company_id());
                println!("  Report suite: {}", session.rsid());
                println!("  API base URL: {}", session.base_url());
                Ok(())
            }
            Err(e) => {
                println!("\n❌ Failed to authenticate: {}", e);
                println!("\nPossible causes:");
                println!("  - Client secret or API key is wrong");
                println!("  - The private key does not match the uploaded certificate");
                println!("  - The technical account lacks the requested metascopes");
                Err(e)
            }
        }
    }
}

#[derive(Default)]
pub struct MetadataHandler;

impl MetadataHandler {
    pub fn new() -> Self {
        Self
    }

    fn format_of(command: &Commands) -> Result<OutputFormat, AppError> {
        let format = match command {
            Commands::Suites { format, .. } | Commands::MetricNames { format, .. } => format,
            Commands::Dimensions(args) | Commands::Metrics(args) => &args.format,
            Commands::CalculatedMetrics(args) | Commands::Segments(args) => &args.format,
            Commands::Config { .. } | Commands::Report(_) => return Ok(OutputFormat::Table),
        };
        Ok(format.parse::<OutputFormat>()?)
    }

    /// Argument checks that do not need a session
    pub fn check(&self, command: &Commands) -> Result<(), AppError> {
        Self::format_of(command)?;
        Ok(())
    }

    pub async fn handle(
        &self,
        command: Commands,
        client: &AnalyticsClient,
        session: &Session,
        verbose: bool,
    ) -> Result<(), AppError> {
        let format = Self::format_of(&command)?;
        let service = MetadataService::new(client, session);

        match command {
            Commands::Suites { limit, .. } => {
                print_verbose(verbose, &format!("Listing up to {} report suites", limit));
                print_list(&service.list_report_suites(limit).await?, format)
            }
            Commands::Dimensions(args) => {
                let dimensions = service.list_dimensions(&args.terms, args.exact).await?;
                print_verbose(verbose, &format!("{} dimensions matched", dimensions.len()));
                print_list(&dimensions, format)
            }
            Commands::Metrics(args) => {
                let metrics = service.list_metrics(&args.terms, args.exact).await?;
                print_verbose(verbose, &format!("{} metrics matched", metrics.len()));
                print_list(&metrics, format)
            }
            Commands::CalculatedMetrics(args) => {
                let limit = args.limit.unwrap_or(DEFAULT_CALCULATED_METRIC_LIMIT);
                let items = service
                    .list_calculated_metrics(args.search_term(), limit)
                    .await?;
                print_list(&items, format)
            }
            Commands::Segments(args) => {
                let limit = args.limit.unwrap_or(DEFAULT_SEGMENT_LIMIT);
                let items = service.list_segments(args.search_term(), limit).await?;
                print_list(&items, format)
            }
            Commands::MetricNames { ids, .. } => {
                let names = service.resolve_metric_names(&ids).await?;
                if names.len() < ids.len() {
                    log_warning("Some metric ids were not found in the report suite");
                }
                print_list(&names, format)
            }
            Commands::Config { .. } | Commands::Report(_) => Err(AppError::Cli(
                CliError::InvalidArguments("Not a metadata command".to_string()),
            )),
        }
    }
}

#[derive(Default)]
pub struct ReportHandler;

impl ReportHandler {
    pub fn new() -> Self {
        Self
    }

    /// Turn arguments into a validated request without touching the network
    pub fn build_request(&self, args: &ReportArgs) -> Result<FreeformRequest, AppError> {
        args.format.parse::<OutputFormat>()?;
        validate_freeform_counts(
            args.dimensions.len(),
            args.metrics.len(),
            args.segments.len(),
        )?;

        let mut search = HashMap::new();
        for clause in &args.search {
            let (dimension, clause) = parse_key_value(clause).ok_or_else(|| {
                CliError::InvalidArguments(format!(
                    "Invalid search '{}', expected dimension=clause",
                    clause
                ))
            })?;
            search.insert(dimension, clause);
        }

        let date_range = DateRange::parse(
            args.start.as_deref(),
            args.end.as_deref(),
            Local::now().date_naive(),
        )?;

        Ok(
            FreeformRequest::new(args.dimensions.clone(), args.metrics.clone())
                .with_segments(args.segments.clone())
                .with_search(search)
                .with_date_range(date_range)
                .with_limit(args.limit),
        )
    }

    pub async fn handle(
        &self,
        request: &FreeformRequest,
        format: &str,
        client: &AnalyticsClient,
        session: &Session,
        verbose: bool,
    ) -> Result<(), AppError> {
        let format = format.parse::<OutputFormat>()?;
        print_verbose(
            verbose,
            &format!(
                "Running report on {} for {}",
                request.dimensions.join(" > "),
                request.date_range.to_api_string()
            ),
        );

        let service = FreeformService::new(ReportService::new(client, session));
        let table = service.run(request).await?;
        print_table(&table, format)
    }
}
