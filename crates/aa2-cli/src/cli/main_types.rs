use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "aa2")]
#[command(about = "Command line client for the Analytics 2.0 reporting API")]
#[command(version)]
#[command(after_help = "Examples:
  aa2 config set --org-id ORG@AdobeOrg --rsid mysuite   # Configure the default profile
  aa2 config validate                                   # Check settings and authenticate
  aa2 suites                                            # List report suites
  aa2 dimensions page                                   # Dimensions whose name contains 'page'
  aa2 metrics --exact Visits                            # Metric named exactly 'Visits'
  aa2 report -d variables/page -m metrics/visits        # One-dimension report
  aa2 report -d variables/page -d variables/browser -m metrics/visits --format csv

Environment Variables:
  AA2_API_KEY        API key (client id), overrides the profile
  AA2_CLIENT_SECRET  Client secret, overrides the profile
  AA2_RSID           Report suite id, overrides the profile
  AA2_LOG            Log filter, e.g. 'aa2_core=debug'")]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profile name to use (default: the configured default profile)
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Custom configuration directory path
    #[arg(long, global = true)]
    pub config_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configuration management (show, set, validate)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List report suites
    Suites {
        /// Maximum number of suites to return
        #[arg(long, default_value = "10")]
        limit: u32,
        /// Output format: table, json, or csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// List dimensions of the report suite
    Dimensions(NameFilterArgs),
    /// List metrics of the report suite
    Metrics(NameFilterArgs),
    /// Search calculated metrics by name
    CalculatedMetrics(SearchArgs),
    /// Search segments by name
    Segments(SearchArgs),
    /// Look up the names of metric ids
    MetricNames {
        /// Metric ids, e.g. metrics/visits (comma-separated or repeated)
        #[arg(required = true, value_delimiter = ',')]
        ids: Vec<String>,
        /// Output format: table, json, or csv
        #[arg(short, long, default_value = "table")]
        format: String,
    },
    /// Run a freeform report over one or two dimensions
    Report(ReportArgs),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the configuration of a profile
    Show,
    /// Set configuration values for a profile
    #[command(after_help = "Examples:
  aa2 config set --org-id ORG@AdobeOrg --technical-account-id TECH@techacct.adobe.com
  aa2 config set --profile prod --rsid prodsuite --default
  aa2 config set --metascopes ent_analytics_bulk_ingest_sdk,ent_reactor_sdk")]
    Set(ConfigSetArgs),
    /// Validate the profile and authenticate against the API
    Validate,
}

#[derive(Args, Debug, Default)]
pub struct ConfigSetArgs {
    #[arg(long)]
    pub org_id: Option<String>,
    #[arg(long)]
    pub technical_account_id: Option<String>,
    /// Path to the PEM private key of the technical account
    #[arg(long)]
    pub private_key_path: Option<String>,
    /// Identity host, e.g. ims-na1.adobelogin.com
    #[arg(long)]
    pub ims_host: Option<String>,
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub client_secret: Option<String>,
    #[arg(long)]
    pub ims_exchange_url: Option<String>,
    #[arg(long)]
    pub discovery_url: Option<String>,
    #[arg(long)]
    pub analytics_api_url: Option<String>,
    /// Report suite id
    #[arg(long)]
    pub rsid: Option<String>,
    /// Comma-separated metascopes
    #[arg(long)]
    pub metascopes: Option<String>,
    /// Make this profile the default
    #[arg(long)]
    pub default: bool,
}

impl ConfigSetArgs {
    /// Provided values as (field name, value) pairs
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("org_id", &self.org_id),
            ("technical_account_id", &self.technical_account_id),
            ("private_key_path", &self.private_key_path),
            ("ims_host", &self.ims_host),
            ("api_key", &self.api_key),
            ("client_secret", &self.client_secret),
            ("ims_exchange_url", &self.ims_exchange_url),
            ("discovery_url", &self.discovery_url),
            ("analytics_api_url", &self.analytics_api_url),
            ("rsid", &self.rsid),
            ("metascopes", &self.metascopes),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

/// Local name filtering for dimension and metric listings
#[derive(Args, Debug)]
pub struct NameFilterArgs {
    /// Name search terms; an item matches if any term matches
    pub terms: Vec<String>,
    /// Match whole names (case-insensitive) instead of substrings
    #[arg(long)]
    pub exact: bool,
    /// Output format: table, json, or csv
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Server-side name search for calculated metrics and segments
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Name search term
    #[arg(long, conflicts_with = "all")]
    pub name: Option<String>,
    /// List everything instead of searching by name
    #[arg(long)]
    pub all: bool,
    /// Maximum number of results to return
    #[arg(long)]
    pub limit: Option<u32>,
    /// Output format: table, json, or csv
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

impl SearchArgs {
    /// `--all` searches with an empty term
    pub fn search_term(&self) -> Option<&str> {
        if self.all {
            Some("")
        } else {
            self.name.as_deref()
        }
    }
}

#[derive(Args, Debug)]
#[command(after_help = "Examples:
  aa2 report -d variables/page -m metrics/visits -m metrics/orders
  aa2 report -d variables/page -d variables/browser -m metrics/visits --limit 10
  aa2 report -d variables/page -m metrics/visits --start 2024-01-01 --end 2024-01-31
  aa2 report -d variables/page -m metrics/visits --search \"variables/page=CONTAINS 'home'\"")]
pub struct ReportArgs {
    /// Dimension id (at most two; the second breaks down the first)
    #[arg(short, long = "dimension", required = true)]
    pub dimensions: Vec<String>,

    /// Metric id (repeatable)
    #[arg(short, long = "metric")]
    pub metrics: Vec<String>,

    /// Segment id (at most one)
    #[arg(short, long = "segment")]
    pub segments: Vec<String>,

    /// Search clause per dimension in dimension=clause format (repeatable)
    #[arg(long)]
    pub search: Vec<String>,

    /// First day, YYYY-MM-DD (default: yesterday)
    #[arg(long, help_heading = "Date Range")]
    pub start: Option<String>,

    /// Last day, YYYY-MM-DD (default: today)
    #[arg(long, help_heading = "Date Range")]
    pub end: Option<String>,

    /// Rows per report request
    #[arg(long, default_value = "50", help_heading = "Output Options")]
    pub limit: u32,

    /// Output format: table, json, or csv
    #[arg(short, long, default_value = "table", help_heading = "Output Options")]
    pub format: String,
}
