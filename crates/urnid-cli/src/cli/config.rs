use std::path::PathBuf;

use anyhow::bail;
use clap::{ArgAction, Parser, builder::BoolishValueParser};
use urnid::{
    AssignConfig, ClientConfig, DEFAULT_TIMEOUT, GenerationMethod, GeneratorConfig, ProxyConfig,
    WORK_ID_SLOT, WalkConfig,
};

/// Runtime configuration for the `urnid` binary.
///
/// Every option can also be supplied through the environment variable named
/// next to it, or through a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "urnid",
    version,
    about = "Assigns and registers URN:NBN identifiers for the elements of a structured document"
)]
pub struct CliArgs {
    /// JSON document whose structure elements receive identifiers.
    pub input: PathBuf,

    /// Where to write the updated document. Defaults to overwriting `input`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base URL of the resolver REST API. Must use https.
    ///
    /// Environment variable: `API_URI`
    #[arg(long, env = "API_URI", default_value_t = String::from("https://api.nbn-resolving.org/v2/"))]
    pub api_uri: String,

    /// Namespace prefix of every identifier created by this run.
    ///
    /// Environment variable: `NAMESPACE`
    #[arg(long, env = "NAMESPACE", default_value_t = String::from("urn:nbn:de:gbv:NN"))]
    pub namespace: String,

    /// Environment variable: `API_USER`
    #[arg(long, env = "API_USER")]
    pub api_user: Option<String>,

    /// Environment variable: `API_PASSWORD`
    #[arg(long, env = "API_PASSWORD", hide_env_values = true)]
    pub api_password: Option<String>,

    /// Metadata slot of the structural layer.
    ///
    /// Environment variable: `TYPE_NAME_METS`
    #[arg(long, env = "TYPE_NAME_METS", default_value_t = String::from("_urn"))]
    pub type_name_mets: String,

    /// Metadata slot of the descriptive layer.
    ///
    /// Environment variable: `TYPE_NAME_MODS`
    #[arg(long, env = "TYPE_NAME_MODS", default_value_t = String::from("URN"))]
    pub type_name_mods: String,

    /// Also write new identifiers into the descriptive layer slot.
    ///
    /// Environment variable: `CREATE_MODS_URNS`
    #[arg(long, env = "CREATE_MODS_URNS", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub create_mods_urns: bool,

    /// Assign an identifier to the topmost element.
    ///
    /// Environment variable: `WORK`
    #[arg(long, env = "WORK", default_value_t = true, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub work: bool,

    /// Assign an identifier to the anchor element.
    ///
    /// Environment variable: `ANCHOR`
    #[arg(long, env = "ANCHOR", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub anchor: bool,

    /// Append the URN:NBN check digit.
    ///
    /// Environment variable: `CHECKSUM`
    #[arg(long, env = "CHECKSUM", default_value_t = false, action = ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub checksum: bool,

    /// `increment` or `timestamp`.
    ///
    /// Environment variable: `GENERATION_METHOD`
    #[arg(long, env = "GENERATION_METHOD", default_value_t = String::from("increment"))]
    pub generation_method: String,

    /// Comma separated structure types that receive identifiers anywhere in
    /// the tree.
    ///
    /// Environment variable: `ALLOWED_TYPES`
    #[arg(long, env = "ALLOWED_TYPES", value_delimiter = ',')]
    pub allowed_types: Vec<String>,

    /// Target URL template; `{pi.urn}` is replaced by the identifier.
    ///
    /// Environment variable: `PUBLICATION_URL`
    #[arg(long, env = "PUBLICATION_URL", default_value_t = String::from("https://viewer.example.org/viewer/resolver?urn={pi.urn}"))]
    pub publication_url: String,

    /// Environment variable: `INFIX`
    #[arg(long, env = "INFIX")]
    pub infix: Option<String>,

    /// SQLite file holding the identity table. Shared by concurrent runs.
    ///
    /// Environment variable: `DATABASE`
    #[arg(long, env = "DATABASE", default_value = "urn.sqlite")]
    pub database: PathBuf,

    /// Environment variable: `PROXY_URL`
    #[arg(long, env = "PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Comma separated hosts reached without the proxy.
    ///
    /// Environment variable: `PROXY_WHITELIST`
    #[arg(long, env = "PROXY_WHITELIST", value_delimiter = ',')]
    pub proxy_whitelist: Vec<String>,

    /// Workflow process this run belongs to. Only used in log output.
    ///
    /// Environment variable: `PROCESS_ID`
    #[arg(long, env = "PROCESS_ID", default_value_t = -1, allow_negative_numbers = true)]
    pub process_id: i64,

    /// Timeout of a single resolver request, in seconds.
    ///
    /// Environment variable: `API_TIMEOUT_SECS`
    #[arg(long, env = "API_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub api_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub database: PathBuf,
    pub client: ClientConfig,
    pub generator: GeneratorConfig,
    pub assign: AssignConfig,
    pub walk: WalkConfig,
}

impl TryFrom<CliArgs> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !args.api_uri.trim().to_ascii_lowercase().starts_with("https://") {
            bail!("API_URI must use https, got '{}'", args.api_uri);
        }

        let namespace = args.namespace.trim();
        if namespace.is_empty() {
            bail!("NAMESPACE must not be empty");
        }

        let (Some(user), Some(password)) = (non_blank(args.api_user), non_blank(args.api_password))
        else {
            bail!("API_USER and API_PASSWORD must both be set");
        };

        if args.api_timeout_secs == 0 {
            bail!("API_TIMEOUT_SECS must be greater than 0");
        }

        let method: GenerationMethod = args.generation_method.parse()?;

        let allowed_types: Vec<String> = args
            .allowed_types
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        if !args.work && !args.anchor && allowed_types.is_empty() {
            bail!("nothing to do: WORK and ANCHOR are disabled and ALLOWED_TYPES is empty");
        }

        let mut client = ClientConfig::new(args.api_uri.trim(), namespace, user, password);
        client.timeout = core::time::Duration::from_secs(args.api_timeout_secs);
        client.proxy = non_blank(args.proxy_url).map(|url| ProxyConfig {
            url,
            whitelist: args
                .proxy_whitelist
                .iter()
                .map(|h| h.trim().to_owned())
                .filter(|h| !h.is_empty())
                .collect(),
        });

        let generator = GeneratorConfig::new(method)
            .with_checksum(args.checksum)
            .with_process_id(args.process_id);

        let assign = AssignConfig::new(namespace)
            .with_infix(args.infix)
            .with_slots(args.type_name_mets, args.type_name_mods)
            .with_write_secondary(args.create_mods_urns)
            .with_target_urls(vec![args.publication_url]);

        let walk = WalkConfig {
            allowed_types,
            include_work: args.work,
            include_anchor: args.anchor,
            work_id_slot: WORK_ID_SLOT.to_owned(),
        };

        Ok(Self {
            output: args.output.unwrap_or_else(|| args.input.clone()),
            input: args.input,
            database: args.database,
            client,
            generator,
            assign,
            walk,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
