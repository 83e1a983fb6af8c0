use core::time::Duration;

use reqwest::{
    Method, Proxy, Url,
    blocking::{Client, Request},
    header::{ACCEPT, CONTENT_TYPE},
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, Expectation, Registrar, RegistrationOutcome, Result, UrnCreation, target_list,
};

/// Default timeout of a single resolver request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound proxy and the hosts that bypass it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub url: String,
    pub whitelist: Vec<String>,
}

impl ProxyConfig {
    /// Whether requests to `url` go out directly.
    pub fn is_whitelisted(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| {
            self.whitelist
                .iter()
                .any(|entry| entry.trim().eq_ignore_ascii_case(host))
        })
    }
}

/// Connection settings of the resolver service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub namespace: String,
    pub user: String,
    pub password: String,
    pub proxy: Option<ProxyConfig>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        base_url: impl Into<String>,
        namespace: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            namespace: namespace.into(),
            user: user.into(),
            password: password.into(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Blocking [`Registrar`] speaking the resolver's JSON REST API.
///
/// Every request carries basic authentication and `Accept:
/// application/json`.
pub struct RestRegistrar {
    http: Client,
    base: Url,
    namespace: String,
    user: String,
    password: String,
}

impl RestRegistrar {
    /// Builds a client for the service at `config.base_url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] unless the base URL is a valid `https` URL
    /// - [`Error::Transport`] if the proxy or HTTP client cannot be built
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.trim())
            .map_err(|e| Error::configuration(format!("Bad URL '{}': {e}", config.base_url)))?;
        if base.scheme() != "https" {
            return Err(Error::configuration("Bad URL - only https is permitted"));
        }
        if base.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "Bad URL '{}' - cannot be a base",
                config.base_url
            )));
        }

        let mut builder = Client::builder().timeout(config.timeout);
        match &config.proxy {
            Some(proxy) if !proxy.is_whitelisted(&base) => {
                builder = builder.proxy(Proxy::all(&proxy.url)?);
            }
            Some(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(url = %base, "url was on proxy whitelist, no proxy used");
                builder = builder.no_proxy();
            }
            None => {}
        }

        Ok(Self {
            http: builder.build()?,
            base,
            namespace: config.namespace.trim().to_owned(),
            user: config.user.trim().to_owned(),
            password: config.password.trim().to_owned(),
        })
    }

    /// The namespace this client registers identifiers under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request<B: serde::Serialize>(&self, method: Method, url: Url, body: &B) -> Result<Request> {
        let body = serde_json::to_vec(body)?;
        let request = self
            .http
            .request(method, url)
            .basic_auth(&self.user, Some(&self.password))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .build()?;
        Ok(request)
    }

    pub(crate) fn create_request(&self, urn: &str, target_urls: &[String]) -> Result<Request> {
        let body = UrnCreation {
            urn,
            urls: target_list(urn, target_urls),
        };
        self.request(Method::POST, self.endpoint(&["urns"]), &body)
    }

    pub(crate) fn replace_request(&self, urn: &str, target_urls: &[String]) -> Result<Request> {
        let url = self.endpoint(&["urns", "urn", urn, "my-urls"]);
        self.request(Method::PATCH, url, &target_list(urn, target_urls))
    }

    fn execute(&self, request: Request) -> Result<(u16, Option<String>)> {
        let response = self.http.execute(request)?;
        let status = response.status().as_u16();
        let text = response.text()?;
        Ok((status, Some(text).filter(|t| !t.is_empty())))
    }
}

impl Registrar for RestRegistrar {
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, target_urls)))]
    fn register(&self, urn: &str, target_urls: &[String]) -> Result<String> {
        let (status, body) = self.execute(self.create_request(urn, target_urls)?)?;
        RegistrationOutcome::interpret(Expectation::Created, status, body.as_deref())?
            .into_created()
    }

    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, target_urls)))]
    fn replace_targets(&self, urn: &str, target_urls: &[String]) -> Result<bool> {
        let (status, body) = self.execute(self.replace_request(urn, target_urls)?)?;
        RegistrationOutcome::interpret(Expectation::Updated, status, body.as_deref())?
            .into_updated()
    }
}
