use serde::{Deserialize, Serialize};

/// Placeholder in a target URL that is replaced by the identifier.
pub const URN_PLACEHOLDER: &str = "{pi.urn}";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub url: String,
}

/// Body of `POST /urns`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UrnCreation<'a> {
    pub urn: &'a str,
    pub urls: Vec<UrlEntry>,
}

/// Success body of `POST /urns`; unknown fields are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct UrnCreated {
    pub urn: String,
}

/// Error body the service returns for client errors.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceError {
    pub code: String,
    #[serde(default)]
    pub developer_message: String,
}

/// Expands [`URN_PLACEHOLDER`] in every target URL.
pub fn target_list(urn: &str, target_urls: &[String]) -> Vec<UrlEntry> {
    target_urls
        .iter()
        .map(|url| UrlEntry {
            url: url.replace(URN_PLACEHOLDER, urn),
        })
        .collect()
}
