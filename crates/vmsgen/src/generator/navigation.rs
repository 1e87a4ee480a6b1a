//! Legacy rest navigation.
//!
//! Services without `RequestMapping` metadata are routed through the answers
//! a live endpoint gives to `OPTIONS` on each service url. Those answers are
//! replayed from a recorded document rather than fetched.

use indexmap::IndexMap;
use serde::Deserialize;

use super::path::HttpMethod;

const ACTION_MARKER: &str = "~action=";
const ID_MARKER: &str = "id:";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationLink {
  pub href: String,
  pub method: String,
}

impl NavigationLink {
  fn is_action(&self) -> bool {
    self.href.contains(ACTION_MARKER)
  }

  fn has_id(&self) -> bool {
    self.href.contains(ID_MARKER)
  }
}

/// One operation reported by a service url.
///
/// `service` may differ from the service that was queried: a url prefix
/// answers for every service underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceOperation {
  pub service: String,
  pub name: String,
  #[serde(default)]
  pub links: Vec<NavigationLink>,
}

pub trait RestNavigator: Send + Sync {
  /// Base url every navigation href starts with.
  fn navigation_url(&self) -> &str;

  /// Operations reachable below `service_url`, or `None` when the url is not
  /// known to the navigator.
  fn service_operations(&self, service_url: &str) -> Option<Vec<ServiceOperation>>;
}

/// Navigation answers captured from a live endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecordedNavigation {
  pub navigation_url: String,
  #[serde(default)]
  pub services: IndexMap<String, Vec<ServiceOperation>>,
}

impl RecordedNavigation {
  pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
    let mut navigation: Self = serde_json::from_slice(bytes)?;
    let trimmed = navigation.navigation_url.trim_end_matches('/').len();
    navigation.navigation_url.truncate(trimmed);
    Ok(navigation)
  }
}

impl RestNavigator for RecordedNavigation {
  fn navigation_url(&self) -> &str {
    &self.navigation_url
  }

  fn service_operations(&self, service_url: &str) -> Option<Vec<ServiceOperation>> {
    self.services.get(service_url).cloned()
  }
}

/// Picks the preferred link among equivalent routes.
///
/// A lone link wins outright. Otherwise the first non-action link carrying an
/// `id:` segment, then the first non-action link, then the first action link
/// carrying `id:`, then the first link.
pub fn find_url(links: &[NavigationLink]) -> Option<&NavigationLink> {
  if let [only] = links {
    return Some(only);
  }
  links
    .iter()
    .find(|link| !link.is_action() && link.has_id())
    .or_else(|| links.iter().find(|link| !link.is_action()))
    .or_else(|| links.iter().find(|link| link.has_id()))
    .or_else(|| links.first())
}

/// Navigation url of a dotted service id.
pub fn service_url(service_id: &str) -> String {
  format!("/{}", service_id.replace('.', "/").replace('_', "-"))
}

/// Drops the navigation base from an absolute href. Hrefs outside the base
/// are returned unchanged.
pub fn strip_base<'u>(url: &'u str, base: &str) -> &'u str {
  url.strip_prefix(base).unwrap_or(url)
}

/// Route of a navigation link as a `/rest` path and its verb.
pub fn link_route(link: &NavigationLink, base: &str) -> Option<(String, HttpMethod)> {
  let method = link.method.parse().ok()?;
  Some((format!("/rest{}", strip_base(&link.href, base)), method))
}
