//! Service classification.
//!
//! Decides which family each service is synthesised into, resolves the route
//! of every operation and groups the result by output package. Nothing here
//! builds schemas; the plan is plain data handed to the package tasks.

use indexmap::IndexMap;
use vmsgen_metamodel::{OperationInfo, ServiceInfo};

use super::{
  config::{Family, FilterPolicy},
  deprecation::ReplacementMap,
  index::MetamodelIndex,
  metrics::{GenerationWarning, SkipReason},
  navigation::{RestNavigator, find_url, link_route, service_url},
  path::HttpMethod,
};

/// Services never emitted under `/rest`.
pub const REST_BLACKLIST: &[&str] = &[
  "com.vmware.vcenter.vm.compute.policies",
  "com.vmware.vcenter.compute.policies.tag_usage",
  "com.vmware.vcenter.compute.policies.VM",
  "com.vmware.vcenter.compute.policies.capabilities",
  "com.vmware.vcenter.compute.policies",
];

const REQUEST_MAPPING: &str = "RequestMapping";
const FORM_URLENCODED: &str = "FORM_URLENCODED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
  Api,
  Rest,
  Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
  pub method: HttpMethod,
  pub url: String,
  pub form_encoded: bool,
}

/// Route declared by verb metadata (`POST`, `GET`, ...) carrying a `path`.
pub fn api_route(operation: &OperationInfo) -> Option<Route> {
  operation.metadata.iter().find_map(|(key, elements)| {
    let method: HttpMethod = key.parse().ok()?;
    let path = elements.string("path")?;
    let params = elements.list("params");
    let url = if params.is_empty() {
      format!("/api{path}")
    } else {
      format!("/api{path}?{}", params.join("&"))
    };
    Some(Route {
      method,
      url,
      form_encoded: elements.string("consumes") == Some(FORM_URLENCODED),
    })
  })
}

/// Route declared by `RequestMapping` metadata.
pub fn rest_route(operation: &OperationInfo) -> Option<Route> {
  let mapping = operation.metadata.get(REQUEST_MAPPING)?;
  let value = mapping.string("value")?;
  let method = mapping.string("method")?.parse().ok()?;
  let url = match mapping.string("params") {
    Some(params) => format!("/rest{value}?{params}"),
    None => format!("/rest{value}"),
  };
  Some(Route {
    method,
    url,
    form_encoded: false,
  })
}

pub fn service_kind(service: &ServiceInfo) -> ServiceKind {
  let api = service.operations.values().any(|op| api_route(op).is_some());
  let rest = service.operations.values().any(|op| op.metadata.contains(REQUEST_MAPPING));
  match (api, rest) {
    (true, true) => ServiceKind::Mixed,
    (true, false) => ServiceKind::Api,
    (false, _) => ServiceKind::Rest,
  }
}

/// First path segment after `/api`.
pub fn api_package(url: &str) -> Option<&str> {
  let path = url.strip_prefix("/api").unwrap_or(url);
  let path = path.split('?').next().unwrap_or(path);
  path.split('/').nth(1).filter(|segment| !segment.is_empty())
}

/// Third dotted segment of a service id (`com.vmware.<package>...`).
pub fn rest_package(service_id: &str) -> Option<&str> {
  service_id.split('.').nth(2)
}

fn all_request_mapped(service: &ServiceInfo) -> bool {
  service.operations.values().all(|op| op.metadata.contains(REQUEST_MAPPING))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
  pub service: String,
  pub operation: String,
  pub route: Route,
  pub deprecated: bool,
}

/// Operations of one family destined for one output package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePlan {
  pub family: Family,
  pub package: String,
  pub operations: Vec<PlannedOperation>,
}

#[derive(Debug, Default)]
pub struct ServicePlan {
  pub rest: IndexMap<String, PackagePlan>,
  pub api: IndexMap<String, PackagePlan>,
  pub replacements: ReplacementMap,
  pub warnings: Vec<GenerationWarning>,
}

impl ServicePlan {
  fn push(&mut self, family: Family, package: &str, operation: PlannedOperation) {
    let packages = match family {
      Family::Rest => &mut self.rest,
      Family::Api => &mut self.api,
    };
    packages
      .entry(package.to_string())
      .or_insert_with(|| PackagePlan {
        family,
        package: package.to_string(),
        operations: Vec::new(),
      })
      .operations
      .push(operation);
  }

  fn skip_service(&mut self, service: &str, family: Family, reason: SkipReason) {
    self.warnings.push(GenerationWarning::SkippedService {
      service: service.to_string(),
      family,
      reason,
    });
  }

  fn skip_operation(&mut self, service: &str, operation: &str, family: Family, reason: SkipReason) {
    self.warnings.push(GenerationWarning::SkippedOperation {
      service: service.to_string(),
      operation: operation.to_string(),
      family,
      reason,
    });
  }

  /// Every package plan, rest first, each family in package order.
  pub fn into_packages(self) -> impl Iterator<Item = PackagePlan> {
    self.rest.into_values().chain(self.api.into_values())
  }

  pub fn operation_count(&self) -> usize {
    self
      .rest
      .values()
      .chain(self.api.values())
      .map(|plan| plan.operations.len())
      .sum()
  }
}

pub struct ServiceClassifier<'a> {
  index: &'a MetamodelIndex,
  navigator: Option<&'a dyn RestNavigator>,
  filter: FilterPolicy,
  deprecate_rest: bool,
}

impl<'a> ServiceClassifier<'a> {
  pub fn new(
    index: &'a MetamodelIndex,
    navigator: Option<&'a dyn RestNavigator>,
    filter: FilterPolicy,
    deprecate_rest: bool,
  ) -> Self {
    Self {
      index,
      navigator,
      filter,
      deprecate_rest,
    }
  }

  pub fn classify(&self) -> ServicePlan {
    let mut plan = ServicePlan::default();
    for (id, service) in self.index.services() {
      let kind = service_kind(service);
      if self.filter.is_filtered(&service.metadata) {
        let family = if kind == ServiceKind::Rest { Family::Rest } else { Family::Api };
        plan.skip_service(id, family, SkipReason::Filtered);
        continue;
      }
      match kind {
        ServiceKind::Api => self.plan_api(id, service, false, &mut plan),
        ServiceKind::Mixed => {
          self.plan_api(id, service, self.deprecate_rest, &mut plan);
          if self.deprecate_rest {
            self.plan_rest(id, service, true, &mut plan);
          }
        }
        ServiceKind::Rest => self.plan_rest(id, service, false, &mut plan),
      }
    }
    plan.rest.sort_keys();
    plan.api.sort_keys();
    tracing::debug!(
      rest_packages = plan.rest.len(),
      api_packages = plan.api.len(),
      operations = plan.operation_count(),
      "classified services"
    );
    plan
  }

  /// With `record_replacements`, every api route is remembered as the
  /// successor of the rest operation of the same name.
  fn plan_api(&self, id: &str, service: &ServiceInfo, record_replacements: bool, plan: &mut ServicePlan) {
    for (name, operation) in &service.operations {
      if self.filter.is_filtered(&operation.metadata) {
        plan.skip_operation(id, name, Family::Api, SkipReason::Filtered);
        continue;
      }
      let Some(route) = api_route(operation) else {
        plan.skip_operation(id, name, Family::Api, SkipReason::NoRoute);
        continue;
      };
      let Some(package) = api_package(&route.url).map(ToString::to_string) else {
        plan.skip_operation(id, name, Family::Api, SkipReason::NoRoute);
        continue;
      };
      if record_replacements
        && let Some(path) = route.url.strip_prefix("/api")
      {
        let path = path.split('?').next().unwrap_or(path);
        plan.replacements.record(id, name, route.method, path);
      }
      plan.push(
        Family::Api,
        &package,
        PlannedOperation {
          service: id.to_string(),
          operation: name.clone(),
          route,
          deprecated: false,
        },
      );
    }
  }

  fn plan_rest(&self, id: &str, service: &ServiceInfo, deprecated: bool, plan: &mut ServicePlan) {
    if REST_BLACKLIST.contains(&id) {
      plan.skip_service(id, Family::Rest, SkipReason::Blacklisted);
      return;
    }
    let Some(package) = rest_package(id) else {
      plan.skip_service(id, Family::Rest, SkipReason::NoRoute);
      return;
    };

    if all_request_mapped(service) {
      for (name, operation) in &service.operations {
        if self.filter.is_filtered(&operation.metadata) {
          plan.skip_operation(id, name, Family::Rest, SkipReason::Filtered);
          continue;
        }
        let Some(route) = rest_route(operation) else {
          plan.skip_operation(id, name, Family::Rest, SkipReason::NoRoute);
          continue;
        };
        plan.push(
          Family::Rest,
          package,
          PlannedOperation {
            service: id.to_string(),
            operation: name.clone(),
            route,
            deprecated,
          },
        );
      }
      return;
    }

    self.plan_navigated(id, package, deprecated, plan);
  }

  /// Routes a service through the recorded navigation answers. The answer for
  /// a url covers every service beneath it, so each operation is re-resolved
  /// against the service it names.
  fn plan_navigated(&self, id: &str, package: &str, deprecated: bool, plan: &mut ServicePlan) {
    let Some(navigator) = self.navigator else {
      plan.skip_service(id, Family::Rest, SkipReason::NavigationUnavailable);
      return;
    };
    let Some(operations) = navigator.service_operations(&service_url(id)) else {
      plan.skip_service(id, Family::Rest, SkipReason::NavigationUnavailable);
      return;
    };

    for navigated in operations {
      let Some(service) = self.index.service(&navigated.service) else {
        plan.skip_operation(&navigated.service, &navigated.name, Family::Rest, SkipReason::MissingServiceInfo);
        continue;
      };
      let Some(operation) = service.operations.get(&navigated.name) else {
        plan.skip_operation(&navigated.service, &navigated.name, Family::Rest, SkipReason::MissingOperation);
        continue;
      };
      if self.filter.is_filtered(&operation.metadata) {
        plan.skip_operation(&navigated.service, &navigated.name, Family::Rest, SkipReason::Filtered);
        continue;
      }
      let Some(link) = find_url(&navigated.links) else {
        plan.skip_operation(&navigated.service, &navigated.name, Family::Rest, SkipReason::NoRoute);
        continue;
      };
      let Some((url, method)) = link_route(link, navigator.navigation_url()) else {
        plan.skip_operation(&navigated.service, &navigated.name, Family::Rest, SkipReason::UnsupportedMethod);
        continue;
      };
      plan.push(
        Family::Rest,
        package,
        PlannedOperation {
          service: navigated.service.clone(),
          operation: navigated.name.clone(),
          route: Route {
            method,
            url,
            form_encoded: false,
          },
          deprecated,
        },
      );
    }
  }
}
