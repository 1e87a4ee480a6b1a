use std::{collections::HashSet, path::Path};

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
  generator::{
    classify::{PackagePlan, ServiceClassifier},
    config::FilterPolicy,
    navigation::RestNavigator,
  },
  ui::{Colors, colors::IntoComfyColor, term_width},
  utils::{ComponentDirectory, load_index, load_navigation},
};

/// One row of the package listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
  pub package: String,
  pub family: String,
  pub services: usize,
  pub operations: usize,
}

impl From<&PackagePlan> for PackageSummary {
  fn from(plan: &PackagePlan) -> Self {
    let services: HashSet<&str> = plan.operations.iter().map(|op| op.service.as_str()).collect();
    Self {
      package: plan.package.clone(),
      family: plan.family.to_string(),
      services: services.len(),
      operations: plan.operations.len(),
    }
  }
}

pub async fn list_packages(
  metamodel: &Path,
  navigation: Option<&Path>,
  show_unreleased: bool,
  colors: &Colors,
) -> anyhow::Result<()> {
  let index = load_index(&ComponentDirectory::new(metamodel)).await?;
  let navigator = match navigation {
    Some(path) => Some(load_navigation(path).await?),
    None => None,
  };

  let plan = ServiceClassifier::new(
    &index,
    navigator.as_ref().map(|navigator| navigator as &dyn RestNavigator),
    FilterPolicy::from_show_unreleased(show_unreleased),
    false,
  )
  .classify();

  let mut summaries: Vec<PackageSummary> = plan
    .rest
    .values()
    .chain(plan.api.values())
    .map(PackageSummary::from)
    .collect();
  summaries.sort_by(|a, b| a.package.cmp(&b.package).then_with(|| a.family.cmp(&b.family)));

  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  row.add_cell(Cell::new("PACKAGE").fg(colors.label().into_comfy()));
  row.add_cell(Cell::new("FAMILY").fg(colors.label().into_comfy()));
  row.add_cell(Cell::new("SERVICES").fg(colors.label().into_comfy()));
  row.add_cell(Cell::new("OPERATIONS").fg(colors.label().into_comfy()));
  table.set_header(row);

  for summary in summaries {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(summary.package)
        .fg(colors.value().into_comfy())
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(summary.family).fg(colors.accent().into_comfy()));
    row.add_cell(
      Cell::new(summary.services)
        .fg(colors.primary().into_comfy())
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(
      Cell::new(summary.operations)
        .fg(colors.primary().into_comfy())
        .set_alignment(CellAlignment::Right),
    );
    table.add_row(row);
  }

  println!("{table}");
  if !plan.warnings.is_empty() {
    tracing::info!(skipped = plan.warnings.len(), "some services or operations were skipped");
  }

  Ok(())
}
