use crate::config::RenderSettings;
use crate::graph::GraphStore;
use crate::reports::generator::{Highlight, QueryReport};
use crate::types::NodeId;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Trait for report formatters
pub trait ReportFormatter {
    fn format(&self, report: &QueryReport, store: &GraphStore) -> Result<String>;
}

fn label(store: &GraphStore, id: NodeId) -> String {
    match store.name(id) {
        Some(name) => format!("{} ({})", name, id),
        None => format!("#{}", id),
    }
}

/// Graphviz DOT formatter, the input of the layout renderer
pub struct DotFormatter {
    settings: RenderSettings,
}

impl DotFormatter {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    fn style(&self, highlight: Highlight) -> String {
        let weight = if self.settings.bold_highlights {
            "font-weight: bold"
        } else {
            ""
        };

        let fill = match highlight {
            Highlight::Primary => Some(&self.settings.primary_fill),
            Highlight::Secondary => Some(&self.settings.secondary_fill),
            Highlight::Emphasis => None,
        };

        match (fill, weight.is_empty()) {
            (Some(fill), true) => format!("fill: {}", fill),
            (Some(fill), false) => format!("fill: {}; {}", fill, weight),
            (None, _) => weight.to_string(),
        }
    }

    fn escape(text: &str) -> String {
        text.replace('\\', "\\\\").replace('"', "\\\"")
    }
}

impl ReportFormatter for DotFormatter {
    fn format(&self, report: &QueryReport, store: &GraphStore) -> Result<String> {
        let mut out = String::from("digraph {\n");

        for id in report.people(store) {
            let name = Self::escape(store.name(id).unwrap_or_default());
            let style = report
                .highlight(id)
                .map(|highlight| self.style(highlight))
                .filter(|style| !style.is_empty());

            match style {
                Some(style) => writeln!(
                    out,
                    "  n{} [label=\"{}\", style=\"{}\"];",
                    id, name, style
                )?,
                None => writeln!(out, "  n{} [label=\"{}\"];", id, name)?,
            }
        }

        for edge in &report.edges(store) {
            writeln!(out, "  n{} -> n{};", edge.source, edge.target)?;
        }

        out.push('}');
        Ok(out)
    }
}

/// JSON formatter
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a QueryReport,
    names: BTreeMap<NodeId, &'a str>,
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &QueryReport, store: &GraphStore) -> Result<String> {
        let names = report
            .people(store)
            .into_iter()
            .filter_map(|id| store.name(id).map(|name| (id, name)))
            .collect();

        let json_report = JsonReport {
            generated_at: Utc::now(),
            report,
            names,
        };
        Ok(serde_json::to_string_pretty(&json_report)?)
    }
}

/// Plain text formatter
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &QueryReport, store: &GraphStore) -> Result<String> {
        let mut out = String::new();

        match report {
            QueryReport::Ancestry {
                root,
                two_sided,
                edges,
            } => {
                writeln!(
                    out,
                    "Ancestry of {} ({}): {} edges",
                    label(store, *root),
                    if *two_sided { "two-sided" } else { "ancestors only" },
                    edges.len()
                )?;
                for edge in edges {
                    writeln!(
                        out,
                        "  {} -> {}",
                        label(store, edge.source),
                        label(store, edge.target)
                    )?;
                }
            }
            QueryReport::CommonAncestry {
                first,
                second,
                edges,
            } => {
                writeln!(
                    out,
                    "Common ancestry of {} and {}: {} edges",
                    label(store, *first),
                    label(store, *second),
                    edges.len()
                )?;
                for edge in edges {
                    writeln!(
                        out,
                        "  {} -> {}",
                        label(store, edge.source),
                        label(store, edge.target)
                    )?;
                }
            }
            QueryReport::ClosestAncestor {
                first,
                second,
                ancestor,
            } => {
                writeln!(
                    out,
                    "Closest common ancestor of {} and {}: {}",
                    label(store, *first),
                    label(store, *second),
                    label(store, *ancestor)
                )?;
            }
            QueryReport::Path {
                first,
                second,
                path,
            } => {
                writeln!(
                    out,
                    "Kinship path from {} to {} ({} steps):",
                    label(store, *first),
                    label(store, *second),
                    path.len().saturating_sub(1)
                )?;
                let steps: Vec<String> = path.iter().map(|&id| label(store, id)).collect();
                writeln!(out, "  {}", steps.join(" -> "))?;
            }
        }

        Ok(out.trim_end().to_string())
    }
}
