//! Scenario-to-case projection: turn one normalized scenario into the
//! title, description, and wire XML the remote store expects.
//!
//! A scenario outline projects to exactly one case, never one per example
//! row. `<name>` placeholders in step text stay verbatim so the remote tool
//! can bind them per-row through the attached local parameters table.

use crate::models::{Scenario, ScenarioKind, SemanticVersion, Step, StepBlock};

/// A test case ready to persist: created first, then filled in, then
/// attached to exactly one suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDraft {
    pub title: String,
    pub description: String,
    pub steps_xml: String,
    pub parameters_xml: Option<String>,
}

/// Project one scenario into a [`CaseDraft`].
///
/// Feature-level background steps, when present, are prepended to the
/// scenario's own steps.
pub fn project_scenario(
    scenario: &Scenario,
    background: Option<&StepBlock>,
    version: SemanticVersion,
) -> CaseDraft {
    let default_description = format!("Created by automation script - Version {}", version);
    let base_description = scenario
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(&default_description);

    let steps: Vec<&Step> = background
        .map(|b| b.steps.iter())
        .into_iter()
        .flatten()
        .chain(scenario.steps.iter())
        .collect();
    let steps_xml = format_steps_xml(&steps);

    match (&scenario.kind, &scenario.examples) {
        (ScenarioKind::ScenarioOutline, Some(examples)) => CaseDraft {
            title: scenario.name.clone(),
            description: format!(
                "{}\n{}",
                base_description,
                format_examples_table(&examples.headers, &examples.rows)
            ),
            steps_xml,
            parameters_xml: Some(format_local_parameters_xml(
                &examples.headers,
                &examples.rows,
            )),
        },
        _ => CaseDraft {
            title: scenario.name.clone(),
            description: base_description.to_string(),
            steps_xml,
            parameters_xml: None,
        },
    }
}

/// Render steps as the store's test-case steps XML.
///
/// Root `<steps id="0" last="N">`, one `<step id="i" type="ActionStep">` per
/// step holding two `<parameterizedString isformatted="true">` elements: the
/// step text and the (unused) expected result.
pub fn format_steps_xml(steps: &[&Step]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    xml.push_str(&format!(r#"<steps id="0" last="{}">"#, steps.len()));

    for (idx, step) in steps.iter().enumerate() {
        let text = clean_step_text(step);
        xml.push_str(&format!(r#"<step id="{}" type="ActionStep">"#, idx + 1));
        xml.push_str(&format!(
            r#"<parameterizedString isformatted="true">{}</parameterizedString>"#,
            escape_xml(&text)
        ));
        xml.push_str(r#"<parameterizedString isformatted="true"></parameterizedString>"#);
        xml.push_str("</step>");
    }

    xml.push_str("</steps>");
    xml
}

/// Render an examples table as the store's local parameters XML.
///
/// The `parametr` element name is a required quirk of the store's schema,
/// not a typo.
pub fn format_local_parameters_xml(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut xml = String::from("<parameters>");

    for (idx, header) in headers.iter().enumerate() {
        xml.push_str(&format!(
            r#"<parametr id="{}" name="{}"/>"#,
            idx + 1,
            escape_xml(header)
        ));
    }

    xml.push_str("<data>");
    for row in rows {
        xml.push_str("<row>");
        for (col, value) in row.iter().enumerate() {
            xml.push_str(&format!(
                r#"<item param="{}">{}</item>"#,
                col + 1,
                escape_xml(value)
            ));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</data>");

    xml.push_str("</parameters>");
    xml
}

/// Render the examples table as HTML for the case description.
pub fn format_examples_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut html = String::from(
        "\n\n<h3>Examples Table:</h3>\n<table border='1' style='border-collapse: collapse; width: 100%;'>\n",
    );

    if !headers.is_empty() {
        html.push_str("<tr style='background-color: #f2f2f2;'>\n");
        for header in headers {
            html.push_str(&format!(
                "<th style='padding: 8px; text-align: left; border: 1px solid #ddd;'>{}</th>\n",
                escape_html(header)
            ));
        }
        html.push_str("</tr>\n");

        for row in rows {
            html.push_str("<tr>\n");
            for value in row {
                html.push_str(&format!(
                    "<td style='padding: 8px; text-align: left; border: 1px solid #ddd;'>{}</td>\n",
                    escape_html(value)
                ));
            }
            html.push_str("</tr>\n");
        }
    }

    html.push_str("</table>\n");
    html
}

/// Join keyword and text, stripping a leading background marker (English or
/// Persian). Other Gherkin keywords are preserved.
fn clean_step_text(step: &Step) -> String {
    let joined = format!("{} {}", step.keyword.trim(), step.text.trim());
    strip_background_prefix(joined.trim()).to_string()
}

fn strip_background_prefix(text: &str) -> &str {
    const PREFIX: &str = "Background:";
    // Persian sources spell the keyword with a zero-width non-joiner.
    const PREFIX_FA: &str = "پیش\u{200c}زمینه:";

    if let Some(rest) = text.strip_prefix(PREFIX_FA) {
        return rest.trim_start();
    }
    match text.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => text[PREFIX.len()..].trim_start(),
        _ => text,
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
