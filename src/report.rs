use std::io::{self, Write};

use crate::scenario::render::excerpt;
use crate::scenario::{
    choice_points, endings, render, RenderConfig, ScenarioGraph, ScenarioStats, ValidationReport,
};

const RULE: &str = "================================================================================";

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn write_validation(out: &mut impl Write, report: &ValidationReport) -> io::Result<()> {
    if report.is_ok() {
        writeln!(out, "\nOK: scenario file is valid.")?;
    } else {
        writeln!(out, "\nFAILED: scenario file has errors:\n")?;
        for issue in &report.errors {
            writeln!(out, "   error: {issue}")?;
        }
    }
    if !report.warnings.is_empty() {
        writeln!(out)?;
        for issue in &report.warnings {
            writeln!(out, "   warning: {issue}")?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

pub fn write_statistics(out: &mut impl Write, graph: &ScenarioGraph) -> io::Result<()> {
    let stats = ScenarioStats::collect(graph);

    writeln!(out, "\nScenario statistics:")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Total nodes: {}", stats.total_nodes)?;
    writeln!(out, "  ├─ story:    {}", stats.story)?;
    writeln!(out, "  ├─ dialogue: {}", stats.dialogue)?;
    writeln!(out, "  ├─ choice:   {}", stats.choice)?;
    writeln!(out, "  └─ unknown:  {}", stats.unrecognized)?;
    writeln!(out, "\nTotal text: {} characters", stats.text_chars)?;
    writeln!(out, "Total choices: {}", stats.total_choices)?;
    writeln!(out, "Average choices: {:.1}", stats.average_choices())?;
    writeln!(out, "Endings: {}", stats.endings)?;

    writeln!(out, "\nNodes per speaker:")?;
    for (speaker, count) in &stats.speakers {
        writeln!(out, "  {speaker}: {count}")?;
    }

    let metadata = graph.metadata();
    if !metadata.is_empty() {
        writeln!(out, "\nMetadata:")?;
        for (key, value) in metadata {
            match value.as_str() {
                Some(s) => writeln!(out, "  {key}: {s}")?,
                None => writeln!(out, "  {key}: {value}")?,
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

pub fn write_choice_points(out: &mut impl Write, graph: &ScenarioGraph) -> io::Result<()> {
    writeln!(out, "\nChoice points:")?;
    writeln!(out, "{RULE}")?;

    for (i, point) in choice_points(graph).iter().enumerate() {
        writeln!(out, "\n[Choice {}] {}", i + 1, point.id)?;
        writeln!(
            out,
            "   {}: {}",
            point.node.speaker.as_deref().unwrap_or_default(),
            excerpt(&point.node.text, 50)
        )?;
        writeln!(out, "   options: {}", point.choices().len())?;
        for (j, choice) in point.choices().iter().enumerate() {
            writeln!(
                out,
                "      {}. {}",
                j + 1,
                choice.text.as_deref().unwrap_or_default()
            )?;
            write!(out, "         -> {}", choice.next.as_deref().unwrap_or_default())?;
            match choice.flag.as_deref() {
                Some(flag) => writeln!(out, " (flag: {flag})")?,
                None => writeln!(out)?,
            }
        }
    }
    Ok(())
}

pub fn write_endings(out: &mut impl Write, graph: &ScenarioGraph) -> io::Result<()> {
    writeln!(out, "\nEndings:")?;
    writeln!(out, "{RULE}")?;

    for (i, (id, node)) in endings(graph).into_iter().enumerate() {
        writeln!(out, "\n[Ending {}] {id}", i + 1)?;
        writeln!(
            out,
            "   {}: {}",
            node.speaker.as_deref().unwrap_or_default(),
            excerpt(&node.text, 100)
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

pub fn write_tree(
    out: &mut impl Write,
    graph: &ScenarioGraph,
    config: &RenderConfig,
) -> io::Result<()> {
    writeln!(out, "\nScenario tree (first {} levels):", config.max_depth)?;
    writeln!(out, "{RULE}")?;
    match graph.start_node_id() {
        Some(start) => {
            for line in render(graph, start, config) {
                writeln!(out, "{line}")?;
            }
        }
        None => writeln!(out, "!! no start node defined")?,
    }
    writeln!(out, "\n{RULE}")
}
