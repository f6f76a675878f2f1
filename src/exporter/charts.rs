// file: src/exporter/charts.rs
// description: comparison chart construction and terminal rendering
// reference: https://docs.rs/colored

use crate::models::chart::parse_hex_color;
use crate::models::{ChartPoint, ChartSeries, ChartSpec, ProfileOutcome, ReportDocument};
use crate::utils::logging::format_count;
use colored::Colorize;

pub const SKILLS_PALETTE: [&str; 3] = ["#1e88e5", "#43a047", "#fb8c00"];
pub const EXPERIENCE_PALETTE: [&str; 3] = ["#26a69a", "#5c6bc0", "#ef5350"];
pub const WORDS_COLOR: &str = "#42a5f5";
pub const SECTIONS_COLOR: &str = "#66bb6a";

fn palette_color(palette: &[&str], idx: usize) -> String {
    palette[idx % palette.len()].to_string()
}

/// One bar per document with a parsed profile, in document order.
fn profile_points<F>(
    documents: &[ReportDocument],
    profiles: &[(String, ProfileOutcome)],
    palette: &[&str],
    value: F,
) -> Vec<ChartPoint>
where
    F: Fn(&crate::models::StructuredProfile) -> (f64, String),
{
    documents
        .iter()
        .filter_map(|doc| {
            profiles
                .iter()
                .find(|(id, _)| id == &doc.doc_id)
                .and_then(|(_, outcome)| outcome.profile())
                .map(|profile| (doc, profile))
        })
        .enumerate()
        .map(|(idx, (doc, profile))| {
            let (value, text) = value(profile);
            ChartPoint {
                label: doc.filename.clone(),
                value,
                text,
                color: palette_color(palette, idx),
            }
        })
        .collect()
}

pub fn skills_chart(
    documents: &[ReportDocument],
    profiles: &[(String, ProfileOutcome)],
) -> Option<ChartSpec> {
    let points = profile_points(documents, profiles, &SKILLS_PALETTE, |profile| {
        let count = profile.skills.len();
        (count as f64, count.to_string())
    });

    if points.is_empty() {
        return None;
    }

    Some(ChartSpec {
        title: "Skills Count Comparison".to_string(),
        x_axis_title: "Document".to_string(),
        y_axis_title: "Number of Skills".to_string(),
        secondary_axis_title: None,
        series: vec![ChartSeries {
            name: "Skills".to_string(),
            secondary_axis: false,
            points,
        }],
    })
}

pub fn experience_chart(
    documents: &[ReportDocument],
    profiles: &[(String, ProfileOutcome)],
) -> Option<ChartSpec> {
    let points = profile_points(documents, profiles, &EXPERIENCE_PALETTE, |profile| {
        let years = profile.experience_years;
        (years as f64, format!("{} years", years))
    });

    if points.is_empty() {
        return None;
    }

    Some(ChartSpec {
        title: "Experience Comparison (Years)".to_string(),
        x_axis_title: "Candidate".to_string(),
        y_axis_title: "Years of Experience".to_string(),
        secondary_axis_title: None,
        series: vec![ChartSeries {
            name: "Experience".to_string(),
            secondary_axis: false,
            points,
        }],
    })
}

/// Words and sections per document; sections sit on the secondary axis.
pub fn document_size_chart(documents: &[ReportDocument]) -> Option<ChartSpec> {
    if documents.is_empty() {
        return None;
    }

    let series = |name: &str, color: &str, secondary: bool, value: fn(&ReportDocument) -> usize| {
        ChartSeries {
            name: name.to_string(),
            secondary_axis: secondary,
            points: documents
                .iter()
                .map(|doc| {
                    let v = value(doc);
                    ChartPoint {
                        label: doc.filename.clone(),
                        value: v as f64,
                        text: format_count(v),
                        color: color.to_string(),
                    }
                })
                .collect(),
        }
    };

    Some(ChartSpec {
        title: "Document Size Comparison".to_string(),
        x_axis_title: "Document".to_string(),
        y_axis_title: "Words".to_string(),
        secondary_axis_title: Some("Sections".to_string()),
        series: vec![
            series("Words", WORDS_COLOR, false, |d| d.stats.total_words),
            series("Sections", SECTIONS_COLOR, true, |d| d.stats.total_chunks),
        ],
    })
}

/// Every chart that has data, in display order.
pub fn build_charts(
    documents: &[ReportDocument],
    profiles: &[(String, ProfileOutcome)],
) -> Vec<ChartSpec> {
    [
        skills_chart(documents, profiles),
        experience_chart(documents, profiles),
        document_size_chart(documents),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Horizontal bars scaled per series to `width` cells.
pub fn render_terminal(chart: &ChartSpec, width: usize) -> String {
    let label_width = chart
        .series
        .iter()
        .flat_map(|s| s.points.iter())
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0)
        .min(30);

    let mut out = format!("{}\n", chart.title.bold().underline());

    for series in &chart.series {
        let axis = if series.secondary_axis {
            chart
                .secondary_axis_title
                .as_deref()
                .unwrap_or(&series.name)
        } else {
            chart.y_axis_title.as_str()
        };
        out.push_str(&format!("  {} ({})\n", series.name.bold(), axis));

        let max = series.max_value();
        for point in &series.points {
            let cells = if max > 0.0 {
                ((point.value / max) * width as f64).round() as usize
            } else {
                0
            };
            let bar = "█".repeat(cells.max(usize::from(point.value > 0.0)));
            let bar = match parse_hex_color(&point.color) {
                Some((r, g, b)) => bar.truecolor(r, g, b).to_string(),
                None => bar,
            };

            let label: String = point.label.chars().take(label_width).collect();
            out.push_str(&format!(
                "  {:<width$} {} {}\n",
                label,
                bar,
                point.text,
                width = label_width
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentStats, StructuredProfile};
    use pretty_assertions::assert_eq;

    fn documents() -> Vec<ReportDocument> {
        vec![
            ReportDocument {
                doc_id: "jane".to_string(),
                filename: "jane.pdf".to_string(),
                stats: DocumentStats {
                    total_words: 1200,
                    total_characters: 7000,
                    total_chunks: 14,
                    total_pages: 2,
                },
            },
            ReportDocument {
                doc_id: "john".to_string(),
                filename: "john.pdf".to_string(),
                stats: DocumentStats {
                    total_words: 800,
                    total_characters: 5000,
                    total_chunks: 9,
                    total_pages: 1,
                },
            },
        ]
    }

    fn profiles() -> Vec<(String, ProfileOutcome)> {
        let jane = StructuredProfile {
            skills: vec!["Rust".to_string(), "Go".to_string(), "SQL".to_string()],
            experience_years: 7,
            ..StructuredProfile::default()
        };
        vec![
            ("jane".to_string(), ProfileOutcome::Parsed { profile: jane }),
            (
                "john".to_string(),
                ProfileOutcome::Unparsed {
                    raw_response: "oops".to_string(),
                },
            ),
        ]
    }

    #[test]
    fn test_skills_and_experience_use_parsed_profiles() {
        let skills = skills_chart(&documents(), &profiles()).unwrap();
        assert_eq!(skills.bar_count(), 1);
        assert_eq!(skills.series[0].points[0].value, 3.0);
        assert_eq!(skills.series[0].points[0].color, "#1e88e5");

        let experience = experience_chart(&documents(), &profiles()).unwrap();
        assert_eq!(experience.series[0].points[0].text, "7 years");
        assert_eq!(experience.series[0].points[0].color, "#26a69a");
    }

    #[test]
    fn test_charts_without_data() {
        assert!(skills_chart(&documents(), &[]).is_none());
        assert!(document_size_chart(&[]).is_none());
        assert_eq!(build_charts(&documents(), &[]).len(), 1);
        assert_eq!(build_charts(&documents(), &profiles()).len(), 3);
    }

    #[test]
    fn test_document_size_chart() {
        let chart = document_size_chart(&documents()).unwrap();
        assert_eq!(chart.series.len(), 2);
        assert!(!chart.series[0].secondary_axis);
        assert!(chart.series[1].secondary_axis);
        assert_eq!(chart.series[0].points[0].text, "1,200");
        assert_eq!(chart.series[1].points[1].value, 9.0);
    }

    #[test]
    fn test_render_terminal() {
        colored::control::set_override(false);
        let chart = document_size_chart(&documents()).unwrap();
        let rendered = render_terminal(&chart, 10);

        assert!(rendered.starts_with("Document Size Comparison\n"));
        assert!(rendered.contains("  jane.pdf ██████████ 1,200\n"));
        assert!(rendered.contains("Sections (Sections)"));
    }
}
