//! Prometheus text exposition format.
//!
//! Renders a registry snapshot into the text format (version 0.0.4) for
//! scraping by a Prometheus server or compatible agent.

use std::fmt::{self, Write};

use crate::registry::Snapshot;

/// Content type served alongside [`render_prometheus`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render every registered metric of `snapshot`.
///
/// Families appear sorted by name, each with `# HELP` and `# TYPE` lines
/// even when no series is currently published.
pub fn render_prometheus(snapshot: &Snapshot) -> Result<String, fmt::Error> {
    let mut out = String::new();

    for desc in snapshot.descriptors() {
        writeln!(out, "# HELP {} {}", desc.name, escape_help(desc.help))?;
        writeln!(out, "# TYPE {} gauge", desc.name)?;

        let label_names = desc.label_names();
        for (values, value) in snapshot.series(desc.name) {
            out.push_str(desc.name);
            if !label_names.is_empty() {
                out.push('{');
                for (i, (name, value)) in label_names.iter().zip(values).enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write!(out, "{name}=\"{}\"", escape_label(value))?;
                }
                out.push('}');
            }
            writeln!(out, " {}", format_value(value))?;
        }
    }

    Ok(out)
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "+" } else { "-" };
        format!("{sign}Inf")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MetricDesc, Registry};

    static GUILDS: MetricDesc = MetricDesc::gauge("wow_guild_count", "Number of guilds");
    static ONLINE: MetricDesc = MetricDesc::gauge_vec(
        "wow_players_online",
        "Number of players currently online",
        &["faction"],
    );
    static RESETS: MetricDesc = MetricDesc::gauge_vec(
        "wow_instance_resets",
        "Instance reset times",
        &["map_id", "difficulty"],
    );

    fn test_registry() -> Registry {
        Registry::with_metrics(&[&GUILDS, &ONLINE, &RESETS]).unwrap()
    }

    #[test]
    fn render_empty() {
        let output = render_prometheus(&test_registry().snapshot()).unwrap();
        // Declarations are present even without series.
        assert!(output.contains("# HELP wow_players_online Number of players currently online"));
        assert!(output.contains("# TYPE wow_players_online gauge"));
        assert!(output.contains("wow_guild_count 0\n"));
        assert!(!output.contains("wow_players_online{"));
    }

    #[test]
    fn render_labeled_series() {
        let registry = test_registry();
        registry.set(&ONLINE, &["Alliance"], 2.0).unwrap();
        registry.set(&ONLINE, &["Horde"], 3.0).unwrap();
        registry.set(&RESETS, &["533", "25_Player"], 1_700_000_000.0).unwrap();

        let output = render_prometheus(&registry.snapshot()).unwrap();
        assert!(output.contains("wow_players_online{faction=\"Alliance\"} 2\n"));
        assert!(output.contains("wow_players_online{faction=\"Horde\"} 3\n"));
        assert!(output.contains(
            "wow_instance_resets{map_id=\"533\",difficulty=\"25_Player\"} 1700000000\n"
        ));
    }

    #[test]
    fn families_sorted_by_name() {
        let output = render_prometheus(&test_registry().snapshot()).unwrap();
        let guild = output.find("# TYPE wow_guild_count").unwrap();
        let resets = output.find("# TYPE wow_instance_resets").unwrap();
        let online = output.find("# TYPE wow_players_online").unwrap();
        assert!(guild < resets && resets < online);
    }

    #[test]
    fn fractional_values_keep_precision() {
        let registry = test_registry();
        registry.set(&GUILDS, &[], 87.5).unwrap();
        let output = render_prometheus(&registry.snapshot()).unwrap();
        assert!(output.contains("wow_guild_count 87.5\n"));
    }

    #[test]
    fn label_values_are_escaped() {
        let registry = test_registry();
        registry.set(&ONLINE, &["Al\"li\\ance\n"], 1.0).unwrap();
        let output = render_prometheus(&registry.snapshot()).unwrap();
        assert!(output.contains(r#"wow_players_online{faction="Al\"li\\ance\n"} 1"#));
    }

    #[test]
    fn non_finite_values() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(-3.0), "-3");
    }

    #[test]
    fn render_format_is_prometheus_compatible() {
        let registry = test_registry();
        registry.set(&ONLINE, &["Alliance"], 2.0).unwrap();
        let output = render_prometheus(&registry.snapshot()).unwrap();

        // Every sample line is: name[{labels}] value
        for line in output.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (series, value) = line.rsplit_once(' ').unwrap();
            assert!(series.starts_with("wow_"), "bad series: {line}");
            assert!(value.parse::<f64>().is_ok(), "bad value: {line}");
        }
    }
}
