use clap::{Parser, Subcommand};

use crate::label::LabelMode;

/// An interactive treemap viewer for JavaScript bundle composition
#[derive(Parser)]
#[command(name = "bundlemap")]
#[command(version = "0.1.0")]
#[command(about = "Renders bundle size data as an interactive treemap page")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a treemap page from a viewer payload
    Gen {
        /// Output HTML file path
        #[arg(short, long, default_value = "treemap.html")]
        output: String,

        /// Payload JSON file (`{documentUrl, id, rootNodes}`), or `-` for stdin
        payload: String,

        /// Root to show first instead of the payload's `id`
        #[arg(long)]
        id: Option<String>,

        /// What the label percentage measures: `wasted-bytes` or `default`
        #[arg(short, long, default_value = "wasted-bytes")]
        mode: LabelMode,

        /// Treemap width in pixels
        #[arg(long, default_value_t = 1200.0, value_parser = parse_extent)]
        width: f64,

        /// Treemap height in pixels
        #[arg(long, default_value_t = 800.0, value_parser = parse_extent)]
        height: f64,

        /// Page title
        #[arg(short, long, default_value = "Bundle treemap")]
        title: String,
    },
}

/// A finite, positive pixel extent.
fn parse_extent(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{s} must be a finite number greater than 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gen_defaults() {
        let cli = Cli::try_parse_from(["bundlemap", "gen", "payload.json"]).unwrap();
        let Commands::Gen { output, payload, id, mode, width, .. } = cli.command;
        assert_eq!(output, "treemap.html");
        assert_eq!(payload, "payload.json");
        assert_eq!(id, None);
        assert_eq!(mode, LabelMode::WastedBytes);
        assert_eq!(width, 1200.0);
    }

    #[test]
    fn parses_mode_and_id() {
        let cli = Cli::try_parse_from([
            "bundlemap", "gen", "-", "--id", "javascript", "--mode", "default", "-o", "out.html",
        ])
        .unwrap();
        let Commands::Gen { output, id, mode, .. } = cli.command;
        assert_eq!(output, "out.html");
        assert_eq!(id.as_deref(), Some("javascript"));
        assert_eq!(mode, LabelMode::Default);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["bundlemap", "gen", "p.json", "--mode", "bytes"]).is_err());
    }

    #[test]
    fn rejects_degenerate_extents() {
        for bad in ["nan", "inf", "-5", "0", "wide"] {
            let width = Cli::try_parse_from(["bundlemap", "gen", "p.json", "--width", bad]);
            assert!(width.is_err(), "width {bad}");
            let height = Cli::try_parse_from(["bundlemap", "gen", "p.json", "--height", bad]);
            assert!(height.is_err(), "height {bad}");
        }
        let cli = Cli::try_parse_from(["bundlemap", "gen", "p.json", "--width", "640.5"]).unwrap();
        let Commands::Gen { width, .. } = cli.command;
        assert_eq!(width, 640.5);
    }
}
