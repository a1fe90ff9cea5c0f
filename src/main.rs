use std::{fs, process};

use clap::Parser;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bundlemap::cli::{Cli, Commands};
use bundlemap::dom::Size;
use bundlemap::host::{HostLink, MessageEvent, WindowId};
use bundlemap::label::LabelMode;
use bundlemap::page::{Event, Page, build_document};
use bundlemap::viewer::ViewerConfig;
use bundlemap::{Error, Result, html, input};

const OPENER: WindowId = WindowId(1);

struct GenArgs {
    output: String,
    payload: String,
    id: Option<String>,
    mode: LabelMode,
    viewport: Size,
    title: String,
}

fn write_output(path: &str, contents: String) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::Io {
        path: path.to_string(),
        source,
    })
}

/// Plays the opener's side of the handshake against a fresh page, then
/// writes whatever the page rendered.
fn gen_html(args: GenArgs) -> Result<()> {
    let mut data = input::read_payload(&args.payload)?;
    if let (Some(id), Some(obj)) = (args.id, data.as_object_mut()) {
        obj.insert("id".into(), Value::String(id));
    }

    let config = ViewerConfig {
        mode: args.mode,
        ..ViewerConfig::default()
    };
    let (host, inbox) = HostLink::opened_by(OPENER);
    let mut page = Page::load(build_document(args.viewport), host, config)?;

    let opened = inbox.try_recv().is_ok_and(|m| m == json!({ "opened": true }));
    let shown = if opened {
        page.dispatch(Event::Message(MessageEvent { source: OPENER, data }))
    } else {
        Ok(())
    };
    let rendered = inbox.try_iter().any(|m| m == json!({ "rendered": true }));

    let failure = match shown {
        Err(err) => Some(err),
        Ok(()) if !rendered => Some(Error::NoViewer),
        Ok(()) => None,
    };
    if let Some(err) = failure {
        write_output(&args.output, html::render_error_page(&args.payload, &err))?;
        return Err(err);
    }

    write_output(&args.output, html::render_page(&mut page, &args.title))?;
    info!(output = %args.output, "wrote treemap");
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Gen { output, payload, id, mode, width, height, title } => gen_html(GenArgs {
            output,
            payload,
            id,
            mode,
            viewport: Size { width, height },
            title,
        }),
    };

    if let Err(e) = result {
        eprintln!("bundlemap: {e}");
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(name: &str, payload: &str) -> GenArgs {
        let dir = std::env::temp_dir();
        let input = dir.join(format!("bundlemap-{name}-{}.json", process::id()));
        fs::write(&input, payload).unwrap();
        GenArgs {
            output: dir
                .join(format!("bundlemap-{name}-{}.html", process::id()))
                .to_string_lossy()
                .into_owned(),
            payload: input.to_string_lossy().into_owned(),
            id: None,
            mode: LabelMode::WastedBytes,
            viewport: Size { width: 400.0, height: 300.0 },
            title: "Bundles".into(),
        }
    }

    fn cleanup(args_out: &str, args_in: &str) -> String {
        let html = fs::read_to_string(args_out).unwrap();
        fs::remove_file(args_out).unwrap();
        fs::remove_file(args_in).unwrap();
        html
    }

    const PAYLOAD: &str = r#"{"documentUrl":"https://x","id":"a.js","rootNodes":[
        {"id":"a.js","group":"javascript","node":{"size":100,"wastedBytes":40}}]}"#;

    #[test]
    fn writes_treemap_page() {
        let args = args("ok", PAYLOAD);
        let (output, payload) = (args.output.clone(), args.payload.clone());
        gen_html(args).unwrap();
        let html = cleanup(&output, &payload);
        assert!(html.contains("a.js • 100 • 40"));
        assert!(html.contains("<title>Bundles</title>"));
    }

    #[test]
    fn unknown_initial_id_writes_error_page() {
        let mut args = args("unknown", PAYLOAD);
        args.id = Some("nope.js".into());
        let (output, payload) = (args.output.clone(), args.payload.clone());
        let err = gen_html(args).unwrap_err();
        assert!(matches!(err, Error::UnknownRoot { ref id } if id == "nope.js"));

        let html = cleanup(&output, &payload);
        assert!(html.contains("No treemap was rendered"));
        assert!(html.contains("<dd>nope.js</dd>"));
        assert!(!html.contains("treemap-view"));
    }

    #[test]
    fn payload_without_roots_writes_error_page() {
        let args = args("empty", r#"{"documentUrl":"https://x","id":"a.js"}"#);
        let (output, payload) = (args.output.clone(), args.payload.clone());
        let err = gen_html(args).unwrap_err();
        assert!(matches!(err, Error::NoViewer));
        let html = cleanup(&output, &payload);
        assert!(html.contains("no treemap data was received from the opener"));
    }
}
