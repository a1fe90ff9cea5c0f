//! The viewer window: its document, its link to the opener, and the event
//! handlers that drive the single [`TreemapViewer`].

use tracing::{debug, info, warn};

use crate::dom::{Document, ElementId, Size};
use crate::error::Result;
use crate::host::{HostLink, HostReply, MessageEvent, ViewerPayload};
use crate::layout::{NODE_CLASS, SliceLayout};
use crate::viewer::{ALL_JAVASCRIPT_ID, TreemapViewer, ViewerConfig};

pub const SELECTOR_QUERY: &str = "select#bundle-selector";
pub const MOUNT_QUERY: &str = "main#treemap-root";
pub const HOVER_CLASS: &str = "treemap-node--hover";

/// Receives one event per message-driven render, when installed.
pub trait Analytics {
    fn track(&mut self, category: &str, action: &str);
}

#[derive(Debug, Clone)]
pub enum Event {
    Message(MessageEvent),
    Resize(Size),
    Click(ElementId),
    MouseOver(ElementId),
    MouseOut(ElementId),
    /// The selector now holds this value.
    SelectorChange(String),
}

/// Builds the empty page the viewer expects: a bundle selector above the
/// treemap mount.
pub fn build_document(viewport: Size) -> Document {
    let mut doc = Document::new(viewport);
    let header = doc.create_element("header");
    let selector = doc.create_element("select");
    doc.set_attr(selector, "id", "bundle-selector");
    let mount = doc.create_element("main");
    doc.set_attr(mount, "id", "treemap-root");

    let body = doc.body();
    doc.append_child(body, header);
    doc.append_child(header, selector);
    doc.append_child(body, mount);
    doc
}

pub struct Page {
    doc: Document,
    host: HostLink,
    selector: ElementId,
    mount: ElementId,
    config: ViewerConfig,
    viewer: Option<TreemapViewer<SliceLayout>>,
    analytics: Option<Box<dyn Analytics>>,
}

impl Page {
    /// Locates the required elements and tells the opener, if any, that the
    /// window is ready for data.
    pub fn load(doc: Document, host: HostLink, config: ViewerConfig) -> Result<Self> {
        let selector = doc.find(SELECTOR_QUERY)?;
        let mount = doc.find(MOUNT_QUERY)?;
        if host.has_opener() {
            host.post(HostReply::Opened);
        }
        Ok(Self {
            doc,
            host,
            selector,
            mount,
            config,
            viewer: None,
            analytics: None,
        })
    }

    pub fn with_analytics(mut self, analytics: Box<dyn Analytics>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn viewer(&self) -> Option<&TreemapViewer<SliceLayout>> {
        self.viewer.as_ref()
    }

    pub fn selector(&self) -> ElementId {
        self.selector
    }

    pub fn mount(&self) -> ElementId {
        self.mount
    }

    /// Values of the selector options, in display order.
    pub fn selector_values(&self) -> Vec<String> {
        let Some(select) = self.doc.get(self.selector) else {
            return Vec::new();
        };
        select
            .children()
            .iter()
            .filter_map(|&id| self.doc.get(id)?.attrs.get("value").cloned())
            .collect()
    }

    /// Drains `events` in order. A failing handler is logged and the loop
    /// moves on to the next event.
    pub fn run(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            if let Err(err) = self.dispatch(event) {
                warn!(%err, "event handler failed");
            }
        }
    }

    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Message(message) => self.on_message(message),
            Event::Resize(size) => {
                self.doc.set_viewport(size);
                if let Some(viewer) = &mut self.viewer {
                    viewer.render(&mut self.doc);
                }
                Ok(())
            }
            Event::Click(target) => {
                if self.doc.closest(target, NODE_CLASS).is_some() {
                    if let Some(viewer) = &self.viewer {
                        viewer.update_colors(&mut self.doc);
                    }
                }
                Ok(())
            }
            Event::MouseOver(target) => {
                if let Some(node) = self.doc.closest(target, NODE_CLASS) {
                    self.doc.add_class(node, HOVER_CLASS);
                }
                Ok(())
            }
            Event::MouseOut(target) => {
                if let Some(node) = self.doc.closest(target, NODE_CLASS) {
                    self.doc.remove_class(node, HOVER_CLASS);
                }
                Ok(())
            }
            Event::SelectorChange(value) => {
                let Some(viewer) = &mut self.viewer else {
                    return Ok(());
                };
                viewer.show(&mut self.doc, &value)?;
                self.doc.set_select_value(self.selector, &value);
                Ok(())
            }
        }
    }

    fn on_message(&mut self, message: MessageEvent) -> Result<()> {
        if !self.host.is_from_opener(message.source) {
            debug!(source = message.source.0, "ignoring message from another window");
            return Ok(());
        }
        if self.viewer.is_some() {
            debug!("viewer already initialized, ignoring message");
            return Ok(());
        }
        let Some(payload) = ViewerPayload::from_message(&message.data) else {
            return Ok(());
        };
        info!(
            document_url = %payload.document_url,
            roots = payload.root_nodes.len(),
            "received treemap data"
        );

        self.populate_selector(&payload);
        let viewer = self.viewer.insert(TreemapViewer::new(
            payload.document_url,
            payload.root_nodes,
            self.mount,
            self.config.clone(),
            SliceLayout,
        ));
        viewer.show(&mut self.doc, &payload.id)?;
        self.doc.set_select_value(self.selector, &payload.id);

        if let Some(analytics) = &mut self.analytics {
            analytics.track("report", "open in viewer");
        }
        self.host.post(HostReply::Rendered);
        Ok(())
    }

    fn populate_selector(&mut self, payload: &ViewerPayload) {
        self.doc.clear_children(self.selector);
        let all = format!("{} (all javascript)", payload.document_url);
        let entries = std::iter::once((all.as_str(), ALL_JAVASCRIPT_ID))
            .chain(payload.root_nodes.iter().map(|r| (r.id.as_str(), r.id.as_str())));
        for (label, value) in entries {
            let option = self.doc.create_element("option");
            self.doc.set_attr(option, "value", value);
            self.doc.set_text(option, label);
            self.doc.append_child(self.selector, option);
        }
    }
}
