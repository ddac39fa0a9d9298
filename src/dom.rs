//! Browser-side progress display: the `#loading` container and its `.progressbar` fill.

use anyhow::Context as _;
use wasm_bindgen::JsCast;

use crate::resources::loading::ProgressBar;

fn query(document: &web_sys::Document, selector: &str) -> anyhow::Result<web_sys::HtmlElement> {
    document
        .query_selector(selector)
        .map_err(|e| anyhow::anyhow!("invalid selector {selector}: {e:?}"))?
        .with_context(|| format!("the page has no {selector} element"))?
        .dyn_into::<web_sys::HtmlElement>()
        .map_err(|_| anyhow::anyhow!("{selector} is not an html element"))
}

#[derive(Debug)]
pub struct ProgressDom {
    loading: web_sys::HtmlElement,
    bar: web_sys::HtmlElement,
}

impl ProgressDom {
    pub fn new(loading_selector: &str, progress_selector: &str) -> anyhow::Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .context("no document to show progress in")?;
        Ok(Self {
            loading: query(&document, loading_selector)?,
            bar: query(&document, progress_selector)?,
        })
    }

    pub fn show(&self, bar: &ProgressBar) {
        if let Err(e) = self.bar.style().set_property("transform", &bar.css_transform()) {
            log::warn!("could not update the progress bar: {e:?}");
        }
        if !bar.visible() {
            if let Err(e) = self.loading.style().set_property("display", "none") {
                log::warn!("could not hide the loading screen: {e:?}");
            }
        }
    }
}

/// The canvas the surface is bound to.
pub fn canvas(id: &str) -> anyhow::Result<web_sys::HtmlCanvasElement> {
    web_sys::window()
        .and_then(|w| w.document())
        .context("no document to draw in")?
        .get_element_by_id(id)
        .with_context(|| format!("the page has no canvas #{id}"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| anyhow::anyhow!("#{id} is not a canvas"))
}
