//! JavaScript bindings for rich-text documents
//!
//! Structured values (spans, deltas, changes) cross the boundary as JSON
//! strings. Each mutating call commits one change to the wrapped
//! document.

use crate::document::{Change, Document};
use crate::protocol::{decode_changes, encode_changes, Delta};
use crate::text::{EditText, Span, Text};
use wasm_bindgen::prelude::*;

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&format!("{}: {}", context, err)).into()
}

/// JavaScript-friendly wrapper for Document
#[wasm_bindgen]
pub struct WasmDocument {
    inner: Document,
}

impl WasmDocument {
    fn text_or_err(&self, key: &str) -> Result<&Text, JsValue> {
        self.inner
            .text(key)
            .ok_or_else(|| js_error("No text under key", key))
    }

    fn edit<F>(&mut self, context: &str, key: &str, f: F) -> Result<(), JsValue>
    where
        F: FnOnce(&mut crate::TextMut<'_>) -> crate::Result<()>,
    {
        let (doc, _) = self
            .inner
            .change(|tx| match tx.text_mut(key) {
                Some(mut text) => f(&mut text),
                None => Ok(()),
            })
            .map_err(|e| js_error(context, e))?;
        self.inner = doc;
        Ok(())
    }
}

#[wasm_bindgen]
impl WasmDocument {
    /// Create an empty document; a random actor id is used when none is given
    #[wasm_bindgen(constructor)]
    pub fn new(actor: Option<String>) -> Self {
        let inner = match actor {
            Some(actor) => Document::with_actor(actor),
            None => Document::new(),
        };
        Self { inner }
    }

    #[wasm_bindgen(js_name = getActor)]
    pub fn get_actor(&self) -> String {
        self.inner.actor().clone()
    }

    /// Attach a new text under `key` with the given initial content
    #[wasm_bindgen(js_name = setText)]
    pub fn set_text(&mut self, key: String, initial: String) -> Result<(), JsValue> {
        let (doc, _) = self
            .inner
            .change(|tx| {
                tx.set_text(key, Text::from(initial))?;
                Ok(())
            })
            .map_err(|e| js_error("Set text failed", e))?;
        self.inner = doc;
        Ok(())
    }

    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, key: String, index: usize, text: String) -> Result<(), JsValue> {
        self.text_or_err(&key)?;
        self.edit("Insert failed", &key, |handle| handle.insert_str(index, &text))
    }

    #[wasm_bindgen(js_name = deleteText)]
    pub fn delete_text(&mut self, key: String, index: usize, count: usize) -> Result<(), JsValue> {
        self.text_or_err(&key)?;
        self.edit("Delete failed", &key, |handle| handle.delete_at(index, count))
    }

    /// Characters only, formatting skipped
    #[wasm_bindgen(js_name = toString)]
    pub fn to_string(&self, key: String) -> Result<String, JsValue> {
        Ok(self.text_or_err(&key)?.to_string())
    }

    /// Number of visible elements, formatting markers included
    #[wasm_bindgen(js_name = length)]
    pub fn length(&self, key: String) -> Result<usize, JsValue> {
        Ok(self.text_or_err(&key)?.len())
    }

    /// Span list as a JSON array
    #[wasm_bindgen(js_name = toSpans)]
    pub fn to_spans(&self, key: String) -> Result<String, JsValue> {
        let spans: Vec<Span> = self.text_or_err(&key)?.to_spans().collect();
        serde_json::to_string(&spans).map_err(|e| js_error("JSON serialization failed", e))
    }

    /// Delta (`{"ops": [...]}`) as a JSON string
    #[wasm_bindgen(js_name = toDelta)]
    pub fn to_delta(&self, key: String) -> Result<String, JsValue> {
        self.text_or_err(&key)?
            .to_delta()
            .to_json()
            .map_err(|e| js_error("JSON serialization failed", e))
    }

    #[wasm_bindgen(js_name = applyDelta)]
    pub fn apply_delta(&mut self, key: String, delta_json: &str) -> Result<(), JsValue> {
        let delta = Delta::from_json(delta_json).map_err(|e| js_error("Invalid delta", e))?;
        self.text_or_err(&key)?;
        self.edit("Delta application failed", &key, |handle| handle.apply_delta(&delta))
    }

    /// Merge with another document
    #[wasm_bindgen(js_name = merge)]
    pub fn merge(&mut self, other: &WasmDocument) -> Result<(), JsValue> {
        self.inner = self
            .inner
            .merge(&other.inner)
            .map_err(|e| js_error("Merge failed", e))?;
        Ok(())
    }

    /// Changes `other` has not applied yet, as JSON
    #[wasm_bindgen(js_name = getChanges)]
    pub fn get_changes(&self, other: &WasmDocument) -> Result<String, JsValue> {
        let changes: Vec<Change> = self.inner.get_changes(&other.inner);
        let bytes = encode_changes(&changes).map_err(|e| js_error("Encode failed", e))?;
        String::from_utf8(bytes).map_err(|e| js_error("Encode failed", e))
    }

    #[wasm_bindgen(js_name = applyChanges)]
    pub fn apply_changes(&mut self, changes_json: &str) -> Result<(), JsValue> {
        let changes =
            decode_changes(changes_json.as_bytes()).map_err(|e| js_error("Invalid changes", e))?;
        self.inner = self
            .inner
            .apply_changes(changes)
            .map_err(|e| js_error("Apply failed", e))?;
        Ok(())
    }

    /// Export document as a JSON object of key -> string
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.inner
            .to_json()
            .map_err(|e| js_error("JSON serialization failed", e))
    }
}
