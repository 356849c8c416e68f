use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, Node, Window};

use crate::vdom::VNode;

pub fn window() -> Window {
    web_sys::window().expect("no global `window` exists")
}

pub fn document() -> Document {
    window().document().expect("should have a document on window")
}

pub fn root_element(id: &str) -> Result<Element, JsValue> {
    document()
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no #{} element on the page", id)))
}

/// Blocking `window.alert`.
pub fn alert(message: &str) {
    if let Err(e) = window().alert_with_message(message) {
        log::error!("alert failed: {:?}", e);
    }
}

/// Value of `attr` on the nearest element matching `selector`, starting at
/// the event target and walking up.
pub fn closest_attr(event: &Event, selector: &str, attr: &str) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let matched = target.closest(selector).ok()??;
    matched.get_attribute(attr)
}

// --- PATCHING ---

/// Brings the children of `parent` from `old` to `new`, reusing every node
/// whose position and tag did not change. The DOM children of `parent`
/// must currently mirror `old`.
pub fn patch(parent: &Node, old: &[VNode], new: &[VNode]) -> Result<(), JsValue> {
    let doc = document();
    let dom_children = parent.child_nodes();
    for (i, next) in new.iter().enumerate() {
        match (old.get(i), dom_children.get(i as u32)) {
            (Some(prev), Some(node)) => patch_node(&doc, parent, &node, prev, next)?,
            _ => {
                parent.append_child(&create(&doc, next)?)?;
            }
        }
    }
    while parent.child_nodes().length() as usize > new.len() {
        match parent.last_child() {
            Some(last) => {
                parent.remove_child(&last)?;
            }
            None => break,
        }
    }
    Ok(())
}

fn patch_node(doc: &Document, parent: &Node, node: &Node, prev: &VNode, next: &VNode) -> Result<(), JsValue> {
    match (prev, next, node.dyn_ref::<Element>()) {
        (VNode::Text(a), VNode::Text(b), _) => {
            if a != b {
                node.set_node_value(Some(b.as_str()));
            }
        }
        (VNode::Element(a), VNode::Element(b), Some(element)) if a.tag == b.tag => {
            for (name, value) in &b.attrs {
                if a.get_attr(name) != Some(value.as_str()) {
                    element.set_attribute(name, value)?;
                }
            }
            for (name, _) in &a.attrs {
                if b.get_attr(name).is_none() {
                    element.remove_attribute(name)?;
                }
            }
            patch(node, &a.children, &b.children)?;
        }
        _ => {
            parent.replace_child(&create(doc, next)?, node)?;
        }
    }
    Ok(())
}

fn create(doc: &Document, vnode: &VNode) -> Result<Node, JsValue> {
    match vnode {
        VNode::Text(text) => Ok(doc.create_text_node(text).into()),
        VNode::Element(e) => {
            let element = doc.create_element(e.tag)?;
            for (name, value) in &e.attrs {
                element.set_attribute(name, value)?;
            }
            for child in &e.children {
                element.append_child(&create(doc, child)?)?;
            }
            Ok(element.into())
        }
    }
}

/// An event listener that is removed when dropped.
pub struct EventListener {
    target: Element,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    pub fn new<F: FnMut(Event) + 'static>(target: &Element, kind: &'static str, f: F) -> Result<EventListener, JsValue> {
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(EventListener { target: target.clone(), kind, callback })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}
