//! Element tree produced by the renderers.
//!
//! Views keep the last tree they rendered and patch the live DOM against the
//! next one (`dom::patch`), so nodes whose tag is unchanged are reused. A
//! button under the pointer survives a poll or a tick.

#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element(VElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VElement {
    pub tag: &'static str,
    /// An empty value is a boolean attribute (`disabled`, `hidden`).
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<VNode>,
}

pub fn el(tag: &'static str) -> VElement {
    VElement { tag, attrs: Vec::new(), children: Vec::new() }
}

impl VElement {
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> VElement {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn flag(self, name: &'static str, on: bool) -> VElement {
        if on {
            self.attr(name, "")
        } else {
            self
        }
    }

    pub fn child(mut self, child: impl Into<VNode>) -> VElement {
        self.children.push(child.into());
        self
    }

    pub fn text(self, text: impl Into<String>) -> VElement {
        self.child(VNode::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }
}

impl From<VElement> for VNode {
    fn from(element: VElement) -> Self {
        VNode::Element(element)
    }
}

impl VNode {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            VNode::Text(text) => out.push_str(&escape(text)),
            VNode::Element(e) => {
                out.push('<');
                out.push_str(e.tag);
                for (name, value) in &e.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str(&format!("=\"{}\"", escape(value)));
                    }
                }
                out.push('>');
                for child in &e.children {
                    child.write_html(out);
                }
                out.push_str(&format!("</{}>", e.tag));
            }
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
