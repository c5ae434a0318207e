use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use html5ever::serialize::{SerializeOpts, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, QualName, local_name, namespace_url, ns, parse_document};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use thiserror::Error;

/// Failure modes of [`append_row`]. Lenient HTML recovery means `Parse`
/// only fires when the input cannot be read and tokenized at all.
#[derive(Debug, Error)]
pub enum AppendRowError {
    #[error("failed to tokenize HTML input: {0}")]
    Parse(io::Error),
    #[error("failed to render updated HTML document: {0}")]
    Render(io::Error),
}

/// Append `row` as a new `tr` of `td` cells to the first `table` in
/// `html` (inside its `tbody` when one exists as a direct child,
/// otherwise directly under the table) and return the re-rendered
/// document.
///
/// A document without any `table` is re-rendered unchanged; that is not
/// an error. Row values are treated as opaque text and escaped by the
/// serializer.
pub fn append_row(html: &str, row: &[String]) -> Result<String, AppendRowError> {
    let dom = parse(html)?;
    if let Some(table) = find_first_element(&dom.document, &local_name!("table")) {
        append_row_to_table(&table, row);
    }
    render(&dom)
}

fn parse(html: &str) -> Result<RcDom, AppendRowError> {
    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .map_err(AppendRowError::Parse)
}

fn render(dom: &RcDom) -> Result<String, AppendRowError> {
    let mut buffer = Vec::new();
    let handle = SerializableHandle::from(dom.document.clone());
    serialize(&mut buffer, &handle, SerializeOpts::default()).map_err(AppendRowError::Render)?;
    String::from_utf8(buffer)
        .map_err(|error| AppendRowError::Render(io::Error::new(io::ErrorKind::InvalidData, error)))
}

/// Pre-order depth-first search for the first element with the given
/// local name.
fn find_first_element(node: &Handle, tag: &LocalName) -> Option<Handle> {
    if element_has_name(node, tag) {
        return Some(node.clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_first_element(child, tag) {
            return Some(found);
        }
    }
    None
}

/// Direct children only; used for the tbody-or-table insertion decision.
fn direct_child_element(parent: &Handle, tag: &LocalName) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| element_has_name(child, tag))
        .cloned()
}

fn element_has_name(node: &Handle, tag: &LocalName) -> bool {
    matches!(node.data, NodeData::Element { ref name, .. } if name.local == *tag)
}

fn append_row_to_table(table: &Handle, row: &[String]) {
    let tr = new_element(local_name!("tr"));
    for value in row {
        let td = new_element(local_name!("td"));
        // An empty value still gets its (empty) text node child.
        append_child(&td, new_text(value));
        append_child(&tr, td);
    }
    let target = direct_child_element(table, &local_name!("tbody")).unwrap_or_else(|| table.clone());
    append_child(&target, tr);
}

fn new_element(tag: LocalName) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), tag),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

fn new_text(value: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(value.into()),
    })
}

fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}
