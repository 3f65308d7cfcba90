//! RPC envelope builders and reply classification.
//!
//! Only the operations the reconciler uses are implemented: the hello
//! exchange, `edit-config` against the candidate datastore with
//! `test-option` set, `commit`, `discard-changes` and `close-session`.

/// NETCONF base 1.0 namespace.
pub const BASE_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// Client hello advertising the base 1.0 capability only.
pub fn hello() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <hello xmlns=\"{ns}\">\
         <capabilities>\
         <capability>urn:ietf:params:netconf:base:1.0</capability>\
         </capabilities>\
         </hello>",
        ns = BASE_NS
    )
}

/// Wraps an operation body in an `<rpc>` envelope.
pub fn envelope(message_id: u64, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rpc xmlns=\"{ns}\" message-id=\"{id}\">{body}</rpc>",
        ns = BASE_NS,
        id = message_id,
        body = body
    )
}

/// `edit-config` against the candidate datastore.
///
/// `config` must already be a `<config>...</config>` document; it is
/// embedded verbatim. The `test-option` is always `set`, matching the
/// validate-then-commit workflow the switches expect.
pub fn edit_config_candidate(message_id: u64, config: &str) -> String {
    let body = format!(
        "<edit-config>\
         <target><candidate/></target>\
         <test-option>set</test-option>\
         {config}\
         </edit-config>",
        config = config
    );
    envelope(message_id, &body)
}

/// `commit` of the candidate datastore.
pub fn commit(message_id: u64) -> String {
    envelope(message_id, "<commit/>")
}

/// `discard-changes`, dropping any uncommitted candidate state.
pub fn discard_changes(message_id: u64) -> String {
    envelope(message_id, "<discard-changes/>")
}

/// `close-session`.
pub fn close_session(message_id: u64) -> String {
    envelope(message_id, "<close-session/>")
}

/// Coarse classification of an `<rpc-reply>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyKind {
    /// Reply contained `<ok/>` (or data with no error).
    Ok,
    /// Reply contained at least one `<rpc-error>`; carries the
    /// extracted error message text.
    Error(String),
}

/// Classifies a reply without a full XML parse.
///
/// The switches emit flat, predictable replies; scanning for the
/// `rpc-error` element and its `error-message` text is sufficient and
/// keeps the client free of an XML dependency.
pub fn classify_reply(reply: &str) -> ReplyKind {
    if !reply.contains("<rpc-error") {
        return ReplyKind::Ok;
    }
    let message = extract_element_text(reply, "error-message")
        .or_else(|| extract_element_text(reply, "error-tag"))
        .unwrap_or_else(|| "unknown rpc-error".to_string());
    ReplyKind::Error(message)
}

/// Pulls the text content of the first `<name ...>text</name>` element.
fn extract_element_text(xml: &str, name: &str) -> Option<String> {
    let open = format!("<{}", name);
    let close = format!("</{}>", name);
    let start = xml.find(&open)?;
    let content_start = xml[start..].find('>')? + start + 1;
    let content_end = xml[content_start..].find(&close)? + content_start;
    let text = xml[content_start..content_end].trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
