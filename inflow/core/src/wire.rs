//! Wire Format
//!
//! The chunked response vocabulary shared by the stream emitter and the
//! client engine. The server renders these as `text/html` chunk bodies; the
//! headless client consumes the same information as typed [`Directive`]s.
//!
//! Two variants exist on the wire:
//!
//! - **bare**: the shell carries the placeholder markup and an inline
//!   patcher; later chunks carry a hidden staging container plus an inline
//!   `$patch("B:<n>", "S:<n>")` call.
//! - **instruction queue**: the shell declares the queue global
//!   (`__inflow_q`), pushes a `[0]` control entry, and references the
//!   external processor resource; later chunks push
//!   `[index, "<json instruction>"]` entries.

use serde_json::Value;

use crate::marker::BoundaryId;

/// Name of the inline patch function in streamed pages.
pub const PATCH_FN: &str = "$patch";

/// Name of the instruction queue global in streamed pages.
pub const QUEUE_GLOBAL: &str = "__inflow_q";

/// Path of the external queue-processor resource referenced by the shell.
pub const PROCESSOR_SRC: &str = "/inflow-client.js";

/// A machine-readable chunk directive: what the inline scripts of a stream
/// instruct the client to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// Replace a boundary's region with the content of a staging container,
    /// or mark it errored when a diagnostic token is present.
    Patch {
        /// The boundary to resolve.
        boundary: BoundaryId,
        /// Element id of the staging container.
        container: String,
        /// Diagnostic token for the error form.
        error: Option<String>,
    },
    /// Append an entry to the instruction queue.
    Push {
        /// Producer-assigned sequence index.
        index: u64,
        /// JSON-encoded instruction, or nothing for control entries.
        payload: Option<String>,
    },
}

impl Directive {
    /// Render the inline script form of this directive.
    #[must_use]
    pub fn to_script(&self) -> String {
        match self {
            Self::Patch {
                boundary,
                container,
                error,
            } => match error {
                Some(token) => format!(
                    "<script>{PATCH_FN}({}, {}, {});</script>",
                    js_string(boundary.as_str()),
                    js_string(container),
                    js_string(token)
                ),
                None => format!(
                    "<script>{PATCH_FN}({}, {});</script>",
                    js_string(boundary.as_str()),
                    js_string(container)
                ),
            },
            Self::Push { index, payload } => match payload {
                Some(json) => format!(
                    "<script>self.{QUEUE_GLOBAL}.push([{index}, {}]);</script>",
                    js_string(json)
                ),
                None => format!("<script>self.{QUEUE_GLOBAL}.push([{index}]);</script>"),
            },
        }
    }
}

/// Encode a string as a JS string literal (JSON string syntax is a subset).
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Placeholder markup for a pending boundary: opening sentinel comment, an
/// addressable anchor, the fallback, and the closing sentinel, wrapped in a
/// plain div.
#[must_use]
pub fn placeholder(boundary: &BoundaryId, fallback: &str) -> String {
    format!(
        "<div><!--$$--><template id=\"{boundary}\"></template>\
         <div class=\"loading\">{fallback}</div><!--/$--></div>"
    )
}

/// A hidden staging container chunk carrying replacement content.
#[must_use]
pub fn staging(container_id: &str, inner_html: &str) -> String {
    format!("<div hidden id=\"{container_id}\">{inner_html}</div>")
}

/// The queue bootstrap script: declare the queue if the stream got here
/// first, push the control entry, and reference the processor resource.
#[must_use]
pub fn queue_bootstrap() -> String {
    format!(
        "<script>self.{QUEUE_GLOBAL} = self.{QUEUE_GLOBAL} || [];\
         self.{QUEUE_GLOBAL}.push([0]);</script>\n\
         <script src=\"{PROCESSOR_SRC}\" defer></script>"
    )
}

/// Build the JSON instruction a queue push carries.
#[must_use]
pub fn instruction_json(boundary: &BoundaryId, component: &str, props: Value, data: Value) -> String {
    serde_json::json!({
        "id": boundary.as_str(),
        "component": component,
        "props": props,
        "data": data
    })
    .to_string()
}

/// The inline patch function served with the bare variant. Same semantics
/// as [`crate::patch::patch`], expressed against a real page.
#[must_use]
pub fn inline_patcher() -> String {
    format!(
        "<script>\n\
         {PATCH_FN} = function (b, c, e) {{\n\
           c = document.getElementById(c);\n\
           if (!c) return;\n\
           c.parentNode.removeChild(c);\n\
           var t = document.getElementById(b);\n\
           if (!t) return;\n\
           var open = t.previousSibling;\n\
           if (e) {{ open.data = \"$!\"; t.setAttribute(\"data-dgst\", e); }}\n\
           else {{\n\
             var parent = open.parentNode, n = t.nextSibling, depth = 0;\n\
             while (n) {{\n\
               if (n.nodeType === 8) {{\n\
                 var d = n.data;\n\
                 if (d === \"/$\") {{ if (depth === 0) break; depth--; }}\n\
                 else if (d === \"$\" || d === \"$$\" || d === \"$!\") depth++;\n\
               }}\n\
               var next = n.nextSibling;\n\
               parent.removeChild(n);\n\
               n = next;\n\
             }}\n\
             while (c.firstChild) parent.insertBefore(c.firstChild, n);\n\
             open.data = \"$\";\n\
           }}\n\
           if (open._retry) open._retry();\n\
         }};\n\
         </script>"
    )
}
