//! JavaScript snippets evaluated in the page by the Chromium backend.
//!
//! Selectors and text are embedded as JSON string literals so arbitrary
//! characters (quotes, `₹`, newlines) survive without manual escaping.

use super::{Locator, ValueSource};

/// Attribute used to hand an element found by script over to the CDP
/// element API.
pub(super) const MARK_ATTRIBUTE: &str = "data-bestdeal-target";

// Innermost-match semantics for text locators: an element is dropped when one
// of its matching descendants also contains the text.
const FIND_FN: &str = r"
const __find = (root, css, text) => {
  const all = Array.from(root.querySelectorAll(css));
  if (text === null) return all;
  const hits = all.filter((el) => (el.textContent || '').includes(text));
  return hits.filter((el) => !hits.some((other) => other !== el && el.contains(other)));
};";

fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

fn find_call(root: &str, locator: &Locator) -> String {
    match locator {
        Locator::Css(css) => format!("__find({root}, {}, null)", js_str(css)),
        Locator::CssWithText { css, text } => {
            format!("__find({root}, {}, {})", js_str(css), js_str(text))
        }
    }
}

fn wrap(body: &str) -> String {
    format!("(() => {{{FIND_FN}\n{body}\n}})()")
}

pub(super) fn count(locator: &Locator) -> String {
    wrap(&format!("return {}.length;", find_call("document", locator)))
}

pub(super) fn text(locator: &Locator, index: usize) -> String {
    wrap(&format!(
        "const el = {}[{index}];\nreturn el ? (el.innerText || el.textContent || '').trim() : null;",
        find_call("document", locator)
    ))
}

pub(super) fn click(locator: &Locator, index: usize) -> String {
    wrap(&format!(
        "const el = {}[{index}];\nif (!el) return false;\nel.scrollIntoView({{block: 'center'}});\nel.click();\nreturn true;",
        find_call("document", locator)
    ))
}

/// Tags the `index`-th match with [`MARK_ATTRIBUTE`], clearing any previous
/// tag, and returns whether the element exists. With `clear` the element's
/// current value is emptied as well.
pub(super) fn mark(locator: &Locator, index: usize, clear: bool) -> String {
    let attr = js_str(MARK_ATTRIBUTE);
    wrap(&format!(
        "document.querySelectorAll('[{MARK_ATTRIBUTE}]').forEach((el) => el.removeAttribute({attr}));\n\
         const el = {}[{index}];\nif (!el) return false;\n\
         el.setAttribute({attr}, '1');\nel.scrollIntoView({{block: 'center'}});\n\
         if (typeof el.focus === 'function') el.focus();\n\
         if ({clear} && 'value' in el) el.value = '';\nreturn true;",
        find_call("document", locator)
    ))
}

pub(super) fn child_value(
    container: &Locator,
    index: usize,
    child: &Locator,
    source: ValueSource,
) -> String {
    let read = match source {
        ValueSource::Text => "(found.innerText || found.textContent || '').trim()".to_owned(),
        ValueSource::Attribute(name) => format!("found.getAttribute({})", js_str(name)),
    };
    wrap(&format!(
        "const root = {}[{index}];\nif (!root) return null;\nconst found = {}[0];\nif (!found) return null;\nreturn {read};",
        find_call("document", container),
        find_call("root", child)
    ))
}

pub(super) const SCROLL_TO_BOTTOM: &str = "(() => {\n\
     window.scrollTo(0, document.body.scrollHeight);\n\
     return document.body.scrollHeight;\n})()";
