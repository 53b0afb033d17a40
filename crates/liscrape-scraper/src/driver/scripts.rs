//! JavaScript evaluated by [`super::chrome::ChromeDriver`].
//!
//! Each function takes one JSON argument and returns JSON, so a call is
//! always `(<function>)(<json>)`.

use serde::Serialize;

use crate::error::ScraperError;

/// Shared scope resolution; returns `null` when a section is missing.
const RESOLVE_SCOPE: &str = r"
const resolveScope = (scope) => {
  if (!scope || scope.kind === 'document') return document;
  const want = scope.heading.toLowerCase();
  return Array.from(document.querySelectorAll('section')).find((section) => {
    const heading = section.querySelector('h2');
    return heading && heading.innerText.toLowerCase().includes(want);
  }) || null;
};
const isVisible = (el) => !!(el.offsetParent || el.getClientRects().length);
";

const SCROLL_TO_BOTTOM: &str = r"() => {
  window.scrollTo(0, document.body.scrollHeight);
  return true;
}";

const DOCUMENT_HEIGHT: &str = r"() => document.body ? document.body.scrollHeight : 0";

const DOM_READY: &str = r"() => document.readyState !== 'loading'";

const SELECTOR_PRESENT: &str = r"(selector) => document.querySelector(selector) !== null";

const CLICK: &str = r"(target) => {
  const root = resolveScope(target.scope);
  if (!root) return false;
  const want = target.text ? target.text.toLowerCase() : null;
  const matches = Array.from(root.querySelectorAll(target.selector)).filter((candidate) =>
    isVisible(candidate) && (!want || candidate.innerText.toLowerCase().includes(want)));
  const chosen = target.every ? matches : matches.slice(0, 1);
  chosen.forEach((el) => el.click());
  return chosen.length > 0;
}";

const READ_TEXT: &str = r"(args) => {
  const root = resolveScope(args.scope);
  if (!root) return null;
  if (!args.selector) return root === document ? document.body.innerText : root.innerText;
  const el = root.querySelector(args.selector);
  return el ? el.innerText : null;
}";

const COLLECT_ITEMS: &str = r"(query) => {
  const root = resolveScope(query.scope);
  if (!root) return null;
  return Array.from(root.querySelectorAll(query.item))
    .filter((item) => !query.has || item.querySelector(query.has) !== null)
    .map((item) => {
      const raw = query.text
        ? Array.from(item.querySelectorAll(query.text)).map((el) => el.innerText)
        : item.innerText.split('\n');
      return raw.map((text) => text.trim()).filter((text) => text.length > 0);
    });
}";

/// Builds a self-contained expression invoking `function` with `arg`.
fn invoke(function: &str, arg: &impl Serialize) -> Result<String, ScraperError> {
    let json = serde_json::to_string(arg).map_err(|e| ScraperError::ScriptEvaluation {
        reason: format!("could not encode script argument: {e}"),
    })?;
    Ok(format!("(() => {{ {RESOLVE_SCOPE} return ({function})({json}); }})()"))
}

pub(super) fn scroll_to_bottom() -> String {
    format!("({SCROLL_TO_BOTTOM})()")
}

pub(super) fn document_height() -> String {
    format!("({DOCUMENT_HEIGHT})()")
}

pub(super) fn dom_ready() -> String {
    format!("({DOM_READY})()")
}

pub(super) fn selector_present(selector: &str) -> Result<String, ScraperError> {
    invoke(SELECTOR_PRESENT, &selector)
}

pub(super) fn click(target: &impl Serialize) -> Result<String, ScraperError> {
    invoke(CLICK, target)
}

pub(super) fn read_text(args: &impl Serialize) -> Result<String, ScraperError> {
    invoke(READ_TEXT, args)
}

pub(super) fn collect_items(query: &impl Serialize) -> Result<String, ScraperError> {
    invoke(COLLECT_ITEMS, query)
}
