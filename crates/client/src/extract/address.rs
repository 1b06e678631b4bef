//! Reconstruction of obfuscated e-mail addresses.
//!
//! CMS pages write addresses as `name (at) host (dot) tld`, `name[at]host[dot]tld`
//! or inject a "spam prevention" placeholder in place of the `@`. Three passes
//! rebuild them:
//!
//! 1. `local <at-token> domain` becomes `local@domain`
//! 2. `label <dot-token> label` becomes `label.label`
//! 3. stray horizontal whitespace around `@` and inside the domain is removed
//!
//! The `regex` crate has no lookaround. The character after a token is
//! captured as `next` and scanning resumes at its position, so it is never
//! consumed and adjacent obfuscations are all seen. Matching stays linear.
//!
//! Bare words (`at`, `dot`, `punkt`) are ordinary prose, so they are only
//! rewritten where the surrounding text already looks like an address or a
//! host name of at least three labels ending in a letters-only label.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static RE_AT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?P<local>[\p{L}0-9._%+-]+)[^\S\n]*",
        r"(?P<token>\([^\S\n]*(?:at|ät)[^\S\n]*\)|\[[^\S\n]*(?:at|ät)[^\S\n]*\]|\b(?:at|ät)\b|spam[^\S\n]*prevention)",
        r"[^\S\n]*@?[^\S\n]*",
        r"(?P<next>[\p{L}0-9])",
    ))
    .expect("valid regex")
});

static RE_DOT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?P<ctx>@(?:[\p{L}0-9-]+\.)*)?(?P<label>[\p{L}0-9-]+)[^\S\n]*",
        r"(?P<token>\([^\S\n]*(?:dot|punkt)[^\S\n]*\)|\[[^\S\n]*(?:dot|punkt)[^\S\n]*\]|\b(?:dot|punkt)\b)",
        r"[^\S\n]*",
        r"(?P<next>[\p{L}0-9-])",
    ))
    .expect("valid regex")
});

/// A domain right after a bare `at`: `label`, a dot (literal or token), `label`.
static RE_DOMAIN_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\A[\p{L}0-9-]+",
        r"(?:[^\S\n]*(?:\([^\S\n]*(?:dot|punkt)[^\S\n]*\)|\[[^\S\n]*(?:dot|punkt)[^\S\n]*\]|\b(?:dot|punkt)\b)[^\S\n]*|\.)",
        r"[\p{L}0-9]",
    ))
    .expect("valid regex")
});

/// A host spelled out with words, e.g. `www dot tum dot de`.
static RE_DOT_CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\A[\p{L}0-9-]+",
        r"(?:[^\S\n]*(?:\([^\S\n]*(?:dot|punkt)[^\S\n]*\)|\[[^\S\n]*(?:dot|punkt)[^\S\n]*\]|\b(?:dot|punkt)\b)[^\S\n]*",
        r"(?P<last>[\p{L}0-9-]+)){2,}",
    ))
    .expect("valid regex")
});

static RE_AT_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]*@[^\S\n]*").expect("valid regex"));

/// Domain tail after `@` whose dots carry stray spaces, e.g. `@school . edu`.
/// A dot followed by a space but not preceded by one ends a sentence instead.
static RE_SPACED_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@[\p{L}0-9-]+(?:(?:[^\S\n]+\.[^\S\n]*|\.)[\p{L}0-9-]+)+").expect("valid regex")
});

/// Host name outside an address whose dots carry stray spaces, e.g.
/// `www . tum . de`.
static RE_SPACED_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[\p{L}0-9-]+(?:(?:[^\S\n]+\.[^\S\n]*|\.)(?P<last>[\p{L}0-9-]+)){2,}").expect("valid regex")
});

/// Run all three de-obfuscation passes.
pub fn deobfuscate_addresses(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = rebuild_at(text);
    let text = rebuild_dots(&text);
    tidy_address_spacing(&text)
}

/// Pass 1: `local (at) domain` → `local@domain`.
pub fn rebuild_at(text: &str) -> String {
    rewrite_with_lookahead(&RE_AT_TOKEN, text, |caps, _| {
        let next = caps.name("next")?;
        if is_bare_word(&caps["token"]) && !RE_DOMAIN_SHAPE.is_match(&text[next.start()..]) {
            return None;
        }
        Some(format!("{}@", &caps["local"]))
    })
}

/// Pass 2: `label (dot) label` → `label.label`.
pub fn rebuild_dots(text: &str) -> String {
    rewrite_with_lookahead(&RE_DOT_TOKEN, text, |caps, chained| {
        let ctx = caps.name("ctx").map_or("", |m| m.as_str());
        if is_bare_word(&caps["token"]) && ctx.is_empty() && !chained {
            let label = caps.name("label")?;
            let chain = RE_DOT_CHAIN.captures(&text[label.start()..])?;
            if !is_top_level_label(&chain["last"]) {
                return None;
            }
        }
        Some(format!("{ctx}{}.", &caps["label"]))
    })
}

/// Pass 3: drop whitespace around `@` and around dots inside a domain.
pub fn tidy_address_spacing(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for m in RE_AT_SPACES.find_iter(text) {
        if m.as_str() == "@" {
            continue;
        }
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        if before.is_some_and(|c| !c.is_whitespace()) && after.is_some_and(|c| !c.is_whitespace()) {
            out.push_str(&text[last..m.start()]);
            out.push('@');
            last = m.end();
        }
    }
    out.push_str(&text[last..]);

    let out = RE_SPACED_DOMAIN.replace_all(&out, |caps: &Captures<'_>| strip_whitespace(&caps[0]));

    RE_SPACED_HOST
        .replace_all(&out, |caps: &Captures<'_>| {
            if is_top_level_label(&caps["last"]) { strip_whitespace(&caps[0]) } else { caps[0].to_string() }
        })
        .into_owned()
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Last label of a host: two or more letters.
fn is_top_level_label(label: &str) -> bool {
    label.chars().count() >= 2 && label.chars().all(char::is_alphabetic)
}

fn is_bare_word(token: &str) -> bool {
    matches!(token.to_lowercase().as_str(), "at" | "ät" | "dot" | "punkt")
}

/// Rewrite every match of `re`, resuming the scan at the `next` group.
///
/// `decide` gets the captures and whether the match starts exactly where the
/// previous rewrite left off. It returns the replacement for the text before
/// `next`, or `None` to keep the match. A kept match resumes scanning at its
/// `token` group so a match starting inside it can still be found.
fn rewrite_with_lookahead<F>(re: &Regex, text: &str, mut decide: F) -> String
where
    F: FnMut(&Captures<'_>, bool) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut chain_at = None;

    while let Some(caps) = re.captures_at(text, last) {
        let (Some(whole), Some(token), Some(next)) = (caps.get(0), caps.name("token"), caps.name("next")) else {
            break;
        };
        out.push_str(&text[last..whole.start()]);

        let chained = chain_at == Some(whole.start());
        match decide(&caps, chained) {
            Some(replacement) => {
                out.push_str(&replacement);
                last = next.start();
                chain_at = Some(last);
            }
            None => {
                out.push_str(&text[whole.start()..token.start()]);
                last = token.start();
            }
        }
    }

    out.push_str(&text[last..]);
    out
}
