//! Minimal HTML scanning for the listing page.
//!
//! Only what the page needs: locate the listing `<div>` by class, take the
//! text of each direct `<span>` child, and render it roughly the way a browser
//! would (collapsed whitespace, `<br>` and block ends as newlines).

/// Closing tags that end a visual line.
const BLOCK_TAGS: &[&str] = &["p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6", "tr"];

#[derive(Debug)]
struct Tag {
  name: String,
  closing: bool,
  self_closing: bool,
  /// Offset of `<`
  start: usize,
  /// Offset just past `>`
  end: usize,
}

/// Text blocks of every direct `<span>` child of the `<div>` with the given class.
///
/// Returns `None` when the page has no such container.
pub fn extract_blocks(html: &str, container_class: &str) -> Option<Vec<String>> {
  let (start, end) = find_container(html, container_class)?;
  let content = &html[start..end];
  Some(child_spans(content).into_iter().map(inner_text).collect())
}

/// Next tag at or after `from`. A `<` not followed by a letter, `/` or `!`
/// is text.
fn next_tag(s: &str, from: usize) -> Option<Tag> {
  let mut start = from;
  loop {
    start += s.get(start..)?.find('<')?;
    let opens_tag = s[start + 1..]
      .chars()
      .next()
      .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
    if opens_tag {
      break;
    }
    start += 1;
  }
  let end = s[start..].find('>')? + start + 1;
  let inner = &s[start + 1..end - 1];
  let (closing, body) = match inner.strip_prefix('/') {
    Some(body) => (true, body),
    None => (false, inner),
  };
  let name = body
    .chars()
    .take_while(|c| c.is_ascii_alphanumeric())
    .collect::<String>()
    .to_ascii_lowercase();

  Some(Tag {
    name,
    closing,
    self_closing: inner.ends_with('/'),
    start,
    end,
  })
}

/// Value of an attribute inside a raw opening tag.
fn attribute<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
  let lower = tag.to_ascii_lowercase();
  let mut from = 0;

  while let Some(pos) = lower[from..].find(name) {
    let at = from + pos;
    from = at + name.len();
    if !lower[..at].ends_with(|c: char| c.is_ascii_whitespace()) {
      continue;
    }
    let Some(value) = tag[from..].trim_start().strip_prefix('=') else {
      continue;
    };
    let value = value.trim_start();
    return match value.chars().next() {
      Some(quote @ ('"' | '\'')) => value[1..].split(quote).next(),
      _ => value
        .split(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .next(),
    };
  }

  None
}

/// Byte range of the container's inner HTML.
fn find_container(html: &str, class: &str) -> Option<(usize, usize)> {
  let mut pos = 0;

  let content_start = loop {
    let tag = next_tag(html, pos)?;
    pos = tag.end;
    if tag.name == "div" && !tag.closing {
      let matches = attribute(&html[tag.start..tag.end], "class")
        .is_some_and(|value| value.split_whitespace().eq(class.split_whitespace()));
      if matches {
        break tag.end;
      }
    }
  };

  let mut depth = 1usize;
  while let Some(tag) = next_tag(html, pos) {
    pos = tag.end;
    if tag.name != "div" || tag.self_closing {
      continue;
    }
    if tag.closing {
      depth -= 1;
      if depth == 0 {
        return Some((content_start, tag.start));
      }
    } else {
      depth += 1;
    }
  }

  // Unterminated container, take the rest of the page
  Some((content_start, html.len()))
}

/// Inner HTML of each top-level `<span>` in `content`.
fn child_spans(content: &str) -> Vec<&str> {
  let mut blocks = Vec::new();
  let mut div_depth = 0usize;
  let mut span_depth = 0usize;
  let mut block_start = None;
  let mut pos = 0;

  while let Some(tag) = next_tag(content, pos) {
    pos = tag.end;
    match (tag.name.as_str(), tag.closing) {
      ("span", false) if !tag.self_closing => {
        if div_depth == 0 && span_depth == 0 {
          block_start = Some(tag.end);
        }
        span_depth += 1;
      }
      ("span", true) if span_depth > 0 => {
        span_depth -= 1;
        if span_depth == 0 {
          if let Some(start) = block_start.take() {
            blocks.push(&content[start..tag.start]);
          }
        }
      }
      ("div", false) if span_depth == 0 && !tag.self_closing => div_depth += 1,
      ("div", true) if span_depth == 0 => div_depth = div_depth.saturating_sub(1),
      _ => {}
    }
  }

  blocks
}

/// Visible text of an HTML fragment, one rendered line per output line.
fn inner_text(fragment: &str) -> String {
  let mut out = String::with_capacity(fragment.len());
  let mut pos = 0;

  while let Some(tag) = next_tag(fragment, pos) {
    push_collapsed(&mut out, &fragment[pos..tag.start]);
    if tag.name == "br" || (tag.closing && BLOCK_TAGS.contains(&tag.name.as_str())) {
      out.push('\n');
    }
    pos = tag.end;
  }
  push_collapsed(&mut out, &fragment[pos..]);

  decode_entities(&out)
    .lines()
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect::<Vec<_>>()
    .join("\n")
}

fn push_collapsed(out: &mut String, text: &str) {
  let mut in_space = false;
  for c in text.chars() {
    if c.is_whitespace() {
      if !in_space {
        out.push(' ');
      }
      in_space = true;
    } else {
      out.push(c);
      in_space = false;
    }
  }
}

fn decode_entities(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut rest = s;

  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    rest = &rest[amp..];

    let decoded = rest
      .find(';')
      .filter(|&semi| semi <= 10)
      .and_then(|semi| decode_entity(&rest[1..semi]).map(|c| (c, semi)));
    match decoded {
      Some((c, semi)) => {
        out.push(c);
        rest = &rest[semi + 1..];
      }
      None => {
        out.push('&');
        rest = &rest[1..];
      }
    }
  }
  out.push_str(rest);
  out
}

fn decode_entity(name: &str) -> Option<char> {
  match name {
    "amp" => Some('&'),
    "lt" => Some('<'),
    "gt" => Some('>'),
    "quot" => Some('"'),
    "apos" => Some('\''),
    "nbsp" => Some(' '),
    _ => {
      let code = name.strip_prefix('#')?;
      let value = match code.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse().ok()?,
      };
      char::from_u32(value)
    }
  }
}
