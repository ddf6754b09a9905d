// Tag-level walking over raw HTML. Matching is ASCII case-insensitive and
// byte offsets always refer to the original document.

/// Start offset of the next `<tag` opening at or after `from`, skipping longer
/// tag names that share the prefix (`<th` vs `<thead>`).
fn find_open(lc: &str, tag: &str, from: usize) -> Option<usize> {
    let open = format!("<{}", tag);
    let mut pos = from;
    loop {
        let start = lc.get(pos..)?.find(&open)? + pos;
        let after = start + open.len();
        match lc.as_bytes().get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(start),
            _ => pos = after,
        }
    }
}

/// Same as [`next_element`] over an already lowercased document.
fn find_element(lc: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    let start = find_open(lc, tag, from)?;
    let open_end = lc[start..].find('>')? + start + 1;
    let close = format!("</{}>", tag);
    let end = lc[open_end..].find(&close)? + open_end + close.len();
    Some((start, end))
}

/// Byte range of the next `<tag ...>...</tag>` element at or after `from`.
pub fn next_element(doc: &str, tag: &str, from: usize) -> Option<(usize, usize)> {
    find_element(&doc.to_ascii_lowercase(), tag, from)
}

/// All elements named `tag`, in document order.
pub fn elements<'a>(doc: &'a str, tag: &str) -> Vec<&'a str> {
    let lc = doc.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut pos = 0;
    while let Some((s, e)) = find_element(&lc, tag, pos) {
        out.push(&doc[s..e]);
        pos = e;
    }
    out
}

pub fn count_open_tags(doc: &str, tag: &str) -> usize {
    let lc = doc.to_ascii_lowercase();
    let mut count = 0;
    let mut pos = 0;
    while let Some(start) = find_open(&lc, tag, pos) {
        count += 1;
        pos = start + 1;
    }
    count
}

pub fn inner_after_open_tag(block: &str) -> &str {
    match (block.find('>'), block.rfind('<')) {
        (Some(oe), Some(cs)) if cs > oe => &block[oe + 1..cs],
        _ => "",
    }
}

pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element: tags dropped, entities and whitespace folded.
pub fn text(block: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(inner_after_open_tag(block))))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub header: bool,
    pub text: String,
}

/// `<th>` and `<td>` cells of one row, in column order.
pub fn row_cells(row: &str) -> Vec<Cell> {
    let lc = row.to_ascii_lowercase();
    let mut out = Vec::new();
    let mut pos = 0;
    loop {
        let th = find_element(&lc, "th", pos);
        let td = find_element(&lc, "td", pos);
        let (header, (s, e)) = match (th, td) {
            (Some(h), Some(d)) if h.0 < d.0 => (true, h),
            (_, Some(d)) => (false, d),
            (Some(h), None) => (true, h),
            (None, None) => break,
        };
        out.push(Cell {
            header,
            text: text(&row[s..e]),
        });
        pos = e;
    }
    out
}
