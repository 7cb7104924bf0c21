/// Lines of `text` split on `\n`, skipping zero-length ones.
pub fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').filter(|line| !line.is_empty())
}

/// Split a data row on commas that sit outside double-quoted spans.
///
/// Single pass over the bytes with two states: every `"` flips between
/// unquoted and quoted, and only an unquoted comma ends a field. A doubled
/// `""` inside a quoted span flips twice, so it never ends the span. An
/// unbalanced quote keeps the rest of the line in the current field.
/// Quotes are left in place; callers strip them.
pub fn split_row(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut quoted = false;
    let mut start = 0;

    // `"` and `,` are ASCII, so byte offsets are always char boundaries.
    for (i, b) in line.bytes().enumerate() {
        match b {
            b'"' => quoted = !quoted,
            b',' if !quoted => {
                fields.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&line[start..]);
    fields
}
