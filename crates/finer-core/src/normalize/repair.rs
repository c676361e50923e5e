//! Best-effort repair of structurally truncated JSON.
//!
//! Model replies are often cut off at the output-token limit. When that
//! happens inside a `proposals` array, every element before the cut is
//! still complete and worth keeping.

/// String-aware bracket tracker.
///
/// Braces and brackets inside quoted text are ignored; backslash escapes
/// inside strings are honoured.
#[derive(Debug, Default)]
struct Scanner {
    stack: Vec<char>,
    in_string: bool,
    escape: bool,
}

impl Scanner {
    /// Feeds one character. Returns true when it closed an object.
    fn feed(&mut self, ch: char) -> bool {
        if self.in_string {
            if self.escape {
                self.escape = false;
            } else if ch == '\\' {
                self.escape = true;
            } else if ch == '"' {
                self.in_string = false;
            }
            return false;
        }
        match ch {
            '"' => self.in_string = true,
            '{' | '[' => self.stack.push(ch),
            '}' | ']' => {
                self.stack.pop();
                return ch == '}';
            }
            _ => {}
        }
        false
    }

    fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Closers needed to balance everything still open, innermost first.
    fn closers(&self) -> String {
        self.stack
            .iter()
            .rev()
            .map(|open| if *open == '{' { '}' } else { ']' })
            .collect()
    }
}

/// Repairs a payload truncated somewhere after its `"proposals"` array opened.
///
/// Keeps every complete element, drops the partial tail and closes the
/// array plus any containers opened before it. Without a `proposals` key,
/// a payload carrying a `"design"` key is treated as a single cut-off object
/// and simply balanced. Returns `None` when nothing can be salvaged.
pub fn repair_truncated(text: &str) -> Option<String> {
    match text.find("\"proposals\"") {
        Some(key) => repair_proposals_array(text, key),
        None if text.contains("\"design\"") => balance_single_object(text),
        None => None,
    }
}

fn repair_proposals_array(text: &str, key: usize) -> Option<String> {
    let array_start = key + text[key..].find('[')?;

    let mut scanner = Scanner::default();
    for ch in text[..=array_start].chars() {
        scanner.feed(ch);
    }
    let array_depth = scanner.depth();

    // Byte offset just past the last element that closed back to array level.
    let mut last_complete = None;
    for (i, ch) in text[array_start + 1..].char_indices() {
        if scanner.depth() < array_depth {
            // The array itself closed; strict parsing should have succeeded.
            break;
        }
        if scanner.feed(ch) && scanner.depth() == array_depth {
            last_complete = Some(array_start + 1 + i + ch.len_utf8());
        }
    }
    let end = last_complete?;

    // Re-scan the kept prefix to learn which containers are still open.
    let kept = text[..end].trim_end().trim_end_matches(',');
    let mut tail = Scanner::default();
    for ch in kept.chars() {
        tail.feed(ch);
    }
    Some(format!("{}{}", kept, tail.closers()))
}

fn balance_single_object(text: &str) -> Option<String> {
    let mut scanner = Scanner::default();
    for ch in text.chars() {
        scanner.feed(ch);
    }
    if scanner.depth() == 0 {
        return None;
    }

    let mut repaired = text.to_string();
    if scanner.in_string {
        if scanner.escape {
            repaired.pop();
        }
        repaired.push('"');
    }
    let trimmed_len = repaired.trim_end().trim_end_matches(',').len();
    repaired.truncate(trimmed_len);
    // A dangling key (`"vision":`) cannot be closed into valid JSON.
    if repaired.ends_with(':') {
        repaired.push_str("null");
    }
    repaired.push_str(&scanner.closers());
    Some(repaired)
}
