/// Append `values` to `out` through `f`, inserting `separator` between the
/// entries that actually produced output.
pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Double-quote an identifier, escaping embedded quotes.
pub fn write_identifier(out: &mut String, value: &str) {
    out.push('"');
    let mut position = 0;
    for (i, c) in value.char_indices() {
        if c == '"' {
            out.push_str(&value[position..i]);
            out.push_str(r#""""#);
            position = i + 1;
        }
    }
    out.push_str(&value[position..]);
    out.push('"');
}

/// Split a camelCase chunk on ASCII-uppercase boundaries:
/// `NameAndProductLine` becomes `["Name", "And", "Product", "Line"]`.
pub fn split_camel_case(input: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if i > 0 && c.is_ascii_uppercase() {
            words.push(&input[start..i]);
            start = i;
        }
    }
    if start < input.len() {
        words.push(&input[start..]);
    }
    words
}

/// Lower-case the first character, turning the method-name chunk `Name`
/// into the field token `name`.
pub fn lower_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_splitting() {
        assert_eq!(
            split_camel_case("NameAndProductLine"),
            ["Name", "And", "Product", "Line"]
        );
        assert_eq!(split_camel_case("name"), ["name"]);
        assert!(split_camel_case("").is_empty());
    }

    #[test]
    fn identifier_quoting() {
        let mut out = String::new();
        write_identifier(&mut out, r#"od"d"#);
        assert_eq!(out, r#""od""d""#);
    }
}
